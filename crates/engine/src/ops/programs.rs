//! Program catalogue reads and admin upkeep.
//!
//! Submissions name a program by title; the catalogue decides which titles
//! are accepted and supplies the canonical spelling.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, programs, programs::fold_title, users};

use super::{Engine, normalize_required_text, with_tx};

/// Admin payload for creating or editing a catalogue entry, keyed by title.
#[derive(Clone, Debug)]
pub struct ProgramUpsert {
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub default_amount_minor: Option<i64>,
    pub is_active: bool,
}

impl Engine {
    /// Active catalogue entries, title order. Any authenticated user can
    /// read this; it backs the submission form.
    pub async fn list_programs(&self) -> ResultEngine<Vec<programs::Model>> {
        with_tx!(self, |db_tx| {
            programs::Entity::find()
                .filter(programs::Column::IsActive.eq(true))
                .order_by_asc(programs::Column::Title)
                .all(&db_tx)
                .await
                .map_err(Into::into)
        })
    }

    /// Match a submitted program name against the active catalogue, folding
    /// case and accents. Returns the canonical row.
    pub(super) async fn require_active_program(
        &self,
        db: &DatabaseTransaction,
        title: &str,
    ) -> ResultEngine<programs::Model> {
        let folded = fold_title(title);
        programs::Entity::find()
            .filter(programs::Column::IsActive.eq(true))
            .all(db)
            .await?
            .into_iter()
            .find(|model| fold_title(&model.title) == folded)
            .ok_or_else(|| {
                EngineError::validation("program", format!("unknown program: {title}"))
            })
    }

    /// Create or update a catalogue entry. Admin-only; matched by title,
    /// case-insensitive.
    pub async fn upsert_program(
        &self,
        actor: &users::Model,
        upsert: ProgramUpsert,
    ) -> ResultEngine<programs::Model> {
        self.require_admin(actor)?;
        let title = normalize_required_text(&upsert.title, "title")?;
        let requirements = serde_json::to_string(&upsert.requirements)
            .map_err(|err| EngineError::validation("requirements", err.to_string()))?;
        let folded = fold_title(&title);

        with_tx!(self, |db_tx| {
            let existing = programs::Entity::find()
                .all(&db_tx)
                .await?
                .into_iter()
                .find(|model| fold_title(&model.title) == folded);

            match existing {
                Some(model) => {
                    let mut active: programs::ActiveModel = model.into();
                    active.description = ActiveValue::Set(upsert.description.clone());
                    active.requirements = ActiveValue::Set(requirements.clone());
                    active.default_amount_minor = ActiveValue::Set(upsert.default_amount_minor);
                    active.is_active = ActiveValue::Set(upsert.is_active);
                    active.update(&db_tx).await.map_err(Into::into)
                }
                None => programs::ActiveModel {
                    title: ActiveValue::Set(title.clone()),
                    description: ActiveValue::Set(upsert.description.clone()),
                    icon_path: ActiveValue::Set(None),
                    is_active: ActiveValue::Set(upsert.is_active),
                    requirements: ActiveValue::Set(requirements.clone()),
                    default_amount_minor: ActiveValue::Set(upsert.default_amount_minor),
                    ..Default::default()
                }
                .insert(&db_tx)
                .await
                .map_err(Into::into),
            }
        })
    }
}
