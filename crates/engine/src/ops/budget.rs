//! Budget ledger ops. Append-only: no update or delete paths exist.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{BudgetEntryKind, EngineError, ResultEngine, budget_logs, users};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Append a ledger entry under the acting reviewer.
    pub async fn record_budget_entry(
        &self,
        actor: &users::Model,
        kind: BudgetEntryKind,
        amount_minor: i64,
        note: Option<&str>,
    ) -> ResultEngine<budget_logs::Model> {
        self.require_reviewer(actor)?;
        if amount_minor <= 0 {
            return Err(EngineError::validation(
                "amount_minor",
                "ledger amount must be > 0",
            ));
        }

        with_tx!(self, |db_tx| {
            budget_logs::ActiveModel {
                user_id: ActiveValue::Set(Some(actor.id)),
                entry_kind: ActiveValue::Set(kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(amount_minor),
                note: ActiveValue::Set(normalize_optional_text(note)),
                created_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await
            .map_err(Into::into)
        })
    }

    /// The full ledger, newest first.
    pub async fn budget_entries(
        &self,
        actor: &users::Model,
    ) -> ResultEngine<Vec<budget_logs::Model>> {
        self.require_reviewer(actor)?;
        with_tx!(self, |db_tx| {
            budget_logs::Entity::find()
                .order_by_desc(budget_logs::Column::CreatedAt)
                .order_by_desc(budget_logs::Column::Id)
                .all(&db_tx)
                .await
                .map_err(Into::into)
        })
    }
}
