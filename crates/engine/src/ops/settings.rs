//! Configuration repository over the `settings` table.
//!
//! Injected through the engine rather than read as a global: every accessor
//! re-queries, writes are admin-gated, and missing keys fall back to
//! documented defaults.

use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};

use crate::{ResultEngine, settings, users};

use super::{Engine, normalize_required_text, reports::Signatories, with_tx};

pub const ACCEPTING_APPLICATIONS: &str = "accepting_applications";
pub const SYSTEM_ANNOUNCEMENT: &str = "system_announcement";
pub const SIGNATORY_MAYOR: &str = "signatory_mayor";
pub const SIGNATORY_CSWDO_HEAD: &str = "signatory_cswdo_head";
pub const SIGNATORY_SOCIAL_WORKER: &str = "signatory_social_worker";

pub(super) const DEFAULT_MAYOR: &str = "Hon. City Mayor";
pub(super) const DEFAULT_CSWDO_HEAD: &str = "CSWDO Head";
pub(super) const DEFAULT_SOCIAL_WORKER: &str = "Social Worker";

fn parse_boolean(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

impl Engine {
    /// Read one raw setting value.
    pub async fn setting(&self, key: &str) -> ResultEngine<Option<String>> {
        with_tx!(self, |db_tx| {
            self.setting_tx(&db_tx, key).await
        })
    }

    pub(super) async fn setting_tx(
        &self,
        db: &DatabaseTransaction,
        key: &str,
    ) -> ResultEngine<Option<String>> {
        let model = settings::Entity::find_by_id(key.to_string()).one(db).await?;
        Ok(model.map(|m| m.value))
    }

    /// Upsert a setting. Admin-only.
    pub async fn put_setting(
        &self,
        actor: &users::Model,
        key: &str,
        value: &str,
    ) -> ResultEngine<()> {
        self.require_admin(actor)?;
        let key = normalize_required_text(key, "key")?;
        let value = value.trim().to_string();

        with_tx!(self, |db_tx| {
            match settings::Entity::find_by_id(key.clone()).one(&db_tx).await? {
                Some(existing) => {
                    let mut model: settings::ActiveModel = existing.into();
                    model.value = ActiveValue::Set(value);
                    model.update(&db_tx).await?;
                }
                None => {
                    let kind = if key == ACCEPTING_APPLICATIONS {
                        "boolean"
                    } else {
                        "text"
                    };
                    settings::ActiveModel {
                        key: ActiveValue::Set(key.clone()),
                        value: ActiveValue::Set(value),
                        label: ActiveValue::Set(key.replace('_', " ")),
                        kind: ActiveValue::Set(kind.to_string()),
                    }
                    .insert(&db_tx)
                    .await?;
                }
            }
            Ok(())
        })
    }

    /// All settings rows, admin-only (the settings form).
    pub async fn list_settings(
        &self,
        actor: &users::Model,
    ) -> ResultEngine<Vec<settings::Model>> {
        self.require_admin(actor)?;
        with_tx!(self, |db_tx| {
            settings::Entity::find()
                .all(&db_tx)
                .await
                .map_err(Into::into)
        })
    }

    /// Whether new submissions are accepted. Defaults to true when unset.
    pub async fn accepting_applications(&self) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            self.accepting_applications_tx(&db_tx).await
        })
    }

    pub(super) async fn accepting_applications_tx(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<bool> {
        Ok(self
            .setting_tx(db, ACCEPTING_APPLICATIONS)
            .await?
            .map(|value| parse_boolean(&value))
            .unwrap_or(true))
    }

    /// Announcement banner text, if any.
    pub async fn system_announcement(&self) -> ResultEngine<Option<String>> {
        let value = self.setting(SYSTEM_ANNOUNCEMENT).await?;
        Ok(value.filter(|v| !v.trim().is_empty()))
    }

    /// Named signatories for generated documents, with hard fallbacks when
    /// keys are missing or blank.
    pub async fn signatories(&self) -> ResultEngine<Signatories> {
        with_tx!(self, |db_tx| {
            self.signatories_tx(&db_tx).await
        })
    }

    pub(super) async fn signatories_tx(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<Signatories> {
        let read = |value: Option<String>, fallback: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        Ok(Signatories {
            mayor: read(self.setting_tx(db, SIGNATORY_MAYOR).await?, DEFAULT_MAYOR),
            cswdo_head: read(
                self.setting_tx(db, SIGNATORY_CSWDO_HEAD).await?,
                DEFAULT_CSWDO_HEAD,
            ),
            social_worker: read(
                self.setting_tx(db, SIGNATORY_SOCIAL_WORKER).await?,
                DEFAULT_SOCIAL_WORKER,
            ),
        })
    }
}
