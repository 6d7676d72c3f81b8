use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod budget;
mod list;
mod notifications;
mod programs;
mod reports;
mod settings;
mod submit;
mod transitions;

pub use list::{
    ApplicationListFilter, ApplicationPage, ApplicationSort, PageInfo, SortDirection, SortKey,
};
pub use programs::ProgramUpsert;
pub use reports::{ReportData, ReportFilter, ReportRow, Signatories, StatusTotals};
pub use settings::{
    ACCEPTING_APPLICATIONS, SIGNATORY_CSWDO_HEAD, SIGNATORY_MAYOR, SIGNATORY_SOCIAL_WORKER,
    SYSTEM_ANNOUNCEMENT,
};
pub use submit::{ApplicationDetail, ApplicationUpdate, NewApplication, NewAttachment};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_text(value: &str, field: &'static str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
