//! Seeds the settings rows the system reads on every relevant request.
//!
//! Values here are the documented defaults; admins overwrite them through
//! the settings form.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Settings {
    Table,
    Key,
    Value,
    Label,
    Kind,
}

const DEFAULTS: [(&str, &str, &str, &str); 5] = [
    (
        "accepting_applications",
        "true",
        "Accepting applications",
        "boolean",
    ),
    ("system_announcement", "", "System announcement", "text"),
    ("signatory_mayor", "Hon. City Mayor", "City Mayor", "text"),
    ("signatory_cswdo_head", "CSWDO Head", "CSWDO Head", "text"),
    (
        "signatory_social_worker",
        "Social Worker",
        "Social Worker",
        "text",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (key, value, label, kind) in DEFAULTS {
            let insert = Query::insert()
                .into_table(Settings::Table)
                .columns([
                    Settings::Key,
                    Settings::Value,
                    Settings::Label,
                    Settings::Kind,
                ])
                .values_panic([key.into(), value.into(), label.into(), kind.into()])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (key, _, _, _) in DEFAULTS {
            let delete = Query::delete()
                .from_table(Settings::Table)
                .and_where(Expr::col(Settings::Key).eq(key))
                .to_owned();
            manager.exec_stmt(delete).await?;
        }
        Ok(())
    }
}
