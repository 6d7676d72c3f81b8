//! Seeds the assistance-program catalogue.
//!
//! Submissions are matched against active titles, so a fresh install needs a
//! working catalogue. Admins edit or extend it afterwards.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Programs {
    Table,
    Title,
    Description,
    IsActive,
    Requirements,
    DefaultAmountMinor,
}

const DEFAULTS: [(&str, &str, &str, Option<i64>); 5] = [
    (
        "Chemotherapy",
        "Financial assistance for chemotherapy sessions.",
        r#"["Medical certificate or clinical abstract","Prescription or statement of account","One (1) valid government-issued ID"]"#,
        Some(500_000),
    ),
    (
        "Hospitalization",
        "Help with unsettled hospital bills.",
        r#"["Final statement of account","Medical certificate or clinical abstract","One (1) valid government-issued ID"]"#,
        Some(500_000),
    ),
    (
        "Dialysis",
        "Financial assistance for dialysis treatment.",
        r#"["Medical certificate or clinical abstract","Dialysis treatment schedule","One (1) valid government-issued ID"]"#,
        Some(500_000),
    ),
    (
        "Burial Assistance",
        "Help with funeral and burial expenses.",
        r#"["Registered death certificate","Funeral contract or statement of account","One (1) valid government-issued ID"]"#,
        Some(300_000),
    ),
    (
        "Food Assistance",
        "Food packs for families in crisis.",
        r#"["Certificate of indigency","One (1) valid government-issued ID"]"#,
        None,
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (title, description, requirements, default_amount_minor) in DEFAULTS {
            let insert = Query::insert()
                .into_table(Programs::Table)
                .columns([
                    Programs::Title,
                    Programs::Description,
                    Programs::IsActive,
                    Programs::Requirements,
                    Programs::DefaultAmountMinor,
                ])
                .values_panic([
                    title.into(),
                    description.into(),
                    true.into(),
                    requirements.into(),
                    default_amount_minor.into(),
                ])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (title, _, _, _) in DEFAULTS {
            let delete = Query::delete()
                .from_table(Programs::Table)
                .and_where(Expr::col(Programs::Title).eq(title))
                .to_owned();
            manager.exec_stmt(delete).await?;
        }
        Ok(())
    }
}
