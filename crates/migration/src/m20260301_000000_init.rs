//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Assista:
//!
//! - `users`: accounts with a single enumerated `role` column
//! - `applications`: case records with the status lifecycle
//! - `attachments`: named document slots plus the additional-documents list
//! - `programs`: admin-managed assistance catalogue
//! - `settings`: process-wide configuration rows
//! - `notifications`: in-app notification records
//! - `budget_logs`: append-only budget ledger

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    Password,
    FirstName,
    LastName,
    Role,
    ContactNumber,
    Sex,
    CivilStatus,
    BirthDate,
    Barangay,
    HouseNo,
    ProfilePhotoPath,
}

#[derive(Iden)]
enum Applications {
    Table,
    Id,
    UserId,
    FirstName,
    MiddleName,
    LastName,
    ContactNumber,
    Email,
    HouseNo,
    Barangay,
    City,
    BirthDate,
    Sex,
    CivilStatus,
    Program,
    AssistanceType,
    DateOfIncident,
    Status,
    AmountMinor,
    ApprovedDate,
    Remarks,
    SubmittedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Attachments {
    Table,
    Id,
    ApplicationId,
    Slot,
    Position,
    Path,
}

#[derive(Iden)]
enum Programs {
    Table,
    Id,
    Title,
    Description,
    IconPath,
    IsActive,
    Requirements,
    DefaultAmountMinor,
}

#[derive(Iden)]
enum Settings {
    Table,
    Key,
    Value,
    Label,
    Kind,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    UserId,
    ApplicationId,
    Status,
    Title,
    Message,
    Link,
    IsRead,
    CreatedAt,
}

#[derive(Iden)]
enum BudgetLogs {
    Table,
    Id,
    UserId,
    EntryKind,
    AmountMinor,
    Note,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("applicant"),
                    )
                    .col(ColumnDef::new(Users::ContactNumber).string())
                    .col(ColumnDef::new(Users::Sex).string())
                    .col(ColumnDef::new(Users::CivilStatus).string())
                    .col(ColumnDef::new(Users::BirthDate).date())
                    .col(ColumnDef::new(Users::Barangay).string())
                    .col(ColumnDef::new(Users::HouseNo).string())
                    .col(ColumnDef::new(Users::ProfilePhotoPath).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Applications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Applications::UserId).integer().not_null())
                    .col(ColumnDef::new(Applications::FirstName).string().not_null())
                    .col(ColumnDef::new(Applications::MiddleName).string())
                    .col(ColumnDef::new(Applications::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Applications::ContactNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Applications::Email).string().not_null())
                    .col(ColumnDef::new(Applications::HouseNo).string().not_null())
                    .col(ColumnDef::new(Applications::Barangay).string().not_null())
                    .col(ColumnDef::new(Applications::City).string().not_null())
                    .col(ColumnDef::new(Applications::BirthDate).date().not_null())
                    .col(ColumnDef::new(Applications::Sex).string().not_null())
                    .col(
                        ColumnDef::new(Applications::CivilStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Applications::Program).string().not_null())
                    .col(
                        ColumnDef::new(Applications::AssistanceType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Applications::DateOfIncident)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Applications::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Applications::AmountMinor).big_integer())
                    .col(ColumnDef::new(Applications::ApprovedDate).date())
                    .col(ColumnDef::new(Applications::Remarks).text())
                    .col(
                        ColumnDef::new(Applications::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Applications::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-applications-user_id")
                            .from(Applications::Table, Applications::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-applications-status")
                    .table(Applications::Table)
                    .col(Applications::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-applications-user_id")
                    .table(Applications::Table)
                    .col(Applications::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Attachments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Attachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attachments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Attachments::ApplicationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Attachments::Slot).string().not_null())
                    .col(
                        ColumnDef::new(Attachments::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Attachments::Path).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attachments-application_id")
                            .from(Attachments::Table, Attachments::ApplicationId)
                            .to(Applications::Table, Applications::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Programs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Programs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Programs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Programs::Title).string().not_null())
                    .col(ColumnDef::new(Programs::Description).text().not_null())
                    .col(ColumnDef::new(Programs::IconPath).string())
                    .col(
                        ColumnDef::new(Programs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Programs::Requirements)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Programs::DefaultAmountMinor).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-programs-title-unique")
                    .table(Programs::Table)
                    .col(Programs::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Settings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::Value).text().not_null())
                    .col(ColumnDef::new(Settings::Label).string().not_null())
                    .col(
                        ColumnDef::new(Settings::Kind)
                            .string()
                            .not_null()
                            .default("text"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Notifications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Notifications::ApplicationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Status).string().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(ColumnDef::new(Notifications::Link).string().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-user_id")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-application_id")
                            .from(Notifications::Table, Notifications::ApplicationId)
                            .to(Applications::Table, Applications::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notifications-user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Budget logs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetLogs::UserId).integer())
                    .col(ColumnDef::new(BudgetLogs::EntryKind).string().not_null())
                    .col(
                        ColumnDef::new(BudgetLogs::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BudgetLogs::Note).text())
                    .col(
                        ColumnDef::new(BudgetLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_logs-user_id")
                            .from(BudgetLogs::Table, BudgetLogs::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            TableDropStatement::new().table(BudgetLogs::Table).to_owned(),
            TableDropStatement::new()
                .table(Notifications::Table)
                .to_owned(),
            TableDropStatement::new().table(Settings::Table).to_owned(),
            TableDropStatement::new().table(Programs::Table).to_owned(),
            TableDropStatement::new()
                .table(Attachments::Table)
                .to_owned(),
            TableDropStatement::new()
                .table(Applications::Table)
                .to_owned(),
            TableDropStatement::new().table(Users::Table).to_owned(),
        ] {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}
