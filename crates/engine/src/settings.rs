//! Process-wide configuration rows.
//!
//! Read through the engine accessors, written only by admins. Keys the
//! system consumes: `accepting_applications`, `system_announcement`,
//! `signatory_mayor`, `signatory_cswdo_head`, `signatory_social_worker`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
    pub label: String,
    /// "boolean" or "text".
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
