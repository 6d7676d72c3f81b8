//! Budget ledger.
//!
//! Append-only: rows are created when budget is allocated or released and
//! never mutated afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetEntryKind {
    Allocation,
    Release,
}

impl BudgetEntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allocation => "allocation",
            Self::Release => "release",
        }
    }
}

impl TryFrom<&str> for BudgetEntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "allocation" => Ok(Self::Allocation),
            "release" => Ok(Self::Release),
            other => Err(EngineError::validation(
                "entry_kind",
                format!("invalid budget entry kind: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Acting user, when known.
    pub user_id: Option<i32>,
    pub entry_kind: String,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
