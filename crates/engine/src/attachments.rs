//! Attachment slots.
//!
//! Each application carries a fixed set of named document slots plus an
//! ordered "additional documents" list. The original system merged numeric
//! keys into the named map; here the slot is an explicit enum and overflow
//! documents are `Additional` with a position.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentSlot {
    ValidId,
    IndigencyCert,
    Additional,
}

impl AttachmentSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidId => "valid_id",
            Self::IndigencyCert => "indigency_cert",
            Self::Additional => "additional",
        }
    }
}

impl TryFrom<&str> for AttachmentSlot {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "valid_id" => Ok(Self::ValidId),
            "indigency_cert" => Ok(Self::IndigencyCert),
            "additional" => Ok(Self::Additional),
            other => Err(EngineError::validation(
                "slot",
                format!("invalid attachment slot: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub application_id: i32,
    pub slot: String,
    /// 0 for named slots; ordinal within the additional list otherwise.
    pub position: i32,
    pub path: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::applications::Entity",
        from = "Column::ApplicationId",
        to = "super::applications::Column::Id"
    )]
    Application,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
