//! Users table.
//!
//! One row per account; the `role` column decides query scope and which
//! transitions the account may perform. `password` stays inside the engine
//! and is never serialized outward.

use sea_orm::entity::prelude::*;

use crate::{EngineError, Role};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub contact_number: Option<String>,
    pub sex: Option<String>,
    pub civil_status: Option<String>,
    pub birth_date: Option<Date>,
    pub barangay: Option<String>,
    pub house_no: Option<String>,
    pub profile_photo_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::applications::Entity")]
    Applications,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn role(&self) -> Result<Role, EngineError> {
        Role::try_from(self.role.as_str())
    }
}
