//! Case records.
//!
//! An `Application` is one applicant's request for a specific assistance
//! program. Records are never hard-deleted; review actions only move the
//! status and fill in the review fields.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{ApplicationStatus, EngineError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub contact_number: String,
    pub email: String,
    pub house_no: String,
    pub barangay: String,
    pub city: String,
    pub birth_date: Date,
    pub sex: String,
    pub civil_status: String,
    pub program: String,
    pub assistance_type: String,
    pub date_of_incident: Date,
    pub status: String,
    pub amount_minor: Option<i64>,
    pub approved_date: Option<Date>,
    pub remarks: Option<String>,
    pub submitted_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::attachments::Entity")]
    Attachments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::attachments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Typed view of a stored case record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i32,
    pub user_id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub contact_number: String,
    pub email: String,
    pub house_no: String,
    pub barangay: String,
    pub city: String,
    pub birth_date: NaiveDate,
    pub sex: String,
    pub civil_status: String,
    pub program: String,
    pub assistance_type: String,
    pub date_of_incident: NaiveDate,
    pub status: ApplicationStatus,
    pub amount_minor: Option<i64>,
    pub approved_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn applicant_name(&self) -> String {
        match self.middle_name.as_deref() {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

impl TryFrom<Model> for Application {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            first_name: model.first_name,
            middle_name: model.middle_name,
            last_name: model.last_name,
            contact_number: model.contact_number,
            email: model.email,
            house_no: model.house_no,
            barangay: model.barangay,
            city: model.city,
            birth_date: model.birth_date,
            sex: model.sex,
            civil_status: model.civil_status,
            program: model.program,
            assistance_type: model.assistance_type,
            date_of_incident: model.date_of_incident,
            status: ApplicationStatus::try_from(model.status.as_str())?,
            amount_minor: model.amount_minor,
            approved_date: model.approved_date,
            remarks: model.remarks,
            submitted_at: model.submitted_at,
            updated_at: model.updated_at,
        })
    }
}
