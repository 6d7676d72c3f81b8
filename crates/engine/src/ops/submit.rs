//! Application intake and detail reads.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Application, ApplicationStatus, AttachmentSlot, EngineError, ResultEngine, applications,
    attachments, users,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

#[derive(Clone, Debug)]
pub struct NewAttachment {
    pub slot: AttachmentSlot,
    pub path: String,
}

/// Intake payload for a new case record.
#[derive(Clone, Debug)]
pub struct NewApplication {
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
    pub attachments: Vec<NewAttachment>,
}

/// Fields an applicant may edit when resubmitting a rejected application.
#[derive(Clone, Debug, Default)]
pub struct ApplicationUpdate {
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub house_no: Option<String>,
    pub barangay: Option<String>,
    pub city: Option<String>,
    pub assistance_type: Option<String>,
    pub date_of_incident: Option<NaiveDate>,
}

impl ApplicationUpdate {
    pub(super) fn apply(
        self,
        mut query: sea_orm::UpdateMany<applications::Entity>,
    ) -> ResultEngine<sea_orm::UpdateMany<applications::Entity>> {
        if let Some(value) = self.contact_number {
            let value = normalize_required_text(&value, "contact_number")?;
            query = query.col_expr(applications::Column::ContactNumber, Expr::value(value));
        }
        if let Some(value) = self.email {
            let value = normalize_required_text(&value, "email")?;
            query = query.col_expr(applications::Column::Email, Expr::value(value));
        }
        if let Some(value) = self.house_no {
            query = query.col_expr(applications::Column::HouseNo, Expr::value(value));
        }
        if let Some(value) = self.barangay {
            let value = normalize_required_text(&value, "barangay")?;
            query = query.col_expr(applications::Column::Barangay, Expr::value(value));
        }
        if let Some(value) = self.city {
            let value = normalize_required_text(&value, "city")?;
            query = query.col_expr(applications::Column::City, Expr::value(value));
        }
        if let Some(value) = self.assistance_type {
            let value = normalize_required_text(&value, "assistance_type")?;
            query = query.col_expr(applications::Column::AssistanceType, Expr::value(value));
        }
        if let Some(value) = self.date_of_incident {
            query = query.col_expr(applications::Column::DateOfIncident, Expr::value(value));
        }
        Ok(query)
    }
}

/// An application plus its document slots.
#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationDetail {
    pub application: Application,
    pub attachments: Vec<attachments::Model>,
}

fn validate_attachments(slots: &[NewAttachment]) -> ResultEngine<()> {
    let count = |slot: AttachmentSlot| slots.iter().filter(|a| a.slot == slot).count();
    if count(AttachmentSlot::ValidId) > 1 {
        return Err(EngineError::validation(
            "attachments",
            "at most one valid_id slot",
        ));
    }
    if count(AttachmentSlot::IndigencyCert) > 1 {
        return Err(EngineError::validation(
            "attachments",
            "at most one indigency_cert slot",
        ));
    }
    Ok(())
}

impl Engine {
    /// Create a pending application owned by the acting applicant.
    ///
    /// Refused while the `accepting_applications` toggle is off.
    pub async fn submit_application(
        &self,
        actor: &users::Model,
        new: NewApplication,
    ) -> ResultEngine<Application> {
        self.require_applicant(actor)?;
        validate_attachments(&new.attachments)?;

        let first_name = normalize_required_text(&new.first_name, "first_name")?;
        let last_name = normalize_required_text(&new.last_name, "last_name")?;
        let contact_number = normalize_required_text(&new.contact_number, "contact_number")?;
        let email = normalize_required_text(&new.email, "email")?;
        let barangay = normalize_required_text(&new.barangay, "barangay")?;
        let city = normalize_required_text(&new.city, "city")?;
        let program = normalize_required_text(&new.program, "program")?;
        let assistance_type = normalize_required_text(&new.assistance_type, "assistance_type")?;

        with_tx!(self, |db_tx| {
            if !self.accepting_applications_tx(&db_tx).await? {
                return Err(EngineError::validation(
                    "program",
                    "applications are not being accepted at this time",
                ));
            }

            // Catalogue match supplies the canonical title.
            let program = self.require_active_program(&db_tx, &program).await?.title;

            let now = Utc::now();
            let model = applications::ActiveModel {
                user_id: ActiveValue::Set(actor.id),
                first_name: ActiveValue::Set(first_name),
                middle_name: ActiveValue::Set(normalize_optional_text(
                    new.middle_name.as_deref(),
                )),
                last_name: ActiveValue::Set(last_name),
                contact_number: ActiveValue::Set(contact_number),
                email: ActiveValue::Set(email),
                house_no: ActiveValue::Set(new.house_no.trim().to_string()),
                barangay: ActiveValue::Set(barangay),
                city: ActiveValue::Set(city),
                birth_date: ActiveValue::Set(new.birth_date),
                sex: ActiveValue::Set(new.sex.trim().to_string()),
                civil_status: ActiveValue::Set(new.civil_status.trim().to_string()),
                program: ActiveValue::Set(program),
                assistance_type: ActiveValue::Set(assistance_type),
                date_of_incident: ActiveValue::Set(new.date_of_incident),
                status: ActiveValue::Set(ApplicationStatus::Pending.as_str().to_string()),
                amount_minor: ActiveValue::Set(None),
                approved_date: ActiveValue::Set(None),
                remarks: ActiveValue::Set(None),
                submitted_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            let mut additional_position = 0;
            for attachment in &new.attachments {
                let position = match attachment.slot {
                    AttachmentSlot::Additional => {
                        additional_position += 1;
                        additional_position
                    }
                    _ => 0,
                };
                attachments::ActiveModel {
                    application_id: ActiveValue::Set(model.id),
                    slot: ActiveValue::Set(attachment.slot.as_str().to_string()),
                    position: ActiveValue::Set(position),
                    path: ActiveValue::Set(attachment.path.clone()),
                    ..Default::default()
                }
                .insert(&db_tx)
                .await?;
            }

            Application::try_from(model)
        })
    }

    /// Fetch one application with its attachments, scoped to the actor.
    pub async fn application_detail(
        &self,
        actor: &users::Model,
        application_id: i32,
    ) -> ResultEngine<ApplicationDetail> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_application_visible(&db_tx, actor, application_id)
                .await?;
            let attachments = attachments::Entity::find()
                .filter(attachments::Column::ApplicationId.eq(application_id))
                .order_by_asc(attachments::Column::Slot)
                .order_by_asc(attachments::Column::Position)
                .all(&db_tx)
                .await?;

            Ok(ApplicationDetail {
                application: Application::try_from(model)?,
                attachments,
            })
        })
    }
}
