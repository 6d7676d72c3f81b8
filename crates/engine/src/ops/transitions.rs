//! Status transitions.
//!
//! Every transition is one guarded update: the `WHERE status = <expected>`
//! filter makes concurrent reviewers race on the row itself, and the loser
//! gets a `StateConflict` instead of silently overwriting. Events are
//! returned to the caller for fan-out only after the transaction commits.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    Application, ApplicationEvent, ApplicationStatus, BudgetEntryKind, EngineError, EventKind,
    ResultEngine, TransitionAction, applications, budget_logs, status::transition, users,
};

use super::{Engine, normalize_required_text, with_tx};

const MAX_REMARKS_LEN: usize = 1000;

fn validate_remarks(remarks: &str) -> ResultEngine<String> {
    let remarks = normalize_required_text(remarks, "remarks")?;
    if remarks.chars().count() > MAX_REMARKS_LEN {
        return Err(EngineError::validation(
            "remarks",
            format!("must be at most {MAX_REMARKS_LEN} characters"),
        ));
    }
    Ok(remarks)
}

impl Engine {
    /// Approve a pending application, recording the released amount.
    ///
    /// Appends a `release` entry to the budget ledger under the acting
    /// reviewer.
    pub async fn approve(
        &self,
        actor: &users::Model,
        application_id: i32,
        amount_minor: i64,
    ) -> ResultEngine<ApplicationEvent> {
        self.require_reviewer(actor)?;
        if amount_minor <= 0 {
            return Err(EngineError::validation(
                "amount_minor",
                "released amount must be > 0",
            ));
        }

        with_tx!(self, |db_tx| {
            let model = self.find_application(&db_tx, application_id).await?;
            let current = ApplicationStatus::try_from(model.status.as_str())?;
            let target = transition(current, TransitionAction::Approve)?;

            let now = Utc::now();
            let result = applications::Entity::update_many()
                .col_expr(applications::Column::Status, Expr::value(target.as_str()))
                .col_expr(
                    applications::Column::AmountMinor,
                    Expr::value(Some(amount_minor)),
                )
                .col_expr(
                    applications::Column::ApprovedDate,
                    Expr::value(Some(now.date_naive())),
                )
                .col_expr(applications::Column::UpdatedAt, Expr::value(now))
                .filter(applications::Column::Id.eq(application_id))
                .filter(applications::Column::Status.eq(current.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::StateConflict(
                    "application was reviewed concurrently".to_string(),
                ));
            }

            budget_logs::ActiveModel {
                user_id: ActiveValue::Set(Some(actor.id)),
                entry_kind: ActiveValue::Set(BudgetEntryKind::Release.as_str().to_string()),
                amount_minor: ActiveValue::Set(amount_minor),
                note: ActiveValue::Set(Some(format!("application #{application_id}"))),
                created_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            self.event_for(&db_tx, application_id, EventKind::Approved)
                .await
        })
    }

    /// Reject a pending application with mandatory remarks.
    pub async fn reject(
        &self,
        actor: &users::Model,
        application_id: i32,
        remarks: &str,
    ) -> ResultEngine<ApplicationEvent> {
        self.require_reviewer(actor)?;
        let remarks = validate_remarks(remarks)?;

        with_tx!(self, |db_tx| {
            let model = self.find_application(&db_tx, application_id).await?;
            let current = ApplicationStatus::try_from(model.status.as_str())?;
            let target = transition(current, TransitionAction::Reject)?;

            let result = applications::Entity::update_many()
                .col_expr(applications::Column::Status, Expr::value(target.as_str()))
                .col_expr(applications::Column::Remarks, Expr::value(Some(remarks)))
                .col_expr(applications::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(applications::Column::Id.eq(application_id))
                .filter(applications::Column::Status.eq(current.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::StateConflict(
                    "application was reviewed concurrently".to_string(),
                ));
            }

            self.event_for(&db_tx, application_id, EventKind::Rejected)
                .await
        })
    }

    /// Resubmit a rejected application, returning it to the pending queue.
    ///
    /// Only the owning applicant may resubmit. Remarks and review fields are
    /// cleared; the event addresses the reviewer set, not the applicant.
    pub async fn resubmit(
        &self,
        actor: &users::Model,
        application_id: i32,
        update: super::ApplicationUpdate,
    ) -> ResultEngine<ApplicationEvent> {
        self.require_applicant(actor)?;

        with_tx!(self, |db_tx| {
            let model = self
                .require_application_owned(&db_tx, actor, application_id)
                .await?;
            let current = ApplicationStatus::try_from(model.status.as_str())?;
            let target = transition(current, TransitionAction::Resubmit)?;

            let mut query = applications::Entity::update_many()
                .col_expr(applications::Column::Status, Expr::value(target.as_str()))
                .col_expr(
                    applications::Column::Remarks,
                    Expr::value(None::<String>),
                )
                .col_expr(
                    applications::Column::AmountMinor,
                    Expr::value(None::<i64>),
                )
                .col_expr(
                    applications::Column::ApprovedDate,
                    Expr::value(None::<chrono::NaiveDate>),
                )
                .col_expr(applications::Column::UpdatedAt, Expr::value(Utc::now()));
            query = update.apply(query)?;

            let result = query
                .filter(applications::Column::Id.eq(application_id))
                .filter(applications::Column::Status.eq(current.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::StateConflict(
                    "application changed during resubmission".to_string(),
                ));
            }

            let updated = self.find_application(&db_tx, application_id).await?;
            let application = Application::try_from(updated)?;
            let recipients = self.reviewer_recipients(&db_tx).await?;
            Ok(ApplicationEvent {
                kind: EventKind::Resubmitted,
                application,
                recipients,
            })
        })
    }

    /// Annotation-only update: no status change, no notification. Calling it
    /// twice with the same text leaves the record unchanged.
    pub async fn add_remark(
        &self,
        actor: &users::Model,
        application_id: i32,
        remarks: &str,
    ) -> ResultEngine<Application> {
        self.require_reviewer(actor)?;
        let remarks = validate_remarks(remarks)?;

        with_tx!(self, |db_tx| {
            let model = self.find_application(&db_tx, application_id).await?;
            if model.remarks.as_deref() != Some(remarks.as_str()) {
                applications::Entity::update_many()
                    .col_expr(applications::Column::Remarks, Expr::value(Some(remarks)))
                    .col_expr(applications::Column::UpdatedAt, Expr::value(Utc::now()))
                    .filter(applications::Column::Id.eq(application_id))
                    .exec(&db_tx)
                    .await?;
            }
            let updated = self.find_application(&db_tx, application_id).await?;
            Application::try_from(updated)
        })
    }

    async fn event_for(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        application_id: i32,
        kind: EventKind,
    ) -> ResultEngine<ApplicationEvent> {
        let updated = self.find_application(db_tx, application_id).await?;
        let application = Application::try_from(updated)?;
        let recipient = self
            .applicant_recipient(db_tx, application.user_id)
            .await?;
        Ok(ApplicationEvent {
            kind,
            application,
            recipients: vec![recipient],
        })
    }
}
