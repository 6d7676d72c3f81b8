//! Report dataset resolution.
//!
//! Exports re-query the full filtered set with no pagination. The stats
//! block carries both global and filtered totals; which one a document
//! prints is the renderer's choice.

use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Application, ApplicationStatus, ResultEngine, applications, users,
};

use super::{ApplicationListFilter, Engine, with_tx};

#[derive(Clone, Debug, Default)]
pub struct ReportFilter {
    pub status: Option<ApplicationStatus>,
    pub program: Option<String>,
    pub barangay: Option<String>,
    pub submitted_from: Option<NaiveDate>,
    pub submitted_to: Option<NaiveDate>,
}

impl ReportFilter {
    fn as_list_filter(&self) -> ApplicationListFilter {
        ApplicationListFilter {
            status: self.status,
            program: self.program.clone(),
            barangay: self.barangay.clone(),
            submitted_from: self.submitted_from,
            submitted_to: self.submitted_to,
            ..Default::default()
        }
    }
}

/// One export row, already flattened for rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: i32,
    pub applicant_name: String,
    pub program: String,
    pub status: ApplicationStatus,
    pub amount_minor: Option<i64>,
    pub submitted_date: NaiveDate,
    pub approved_date: Option<NaiveDate>,
    pub contact_number: String,
    pub barangay: String,
}

impl From<&Application> for ReportRow {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id,
            applicant_name: app.applicant_name(),
            program: app.program.clone(),
            status: app.status,
            amount_minor: app.amount_minor,
            submitted_date: app.submitted_at.date_naive(),
            approved_date: app.approved_date,
            contact_number: app.contact_number.clone(),
            barangay: app.barangay.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl StatusTotals {
    fn add(&mut self, status: ApplicationStatus) {
        self.total += 1;
        match status {
            ApplicationStatus::Pending => self.pending += 1,
            ApplicationStatus::Approved => self.approved += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }
}

/// Office-holder names rendered onto generated documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signatories {
    pub mayor: String,
    pub cswdo_head: String,
    pub social_worker: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub rows: Vec<ReportRow>,
    pub filtered_totals: StatusTotals,
    pub global_totals: StatusTotals,
    pub signatories: Signatories,
}

impl Engine {
    /// Resolve the current filtered view into report rows plus summary
    /// stats. Reviewer-only; deterministic for fixed filters and data.
    pub async fn report_data(
        &self,
        actor: &users::Model,
        filter: &ReportFilter,
    ) -> ResultEngine<ReportData> {
        self.require_reviewer(actor)?;

        with_tx!(self, |db_tx| {
            let models = super::list::filtered_query(&filter.as_list_filter())
                .order_by_desc(applications::Column::SubmittedAt)
                .order_by_asc(applications::Column::Id)
                .all(&db_tx)
                .await?;

            let mut rows = Vec::with_capacity(models.len());
            let mut filtered_totals = StatusTotals::default();
            for model in models {
                let application = Application::try_from(model)?;
                filtered_totals.add(application.status);
                rows.push(ReportRow::from(&application));
            }

            let mut global_totals = StatusTotals {
                total: applications::Entity::find().count(&db_tx).await?,
                ..Default::default()
            };
            for status in [
                ApplicationStatus::Pending,
                ApplicationStatus::Approved,
                ApplicationStatus::Rejected,
            ] {
                let count = applications::Entity::find()
                    .filter(applications::Column::Status.eq(status.as_str()))
                    .count(&db_tx)
                    .await?;
                match status {
                    ApplicationStatus::Pending => global_totals.pending = count,
                    ApplicationStatus::Approved => global_totals.approved = count,
                    ApplicationStatus::Rejected => global_totals.rejected = count,
                }
            }

            let signatories = self.signatories_tx(&db_tx).await?;

            Ok(ReportData {
                rows,
                filtered_totals,
                global_totals,
                signatories,
            })
        })
    }
}
