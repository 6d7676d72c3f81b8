use chrono::NaiveDate;
use sea_orm::{
    Condition, Order, PaginatorTrait, QueryFilter, QueryOrder, Select, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};

use crate::{Application, ApplicationStatus, EngineError, ResultEngine, applications, users};

use super::{Engine, with_tx};

/// Filters for listing applications.
///
/// `submitted_from` and `submitted_to` are inclusive calendar-day bounds
/// against the submission timestamp (UTC).
#[derive(Clone, Debug, Default)]
pub struct ApplicationListFilter {
    /// Case-insensitive substring, OR-combined over id, first name, last
    /// name and email.
    pub search: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub program: Option<String>,
    pub barangay: Option<String>,
    pub submitted_from: Option<NaiveDate>,
    pub submitted_to: Option<NaiveDate>,
    pub sort: Option<ApplicationSort>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    SubmittedAt,
    LastName,
    Status,
    Program,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplicationSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for ApplicationSort {
    /// Newest-first.
    fn default() -> Self {
        Self {
            key: SortKey::SubmittedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Pagination metadata for a fixed filter+sort input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationPage {
    pub items: Vec<Application>,
    pub page_info: PageInfo,
}

fn validate_list_input(
    filter: &ApplicationListFilter,
    page: u64,
    per_page: u64,
) -> ResultEngine<()> {
    if page == 0 {
        return Err(EngineError::validation("page", "pages are numbered from 1"));
    }
    if per_page == 0 || per_page > 200 {
        return Err(EngineError::validation(
            "per_page",
            "must be between 1 and 200",
        ));
    }
    if let (Some(from), Some(to)) = (filter.submitted_from, filter.submitted_to)
        && from > to
    {
        return Err(EngineError::validation(
            "submitted_from",
            "invalid range: from must be <= to",
        ));
    }
    Ok(())
}

trait ApplyListFilters: QueryFilter + Sized {
    fn apply_list_filters(self, filter: &ApplicationListFilter) -> Self;
}

impl<T> ApplyListFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_list_filters(mut self, filter: &ApplicationListFilter) -> Self {
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            self = self.filter(
                Condition::any()
                    .add(Expr::cust("CAST(id AS TEXT)").like(pattern.clone()))
                    .add(Expr::cust("LOWER(first_name)").like(pattern.clone()))
                    .add(Expr::cust("LOWER(last_name)").like(pattern.clone()))
                    .add(Expr::cust("LOWER(email)").like(pattern)),
            );
        }
        if let Some(status) = filter.status {
            self = self.filter(applications::Column::Status.eq(status.as_str()));
        }
        if let Some(program) = filter.program.as_deref() {
            self = self.filter(Expr::cust("LOWER(program)").eq(program.to_lowercase()));
        }
        if let Some(barangay) = filter.barangay.as_deref() {
            self = self.filter(Expr::cust("LOWER(barangay)").eq(barangay.to_lowercase()));
        }
        if let Some(from) = filter.submitted_from
            && let Some(start) = from.and_hms_opt(0, 0, 0)
        {
            self = self.filter(applications::Column::SubmittedAt.gte(start.and_utc()));
        }
        if let Some(to) = filter.submitted_to
            && let Some(end) = to.succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            self = self.filter(applications::Column::SubmittedAt.lt(end.and_utc()));
        }

        self
    }
}

fn apply_sort(
    query: Select<applications::Entity>,
    sort: ApplicationSort,
) -> Select<applications::Entity> {
    let order = match sort.direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };
    let column = match sort.key {
        SortKey::SubmittedAt => applications::Column::SubmittedAt,
        SortKey::LastName => applications::Column::LastName,
        SortKey::Status => applications::Column::Status,
        SortKey::Program => applications::Column::Program,
    };
    // Explicit id tie-break keeps pagination stable for equal sort keys.
    query
        .order_by(column, order)
        .order_by_asc(applications::Column::Id)
}

/// Base select with all list filters applied and no scope. Report
/// resolution reuses it for the unpaginated export set.
pub(super) fn filtered_query(filter: &ApplicationListFilter) -> Select<applications::Entity> {
    applications::Entity::find().apply_list_filters(filter)
}

impl Engine {
    /// Lists applications the actor is allowed to see, filtered, sorted and
    /// paginated.
    ///
    /// Applicants are implicitly restricted to their own records; staff and
    /// admin see the whole set. Pure read, no side effects.
    pub async fn list_applications(
        &self,
        actor: &users::Model,
        filter: &ApplicationListFilter,
        page: u64,
        per_page: u64,
    ) -> ResultEngine<ApplicationPage> {
        with_tx!(self, |db_tx| {
            validate_list_input(filter, page, per_page)?;
            let role = actor.role()?;

            let mut query = applications::Entity::find();
            if !role.is_reviewer() {
                query = query.filter(applications::Column::UserId.eq(actor.id));
            }
            query = query.apply_list_filters(filter);
            query = apply_sort(query, filter.sort.unwrap_or_default());

            let paginator = query.paginate(&db_tx, per_page);
            let counts = paginator.num_items_and_pages().await?;
            let models = paginator.fetch_page(page - 1).await?;

            let mut items = Vec::with_capacity(models.len());
            for model in models {
                items.push(Application::try_from(model)?);
            }

            Ok(ApplicationPage {
                items,
                page_info: PageInfo {
                    page,
                    per_page,
                    total_items: counts.number_of_items,
                    total_pages: counts.number_of_pages,
                },
            })
        })
    }

    /// The staff triage queue: pending applications, oldest first.
    pub async fn pending_queue(
        &self,
        actor: &users::Model,
        search: Option<String>,
        page: u64,
        per_page: u64,
    ) -> ResultEngine<ApplicationPage> {
        self.require_reviewer(actor)?;
        let filter = ApplicationListFilter {
            search,
            status: Some(ApplicationStatus::Pending),
            sort: Some(ApplicationSort {
                key: SortKey::SubmittedAt,
                direction: SortDirection::Asc,
            }),
            ..Default::default()
        };
        self.list_applications(actor, &filter, page, per_page).await
    }
}
