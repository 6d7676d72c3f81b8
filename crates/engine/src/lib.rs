//! Assista domain core.
//!
//! The engine owns the case-record lifecycle: role-scoped queries, the
//! status state machine, report resolution, settings, in-app notifications
//! and the budget ledger. All persistence goes through sea-orm; every
//! multi-step write runs inside a database transaction.
//!
//! Outbound channels (email, SMS) live in the `notifier` crate; the engine
//! only hands them [`ApplicationEvent`]s after a transition commits.

pub use applications::Application;
pub use attachments::AttachmentSlot;
pub use budget_logs::BudgetEntryKind;
pub use error::EngineError;
pub use events::{ApplicationEvent, EventKind, Recipient};
pub use money::format_minor;
pub use ops::{
    ACCEPTING_APPLICATIONS, ApplicationDetail, ApplicationListFilter, ApplicationPage,
    ApplicationSort, ApplicationUpdate, Engine, EngineBuilder, NewApplication, NewAttachment,
    PageInfo, ProgramUpsert, ReportData, ReportFilter, ReportRow, SIGNATORY_CSWDO_HEAD,
    SIGNATORY_MAYOR, SIGNATORY_SOCIAL_WORKER, SYSTEM_ANNOUNCEMENT, Signatories, SortDirection,
    SortKey, StatusTotals,
};
pub use programs::ProgramCategory;
pub use role::Role;
pub use status::{ApplicationStatus, TransitionAction, transition};

pub mod applications;
pub mod attachments;
pub mod budget_logs;
mod error;
mod events;
mod money;
pub mod notifications;
mod ops;
pub mod programs;
mod role;
pub mod settings;
mod status;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
