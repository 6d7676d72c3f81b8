//! Transition events handed to the notification fan-out.
//!
//! Ops return an event only after the record mutation committed, so a failed
//! persistence never produces a notification.

use serde::{Deserialize, Serialize};

use crate::{Application, EngineError, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Approved,
    Rejected,
    Resubmitted,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Resubmitted => "resubmitted",
        }
    }
}

impl TryFrom<&str> for EventKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "resubmitted" => Ok(Self::Resubmitted),
            other => Err(EngineError::validation(
                "event",
                format!("invalid event kind: {other}"),
            )),
        }
    }
}

/// Who a channel delivers to. Carries only what the channels need.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: i32,
    pub role: Role,
    pub first_name: String,
    pub email: String,
    pub contact_number: Option<String>,
}

/// One committed transition.
///
/// `Approved`/`Rejected` events address the owning applicant; `Resubmitted`
/// addresses the reviewer set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationEvent {
    pub kind: EventKind,
    pub application: Application,
    pub recipients: Vec<Recipient>,
}
