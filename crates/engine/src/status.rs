//! Application status lifecycle.
//!
//! The lifecycle is a three-state machine: `Pending` is the initial state,
//! `Approved` and `Rejected` are terminal except that a rejected application
//! may be resubmitted by its owner, which returns it to `Pending`.
//!
//! `transition` is total over every (state, action) pair; the six invalid
//! pairs yield [`EngineError::StateConflict`] instead of silently
//! overwriting.

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Label used on exports and outbound messages.
    pub fn display(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl TryFrom<&str> for ApplicationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::validation(
                "status",
                format!("invalid status: {other}"),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionAction {
    Approve,
    Reject,
    Resubmit,
}

impl TransitionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Resubmit => "resubmit",
        }
    }
}

/// Compute the target state for an action, or a conflict for the pairs the
/// lifecycle does not allow.
pub fn transition(
    status: ApplicationStatus,
    action: TransitionAction,
) -> Result<ApplicationStatus, EngineError> {
    use ApplicationStatus::{Approved, Pending, Rejected};
    use TransitionAction::{Approve, Reject, Resubmit};

    match (status, action) {
        (Pending, Approve) => Ok(Approved),
        (Pending, Reject) => Ok(Rejected),
        (Rejected, Resubmit) => Ok(Pending),
        (current, action) => Err(EngineError::StateConflict(format!(
            "cannot {} an application in status {}",
            action.as_str(),
            current.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::{Approved, Pending, Rejected};
    use TransitionAction::{Approve, Reject, Resubmit};

    #[test]
    fn valid_pairs() {
        assert_eq!(transition(Pending, Approve).unwrap(), Approved);
        assert_eq!(transition(Pending, Reject).unwrap(), Rejected);
        assert_eq!(transition(Rejected, Resubmit).unwrap(), Pending);
    }

    #[test]
    fn invalid_pairs_conflict() {
        let invalid = [
            (Pending, Resubmit),
            (Approved, Approve),
            (Approved, Reject),
            (Approved, Resubmit),
            (Rejected, Approve),
            (Rejected, Reject),
        ];
        for (status, action) in invalid {
            assert!(
                matches!(
                    transition(status, action),
                    Err(EngineError::StateConflict(_))
                ),
                "expected conflict for ({status:?}, {action:?})"
            );
        }
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [Pending, Approved, Rejected] {
            assert_eq!(
                ApplicationStatus::try_from(status.as_str()).unwrap(),
                status
            );
        }
        assert!(ApplicationStatus::try_from("archived").is_err());
    }
}
