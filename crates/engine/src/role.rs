//! Actor roles.
//!
//! The original system checked both a `role` and a `type` attribute in
//! different paths. Here there is a single `role` column; parsing still
//! accepts the legacy `"user"` spelling as a compatibility shim.

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Applicant,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applicant => "applicant",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Staff and admin review applications; applicants only own them.
    pub fn is_reviewer(self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "applicant" => Ok(Self::Applicant),
            // Legacy rows used "user" for applicants. Remove once all rows
            // are migrated.
            "user" => Ok(Self::Applicant),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::validation(
                "role",
                format!("invalid role: {other}"),
            )),
        }
    }
}
