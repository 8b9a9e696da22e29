//! The platform role enumeration.
//!
//! Every profile carries exactly one role, fixed at bootstrap. The enum is
//! exhaustive on purpose: an unrecognized role value in storage is a
//! distinguishable condition handled by the router, never silently folded
//! into one of the real roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to a profile at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A learner: sees the student dashboard and booking flows.
    Student,
    /// A tutor: sees the teacher dashboard and carries a tutor profile.
    Teacher,
}

impl Role {
    /// Returns the role as its stored string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
        }
    }

    /// Returns the dashboard path for this role.
    #[must_use]
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::Student => "/student",
            Self::Teacher => "/teacher",
        }
    }

    /// Parses a sign-up metadata hint. Unrecognized hints are treated as
    /// absent, letting the bootstrapper apply its student default.
    #[must_use]
    pub fn from_hint(hint: Option<&str>) -> Option<Self> {
        hint.and_then(|h| h.parse().ok())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a stored role value is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The value that failed to parse.
    pub value: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized role '{}'", self.value)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            other => Err(ParseRoleError {
                value: other.to_string(),
            }),
        }
    }
}
