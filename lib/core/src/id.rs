//! Strongly-typed ID types for domain entities.
//!
//! Row identifiers use ULID (Universally Unique Lexicographically Sortable
//! Identifier) format, providing both uniqueness and temporal ordering.
//! The `PrincipalId` is different: it is issued by the external identity
//! provider and is treated as an opaque string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Identifier of an authenticated principal, issued by the identity provider.
///
/// The application never mints these itself; they arrive with a verified
/// session and key the `profiles` and `tutor_profiles` relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Creates a principal ID from a provider-issued string.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the principal ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PrincipalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Macro to generate a strongly-typed ID wrapper around ULID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Creates a new ID with a randomly generated ULID.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Creates an ID from a ULID.
            #[must_use]
            pub const fn from_ulid(ulid: Ulid) -> Self {
                Self(ulid)
            }

            /// Returns the underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }

            /// Returns the prefix used for display formatting.
            #[must_use]
            pub const fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Try with prefix first
                let prefix_with_underscore = concat!($prefix, "_");
                let ulid_str = if let Some(stripped) = s.strip_prefix(prefix_with_underscore) {
                    stripped
                } else {
                    // Try parsing as raw ULID
                    s
                };

                Ulid::from_str(ulid_str)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        reason: e.to_string(),
                    })
            }
        }

        impl From<Ulid> for $name {
            fn from(ulid: Ulid) -> Self {
                Self(ulid)
            }
        }

        impl From<$name> for Ulid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user profile row.
    ProfileId,
    "prof"
);

define_id!(
    /// Unique identifier for a tutor profile row.
    TutorProfileId,
    "tutor"
);

define_id!(
    /// Unique identifier for a recorded study session.
    StudySessionId,
    "study"
);

define_id!(
    /// Unique identifier for an achievement definition.
    AchievementId,
    "ach"
);

define_id!(
    /// Unique identifier for a study room.
    StudyRoomId,
    "room"
);

define_id!(
    /// Unique identifier for a tutor booking.
    BookingId,
    "book"
);

define_id!(
    /// Unique identifier for a tutor review.
    ReviewId,
    "rev"
);

define_id!(
    /// Unique identifier for a message.
    MessageId,
    "msg"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_id_display_format() {
        let id = ProfileId::new();
        let display = id.to_string();
        assert!(display.starts_with("prof_"));
    }

    #[test]
    fn tutor_profile_id_display_format() {
        let id = TutorProfileId::new();
        let display = id.to_string();
        assert!(display.starts_with("tutor_"));
    }

    #[test]
    fn parse_with_prefix() {
        let id = ProfileId::new();
        let display = id.to_string();
        let parsed: ProfileId = display.parse().expect("should parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_without_prefix() {
        let ulid = Ulid::new();
        let id: ProfileId = ulid.to_string().parse().expect("should parse");
        assert_eq!(id.as_ulid(), ulid);
    }

    #[test]
    fn parse_invalid_ulid() {
        let result: Result<ProfileId, _> = "not_a_ulid".parse();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.id_type, "ProfileId");
    }

    #[test]
    fn id_equality() {
        let ulid = Ulid::new();
        let id1 = ProfileId::from_ulid(ulid);
        let id2 = ProfileId::from_ulid(ulid);
        assert_eq!(id1, id2);
    }

    #[test]
    fn id_hash() {
        use std::collections::HashSet;

        let id1 = StudyRoomId::new();
        let id2 = StudyRoomId::new();

        let mut set = HashSet::new();
        set.insert(id1);
        set.insert(id2);
        set.insert(id1); // duplicate

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = BookingId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let parsed: BookingId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }

    #[test]
    fn principal_id_is_opaque() {
        let id = PrincipalId::from("a3f1c2d4-0000-4000-8000-000000000000");
        assert_eq!(id.as_str(), "a3f1c2d4-0000-4000-8000-000000000000");
        assert_eq!(id.to_string(), "a3f1c2d4-0000-4000-8000-000000000000");
    }

    #[test]
    fn principal_id_serde_is_transparent() {
        let id = PrincipalId::from("user-123");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"user-123\"");
        let parsed: PrincipalId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
