//! The row-level store boundary for profiles.
//!
//! The store itself is external; this trait names the four operations the
//! routing/bootstrap core needs. Absence of a row is `Ok(None)` — the
//! expected state for a freshly authenticated principal — and must never
//! be conflated with a store failure.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use studysync_core::PrincipalId;

use crate::profile::{Profile, TutorProfile};

/// Failures from the external store, distinct from "no row".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or rejected the query outright.
    Unavailable { details: String },
    /// A named relation does not exist: the deployment is uninitialized.
    RelationMissing { relation: String },
    /// An insert violated a uniqueness constraint.
    UniqueViolation { relation: String },
    /// A row was read but could not be interpreted (e.g. unknown role).
    Malformed { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => write!(f, "store unavailable: {details}"),
            Self::RelationMissing { relation } => {
                write!(f, "relation '{relation}' does not exist")
            }
            Self::UniqueViolation { relation } => {
                write!(f, "unique constraint violated on '{relation}'")
            }
            Self::Malformed { details } => write!(f, "malformed row: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Row-level access to the `profiles` and `tutor_profiles` relations.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches the profile for a principal. `Ok(None)` means the principal
    /// has not been bootstrapped yet.
    async fn fetch_profile(&self, id: &PrincipalId) -> Result<Option<Profile>, StoreError>;

    /// Inserts a new profile row.
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Fetches the tutor profile for a teacher principal.
    async fn fetch_tutor_profile(
        &self,
        id: &PrincipalId,
    ) -> Result<Option<TutorProfile>, StoreError>;

    /// Inserts a new tutor profile row.
    async fn insert_tutor_profile(&self, tutor: &TutorProfile) -> Result<(), StoreError>;
}

// Lets consumers hold one shared store (including a trait object) and
// still hand it to anything generic over `ProfileStore`.
#[async_trait]
impl<S: ProfileStore + ?Sized> ProfileStore for Arc<S> {
    async fn fetch_profile(&self, id: &PrincipalId) -> Result<Option<Profile>, StoreError> {
        (**self).fetch_profile(id).await
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        (**self).insert_profile(profile).await
    }

    async fn fetch_tutor_profile(
        &self,
        id: &PrincipalId,
    ) -> Result<Option<TutorProfile>, StoreError> {
        (**self).fetch_tutor_profile(id).await
    }

    async fn insert_tutor_profile(&self, tutor: &TutorProfile) -> Result<(), StoreError> {
        (**self).insert_tutor_profile(tutor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::RelationMissing {
            relation: "profiles".to_string(),
        };
        assert_eq!(err.to_string(), "relation 'profiles' does not exist");

        let err = StoreError::UniqueViolation {
            relation: "profiles".to_string(),
        };
        assert!(err.to_string().contains("unique constraint"));
    }
}
