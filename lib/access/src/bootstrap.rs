//! First-login bootstrap of default rows.
//!
//! On the first authenticated access with no profile row, the bootstrapper
//! creates one (and a tutor profile for teachers) with fixed defaults.
//! The operation is idempotent: repeated calls never duplicate rows and
//! never fail merely because the rows already exist. Concurrent first
//! logins by the same principal can race through the check-then-insert
//! sequence; a unique-constraint violation on the profile insert is
//! therefore treated as "already bootstrapped", not as a failure.

use std::fmt;
use studysync_core::PrincipalId;

use crate::profile::{display_name_from_email, Profile, TutorProfile};
use crate::role::Role;
use crate::store::{ProfileStore, StoreError};

/// Optional hints carried from sign-up metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapHints<'a> {
    /// Preferred display name; falls back to the email local part.
    pub display_name: Option<&'a str>,
    /// Requested role; defaults to student when absent.
    pub role: Option<Role>,
}

/// What `ensure` found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A profile already existed (possibly repaired with a tutor row).
    AlreadyProvisioned { role: Role },
    /// A fresh profile (and tutor profile, for teachers) was created.
    Created { role: Role },
}

impl BootstrapOutcome {
    /// The role recorded on the principal's profile.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::AlreadyProvisioned { role } | Self::Created { role } => *role,
        }
    }
}

/// Failures that leave the principal un-bootstrapped.
///
/// Tutor-profile insert failures are deliberately absent: that row is
/// best-effort and its failure is logged, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    /// The pre-insert profile lookup failed.
    Lookup { source: StoreError },
    /// The mandatory profile insert failed.
    ProfileInsert { source: StoreError },
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup { source } => write!(f, "profile lookup failed: {source}"),
            Self::ProfileInsert { source } => write!(f, "profile insert failed: {source}"),
        }
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lookup { source } | Self::ProfileInsert { source } => Some(source),
        }
    }
}

/// Creates default rows for newly authenticated principals.
pub struct Bootstrapper<S> {
    store: S,
}

impl<S: ProfileStore> Bootstrapper<S> {
    /// Creates a bootstrapper over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Ensures the principal has its default rows.
    ///
    /// # Errors
    ///
    /// Fails only when the profile lookup or the mandatory profile insert
    /// fails; tutor-profile problems are logged and swallowed so a
    /// non-critical row never blocks the user from their dashboard.
    pub async fn ensure(
        &self,
        principal_id: &PrincipalId,
        email: &str,
        hints: BootstrapHints<'_>,
    ) -> Result<BootstrapOutcome, BootstrapError> {
        let existing = self
            .store
            .fetch_profile(principal_id)
            .await
            .map_err(|source| BootstrapError::Lookup { source })?;

        if let Some(profile) = existing {
            if profile.role == Role::Teacher {
                self.repair_tutor_profile(principal_id).await;
            }
            return Ok(BootstrapOutcome::AlreadyProvisioned { role: profile.role });
        }

        let role = hints.role.unwrap_or(Role::Student);
        let display_name = hints
            .display_name
            .map(str::to_string)
            .or_else(|| display_name_from_email(email));

        let profile = Profile::new(principal_id.clone(), role, display_name);
        match self.store.insert_profile(&profile).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation { .. }) => {
                // Lost a concurrent first-login race; the row exists now.
                tracing::debug!(principal = %principal_id, "profile insert raced, row already present");
                let role = match self.store.fetch_profile(principal_id).await {
                    Ok(Some(winner)) => winner.role,
                    Ok(None) | Err(_) => role,
                };
                return Ok(BootstrapOutcome::AlreadyProvisioned { role });
            }
            Err(source) => {
                tracing::error!(principal = %principal_id, error = %source, "profile bootstrap insert failed");
                return Err(BootstrapError::ProfileInsert { source });
            }
        }

        if role == Role::Teacher {
            self.insert_tutor_profile(principal_id).await;
        }

        Ok(BootstrapOutcome::Created { role })
    }

    /// Creates a missing tutor profile for an existing teacher, repairing a
    /// previously interrupted bootstrap. Best-effort throughout.
    async fn repair_tutor_profile(&self, principal_id: &PrincipalId) {
        match self.store.fetch_tutor_profile(principal_id).await {
            Ok(Some(_)) => {}
            Ok(None) => self.insert_tutor_profile(principal_id).await,
            Err(e) => {
                tracing::warn!(principal = %principal_id, error = %e, "tutor profile check failed");
            }
        }
    }

    async fn insert_tutor_profile(&self, principal_id: &PrincipalId) {
        let tutor = TutorProfile::with_defaults(principal_id.clone());
        match self.store.insert_tutor_profile(&tutor).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation { .. }) => {
                tracing::debug!(principal = %principal_id, "tutor profile already present");
            }
            Err(e) => {
                tracing::warn!(principal = %principal_id, error = %e, "tutor profile creation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store with injectable failures and call counters.
    #[derive(Default)]
    struct MemoryStore {
        profiles: Mutex<HashMap<PrincipalId, Profile>>,
        tutors: Mutex<HashMap<PrincipalId, TutorProfile>>,
        fail_profile_insert: Option<StoreError>,
        fail_tutor_insert: Option<StoreError>,
        profile_inserts: AtomicUsize,
        tutor_inserts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ProfileStore for MemoryStore {
        async fn fetch_profile(&self, id: &PrincipalId) -> Result<Option<Profile>, StoreError> {
            Ok(self.profiles.lock().unwrap().get(id).cloned())
        }

        async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
            self.profile_inserts.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.fail_profile_insert {
                return Err(err.clone());
            }
            let mut profiles = self.profiles.lock().unwrap();
            if profiles.contains_key(&profile.principal_id) {
                return Err(StoreError::UniqueViolation {
                    relation: "profiles".to_string(),
                });
            }
            profiles.insert(profile.principal_id.clone(), profile.clone());
            Ok(())
        }

        async fn fetch_tutor_profile(
            &self,
            id: &PrincipalId,
        ) -> Result<Option<TutorProfile>, StoreError> {
            Ok(self.tutors.lock().unwrap().get(id).cloned())
        }

        async fn insert_tutor_profile(&self, tutor: &TutorProfile) -> Result<(), StoreError> {
            self.tutor_inserts.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.fail_tutor_insert {
                return Err(err.clone());
            }
            let mut tutors = self.tutors.lock().unwrap();
            if tutors.contains_key(&tutor.principal_id) {
                return Err(StoreError::UniqueViolation {
                    relation: "tutor_profiles".to_string(),
                });
            }
            tutors.insert(tutor.principal_id.clone(), tutor.clone());
            Ok(())
        }
    }

    fn principal() -> PrincipalId {
        PrincipalId::from("principal-1")
    }

    #[tokio::test]
    async fn first_login_creates_student_profile_by_default() {
        let bootstrapper = Bootstrapper::new(MemoryStore::default());
        let outcome = bootstrapper
            .ensure(&principal(), "alice@example.com", BootstrapHints::default())
            .await
            .expect("should succeed");

        assert_eq!(outcome, BootstrapOutcome::Created { role: Role::Student });
        let profile = bootstrapper
            .store
            .fetch_profile(&principal())
            .await
            .unwrap()
            .expect("profile exists");
        assert_eq!(profile.role, Role::Student);
        assert_eq!(profile.display_name.as_deref(), Some("alice"));
        assert!(bootstrapper.store.tutors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn teacher_hint_creates_both_rows_with_defaults() {
        let bootstrapper = Bootstrapper::new(MemoryStore::default());
        let outcome = bootstrapper
            .ensure(
                &principal(),
                "bob@example.com",
                BootstrapHints {
                    display_name: Some("Bob"),
                    role: Some(Role::Teacher),
                },
            )
            .await
            .expect("should succeed");

        assert_eq!(outcome, BootstrapOutcome::Created { role: Role::Teacher });
        let tutor = bootstrapper
            .store
            .fetch_tutor_profile(&principal())
            .await
            .unwrap()
            .expect("tutor profile exists");
        assert_eq!(tutor.hourly_rate_cents, 2500);
        assert!(tutor.subjects.is_empty());
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let bootstrapper = Bootstrapper::new(MemoryStore::default());
        let hints = BootstrapHints {
            display_name: None,
            role: Some(Role::Teacher),
        };

        let first = bootstrapper
            .ensure(&principal(), "t@example.com", hints)
            .await
            .expect("first call succeeds");
        let second = bootstrapper
            .ensure(&principal(), "t@example.com", hints)
            .await
            .expect("second call succeeds");

        assert_eq!(first, BootstrapOutcome::Created { role: Role::Teacher });
        assert_eq!(
            second,
            BootstrapOutcome::AlreadyProvisioned { role: Role::Teacher }
        );
        assert_eq!(bootstrapper.store.profiles.lock().unwrap().len(), 1);
        assert_eq!(bootstrapper.store.tutors.lock().unwrap().len(), 1);
        // The second call must not have attempted another profile insert.
        assert_eq!(bootstrapper.store.profile_inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn student_profile_never_gains_a_tutor_row() {
        let bootstrapper = Bootstrapper::new(MemoryStore::default());
        for _ in 0..3 {
            bootstrapper
                .ensure(&principal(), "s@example.com", BootstrapHints::default())
                .await
                .expect("succeeds");
        }
        assert!(bootstrapper.store.tutors.lock().unwrap().is_empty());
        assert_eq!(bootstrapper.store.tutor_inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn interrupted_teacher_bootstrap_is_repaired() {
        let store = MemoryStore::default();
        // Simulate an earlier bootstrap that only got the profile in.
        let profile = Profile::new(principal(), Role::Teacher, Some("T".to_string()));
        store
            .profiles
            .lock()
            .unwrap()
            .insert(principal(), profile);

        let bootstrapper = Bootstrapper::new(store);
        let outcome = bootstrapper
            .ensure(&principal(), "t@example.com", BootstrapHints::default())
            .await
            .expect("succeeds");

        assert_eq!(
            outcome,
            BootstrapOutcome::AlreadyProvisioned { role: Role::Teacher }
        );
        assert!(bootstrapper
            .store
            .fetch_tutor_profile(&principal())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn profile_insert_failure_is_fatal() {
        let store = MemoryStore {
            fail_profile_insert: Some(StoreError::Unavailable {
                details: "connection reset".to_string(),
            }),
            ..MemoryStore::default()
        };
        let bootstrapper = Bootstrapper::new(store);
        let err = bootstrapper
            .ensure(&principal(), "x@example.com", BootstrapHints::default())
            .await
            .expect_err("must fail");
        assert!(matches!(err, BootstrapError::ProfileInsert { .. }));
    }

    #[tokio::test]
    async fn tutor_insert_failure_is_swallowed() {
        let store = MemoryStore {
            fail_tutor_insert: Some(StoreError::Unavailable {
                details: "connection reset".to_string(),
            }),
            ..MemoryStore::default()
        };
        let bootstrapper = Bootstrapper::new(store);
        let outcome = bootstrapper
            .ensure(
                &principal(),
                "t@example.com",
                BootstrapHints {
                    display_name: None,
                    role: Some(Role::Teacher),
                },
            )
            .await
            .expect("tutor failure must not block bootstrap");
        assert_eq!(outcome, BootstrapOutcome::Created { role: Role::Teacher });
        assert!(bootstrapper.store.tutors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unique_violation_on_insert_resolves_to_winner_role() {
        /// Store whose fetch lies once: first fetch sees nothing, the
        /// insert then collides, and the re-fetch sees the winner.
        struct RacingStore {
            inner: MemoryStore,
            fetches: AtomicUsize,
        }

        #[async_trait::async_trait]
        impl ProfileStore for RacingStore {
            async fn fetch_profile(
                &self,
                id: &PrincipalId,
            ) -> Result<Option<Profile>, StoreError> {
                if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Ok(None);
                }
                self.inner.fetch_profile(id).await
            }

            async fn insert_profile(&self, _profile: &Profile) -> Result<(), StoreError> {
                Err(StoreError::UniqueViolation {
                    relation: "profiles".to_string(),
                })
            }

            async fn fetch_tutor_profile(
                &self,
                id: &PrincipalId,
            ) -> Result<Option<TutorProfile>, StoreError> {
                self.inner.fetch_tutor_profile(id).await
            }

            async fn insert_tutor_profile(&self, tutor: &TutorProfile) -> Result<(), StoreError> {
                self.inner.insert_tutor_profile(tutor).await
            }
        }

        let inner = MemoryStore::default();
        let winner = Profile::new(principal(), Role::Teacher, None);
        inner.profiles.lock().unwrap().insert(principal(), winner);

        let bootstrapper = Bootstrapper::new(RacingStore {
            inner,
            fetches: AtomicUsize::new(0),
        });
        let outcome = bootstrapper
            .ensure(&principal(), "race@example.com", BootstrapHints::default())
            .await
            .expect("race resolves to success");
        assert_eq!(
            outcome,
            BootstrapOutcome::AlreadyProvisioned { role: Role::Teacher }
        );
    }
}
