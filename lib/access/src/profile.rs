//! Application user records: `Profile` and `TutorProfile`.
//!
//! A profile is the application-level record keyed by principal id,
//! created once by the bootstrapper on first authenticated access. Tutor
//! profiles exist only for teacher principals and carry the marketplace
//! fields. The gamification counters are mutated by the session-recording
//! flows, not by anything in this crate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use studysync_core::{PrincipalId, ProfileId, TutorProfileId};

/// Placeholder bio written for a freshly bootstrapped tutor.
pub const DEFAULT_TUTOR_BIO: &str = "New tutor - profile setup pending";

/// Default hourly rate for a new tutor, in currency minor units.
pub const DEFAULT_HOURLY_RATE_CENTS: i32 = 2500;

/// One row per principal in the `profiles` relation.
///
/// Invariant: at most one profile per principal id; the role never changes
/// after creation (no role-change path exists).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub principal_id: PrincipalId,
    pub role: crate::role::Role,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub study_level: i32,
    pub total_xp: i64,
    pub study_streak: i32,
    pub longest_streak: i32,
    pub last_study_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a fresh profile with zeroed gamification counters.
    #[must_use]
    pub fn new(
        principal_id: PrincipalId,
        role: crate::role::Role,
        display_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProfileId::new(),
            principal_id,
            role,
            display_name,
            bio: None,
            avatar_url: None,
            study_level: 1,
            total_xp: 0,
            study_streak: 0,
            longest_streak: 0,
            last_study_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One row per teacher principal in the `tutor_profiles` relation.
///
/// Created alongside the profile when the bootstrapped role is teacher;
/// the idempotent bootstrap-check path repairs a missing row for an
/// existing teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorProfile {
    pub id: TutorProfileId,
    pub principal_id: PrincipalId,
    pub bio: String,
    pub hourly_rate_cents: i32,
    pub subjects: Vec<String>,
    pub languages: Vec<String>,
    pub education: Option<String>,
    pub experience_years: i32,
    /// Weekly availability, opaque to this layer.
    pub availability: serde_json::Value,
    pub timezone: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub total_sessions: i32,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub response_time_hours: i32,
    /// Payment provider account, passthrough only.
    pub payment_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TutorProfile {
    /// Creates a tutor profile with the fixed bootstrap defaults.
    #[must_use]
    pub fn with_defaults(principal_id: PrincipalId) -> Self {
        let now = Utc::now();
        Self {
            id: TutorProfileId::new(),
            principal_id,
            bio: DEFAULT_TUTOR_BIO.to_string(),
            hourly_rate_cents: DEFAULT_HOURLY_RATE_CENTS,
            subjects: Vec::new(),
            languages: Vec::new(),
            education: None,
            experience_years: 0,
            availability: serde_json::json!({}),
            timezone: "UTC".to_string(),
            is_verified: false,
            is_active: true,
            total_sessions: 0,
            average_rating: 0.0,
            total_reviews: 0,
            response_time_hours: 24,
            payment_account_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Derives a display name from an email's local part.
#[must_use]
pub fn display_name_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next().unwrap_or(email);
    if local.is_empty() {
        None
    } else {
        Some(local.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn new_profile_has_zeroed_counters() {
        let profile = Profile::new(PrincipalId::from("p1"), Role::Student, None);
        assert_eq!(profile.study_level, 1);
        assert_eq!(profile.total_xp, 0);
        assert_eq!(profile.study_streak, 0);
        assert_eq!(profile.longest_streak, 0);
        assert!(profile.last_study_date.is_none());
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn tutor_defaults_match_bootstrap_contract() {
        let tutor = TutorProfile::with_defaults(PrincipalId::from("p2"));
        assert_eq!(tutor.bio, DEFAULT_TUTOR_BIO);
        assert_eq!(tutor.hourly_rate_cents, 2500);
        assert!(tutor.subjects.is_empty());
        assert_eq!(tutor.availability, serde_json::json!({}));
        assert!(!tutor.is_verified);
        assert!(tutor.is_active);
        assert_eq!(tutor.average_rating, 0.0);
    }

    #[test]
    fn display_name_from_email_takes_local_part() {
        assert_eq!(
            display_name_from_email("alice@example.com").as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn display_name_from_email_handles_degenerate_input() {
        assert_eq!(display_name_from_email("@example.com"), None);
        assert_eq!(display_name_from_email(""), None);
        assert_eq!(display_name_from_email("no-at-sign").as_deref(), Some("no-at-sign"));
    }
}
