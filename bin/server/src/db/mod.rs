//! Postgres-backed `ProfileStore`.
//!
//! Row-level queries only; the schema is provisioned externally and
//! preflighted by [`status`](crate::db::status). Error mapping is the
//! contract that matters here: an absent row is `Ok(None)`, an undefined
//! table is `RelationMissing` (uninitialized deployment), and a duplicate
//! insert is `UniqueViolation` so the bootstrapper can treat a lost
//! first-login race as success.

pub mod status;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use studysync_access::{Profile, ProfileStore, Role, StoreError, TutorProfile};
use studysync_core::{PrincipalId, ProfileId, TutorProfileId};

/// Postgres error code for "undefined table".
const UNDEFINED_TABLE: &str = "42P01";

/// Postgres error code for "unique violation".
const UNIQUE_VIOLATION: &str = "23505";

/// Row type for profile queries.
#[derive(FromRow)]
struct ProfileRow {
    id: String,
    user_id: String,
    role: String,
    display_name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    study_level: i32,
    total_xp: i64,
    study_streak: i32,
    longest_streak: i32,
    last_study_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn try_into_profile(self) -> Result<Profile, StoreError> {
        let id = ProfileId::from_str(&self.id).map_err(|e| StoreError::Malformed {
            details: format!("invalid profile id '{}': {e}", self.id),
        })?;
        // An unparseable role is a distinguishable condition: the router
        // sends it to setup instead of defaulting to either real role.
        let role = Role::from_str(&self.role).map_err(|e| StoreError::Malformed {
            details: e.to_string(),
        })?;
        Ok(Profile {
            id,
            principal_id: PrincipalId::from(self.user_id),
            role,
            display_name: self.display_name,
            bio: self.bio,
            avatar_url: self.avatar_url,
            study_level: self.study_level,
            total_xp: self.total_xp,
            study_streak: self.study_streak,
            longest_streak: self.longest_streak,
            last_study_date: self.last_study_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row type for tutor profile queries.
#[derive(FromRow)]
struct TutorProfileRow {
    id: String,
    user_id: String,
    bio: String,
    hourly_rate_cents: i32,
    subjects: Vec<String>,
    languages: Vec<String>,
    education: Option<String>,
    experience_years: i32,
    availability: serde_json::Value,
    timezone: String,
    is_verified: bool,
    is_active: bool,
    total_sessions: i32,
    average_rating: f64,
    total_reviews: i32,
    response_time_hours: i32,
    payment_account_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TutorProfileRow {
    fn try_into_tutor_profile(self) -> Result<TutorProfile, StoreError> {
        let id = TutorProfileId::from_str(&self.id).map_err(|e| StoreError::Malformed {
            details: format!("invalid tutor profile id '{}': {e}", self.id),
        })?;
        Ok(TutorProfile {
            id,
            principal_id: PrincipalId::from(self.user_id),
            bio: self.bio,
            hourly_rate_cents: self.hourly_rate_cents,
            subjects: self.subjects,
            languages: self.languages,
            education: self.education,
            experience_years: self.experience_years,
            availability: self.availability,
            timezone: self.timezone,
            is_verified: self.is_verified,
            is_active: self.is_active,
            total_sessions: self.total_sessions,
            average_rating: self.average_rating,
            total_reviews: self.total_reviews,
            response_time_hours: self.response_time_hours,
            payment_account_id: self.payment_account_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// `ProfileStore` over a Postgres pool.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Creates a store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch_profile(&self, id: &PrincipalId) -> Result<Option<Profile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, role, display_name, bio, avatar_url,
                   study_level, total_xp, study_streak, longest_streak,
                   last_study_date, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "profiles"))?;

        row.map(ProfileRow::try_into_profile).transpose()
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles
                (id, user_id, role, display_name, bio, avatar_url,
                 study_level, total_xp, study_streak, longest_streak,
                 last_study_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(profile.id.to_string())
        .bind(profile.principal_id.as_str())
        .bind(profile.role.as_str())
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(&profile.avatar_url)
        .bind(profile.study_level)
        .bind(profile.total_xp)
        .bind(profile.study_streak)
        .bind(profile.longest_streak)
        .bind(profile.last_study_date)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "profiles"))?;

        Ok(())
    }

    async fn fetch_tutor_profile(
        &self,
        id: &PrincipalId,
    ) -> Result<Option<TutorProfile>, StoreError> {
        let row: Option<TutorProfileRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, bio, hourly_rate_cents, subjects, languages,
                   education, experience_years, availability, timezone,
                   is_verified, is_active, total_sessions, average_rating,
                   total_reviews, response_time_hours, payment_account_id,
                   created_at, updated_at
            FROM tutor_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "tutor_profiles"))?;

        row.map(TutorProfileRow::try_into_tutor_profile).transpose()
    }

    async fn insert_tutor_profile(&self, tutor: &TutorProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tutor_profiles
                (id, user_id, bio, hourly_rate_cents, subjects, languages,
                 education, experience_years, availability, timezone,
                 is_verified, is_active, total_sessions, average_rating,
                 total_reviews, response_time_hours, payment_account_id,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(tutor.id.to_string())
        .bind(tutor.principal_id.as_str())
        .bind(&tutor.bio)
        .bind(tutor.hourly_rate_cents)
        .bind(&tutor.subjects)
        .bind(&tutor.languages)
        .bind(&tutor.education)
        .bind(tutor.experience_years)
        .bind(&tutor.availability)
        .bind(&tutor.timezone)
        .bind(tutor.is_verified)
        .bind(tutor.is_active)
        .bind(tutor.total_sessions)
        .bind(tutor.average_rating)
        .bind(tutor.total_reviews)
        .bind(tutor.response_time_hours)
        .bind(&tutor.payment_account_id)
        .bind(tutor.created_at)
        .bind(tutor.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "tutor_profiles"))?;

        Ok(())
    }
}

/// Maps a sqlx error onto the store's error taxonomy.
fn map_sqlx_error(error: sqlx::Error, relation: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &error {
        match db.code().as_deref() {
            Some(UNDEFINED_TABLE) => {
                return StoreError::RelationMissing {
                    relation: relation.to_string(),
                };
            }
            Some(UNIQUE_VIOLATION) => {
                return StoreError::UniqueViolation {
                    relation: relation.to_string(),
                };
            }
            _ => {}
        }
    }
    StoreError::Unavailable {
        details: error.to_string(),
    }
}
