//! Database readiness preflight and health endpoint.
//!
//! The schema is provisioned out of band, so a fresh deployment can come
//! up against an empty database. Rather than failing requests one by one,
//! the server checks the required relations at startup and exposes the
//! same check at `/healthz` for operators and load balancers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::AppState;

/// Relations the application reads or writes (or preflights on behalf of
/// the rest of the platform).
pub const REQUIRED_RELATIONS: [&str; 5] = [
    "profiles",
    "tutor_profiles",
    "study_sessions",
    "achievements",
    "study_rooms",
];

/// Result of the readiness check.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    /// Whether the database answered at all.
    pub connected: bool,
    /// Required relations that do not exist.
    pub missing_relations: Vec<String>,
    /// Connected with every required relation present.
    pub ready: bool,
}

/// Checks connectivity and the existence of every required relation.
pub async fn check(pool: &PgPool) -> DatabaseStatus {
    let mut missing = Vec::new();

    for relation in REQUIRED_RELATIONS {
        let exists: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT to_regclass($1)::text")
                .bind(relation)
                .fetch_one(pool)
                .await;

        match exists {
            Ok(Some(_)) => {}
            Ok(None) => missing.push(relation.to_string()),
            Err(e) => {
                tracing::error!(error = %e, "database readiness check failed");
                return DatabaseStatus {
                    connected: false,
                    missing_relations: Vec::new(),
                    ready: false,
                };
            }
        }
    }

    DatabaseStatus {
        connected: true,
        ready: missing.is_empty(),
        missing_relations: missing,
    }
}

/// `GET /healthz`: readiness as JSON, 503 until the database is usable.
pub async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = check(&state.db_pool).await;
    let code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_for_operators() {
        let status = DatabaseStatus {
            connected: true,
            missing_relations: vec!["profiles".to_string()],
            ready: false,
        };
        let json = serde_json::to_value(&status).expect("serialize");
        assert_eq!(json["connected"], true);
        assert_eq!(json["ready"], false);
        assert_eq!(json["missing_relations"][0], "profiles");
    }

    #[test]
    fn profile_relations_are_preflighted() {
        assert!(REQUIRED_RELATIONS.contains(&"profiles"));
        assert!(REQUIRED_RELATIONS.contains(&"tutor_profiles"));
    }
}
