//! The access-router middleware.
//!
//! Runs on every navigable request: resolves the session from cookies,
//! fetches the profile when the decision needs it, and either redirects
//! or passes through with the resolved principal attached as a request
//! extension. Rotated tokens from a session refresh are written onto the
//! outgoing response; dropping them would log the user out next request.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use studysync_access::router::LOGIN_PATH;
use studysync_access::{decide, needs_profile, Profile, ProfileGate, RouteDecision, StoreError};
use studysync_access::store::ProfileStore;
use studysync_identity::{IdentityError, Principal, ResolvedSession};

use super::cookies;
use super::AppState;

/// The resolved principal and profile, attached to passed-through
/// requests for handlers to read.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub principal: Principal,
    /// Present when the access decision fetched the profile.
    pub profile: Option<Profile>,
}

/// Middleware entry point, installed with
/// `axum::middleware::from_fn_with_state`.
pub async fn access_router(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let resolved = match resolve_session(&state, &jar).await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(error = %e, path, "identity provider unreachable");
            return service_unavailable();
        }
    };
    let authenticated = resolved.is_some();

    let mut profile = None;
    let mut gate = None;
    if needs_profile(&path, authenticated) {
        if let Some(session) = &resolved {
            match state.store.fetch_profile(&session.principal.id).await {
                Ok(Some(found)) => {
                    gate = Some(ProfileGate::Found(found.role));
                    profile = Some(found);
                }
                Ok(None) => gate = Some(ProfileGate::Missing),
                Err(StoreError::Malformed { details }) => {
                    tracing::warn!(principal = %session.principal.id, details, "unusable profile row");
                    gate = Some(ProfileGate::Corrupt);
                }
                Err(e) => {
                    tracing::error!(error = %e, path, "profile lookup failed");
                    return service_unavailable();
                }
            }
        }
    }

    let response = match decide(&path, authenticated, gate) {
        RouteDecision::PassThrough => {
            if let Some(session) = &resolved {
                request.extensions_mut().insert(CurrentUser {
                    principal: session.principal.clone(),
                    profile,
                });
            }
            next.run(request).await
        }
        RouteDecision::ToLogin { return_to } => {
            Redirect::to(&login_redirect_url(return_to.as_deref())).into_response()
        }
        RouteDecision::ToSetup => {
            Redirect::to(studysync_access::router::SETUP_PATH).into_response()
        }
        RouteDecision::ToHome(role) => Redirect::to(role.home_path()).into_response(),
    };

    // Propagate rotated tokens regardless of which branch was taken.
    match resolved.and_then(|session| session.rotated) {
        Some(rotated) => {
            let jar = cookies::apply_session(jar, &rotated, state.cookie_config.secure);
            (jar, response).into_response()
        }
        None => response,
    }
}

/// Resolves the session from request cookies, if any.
async fn resolve_session(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Option<ResolvedSession>, IdentityError> {
    let Some(tokens) = cookies::session_tokens(jar) else {
        return Ok(None);
    };
    state.identity.resolve(&tokens).await
}

/// Login redirect carrying the originally requested path.
fn login_redirect_url(return_to: Option<&str>) -> String {
    match return_to {
        Some(path) => format!("{LOGIN_PATH}?returnUrl={}", urlencoding::encode(path)),
        None => LOGIN_PATH.to_string(),
    }
}

fn service_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Service temporarily unavailable. Please retry in a moment.",
    )
        .into_response()
}
