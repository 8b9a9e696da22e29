//! Route handlers for the auth flows.
//!
//! Every outcome is a redirect: failures land back on the login or
//! register page with an `error` query parameter for the page to render,
//! successes set session cookies and continue to the caller's dashboard.
//! Provider rejections never touch the store.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use studysync_access::router::{LOGIN_PATH, REGISTER_PATH, SETUP_PATH};
use studysync_access::{BootstrapHints, Bootstrapper, Role};
use studysync_identity::{IdentityApi, IdentityError, Principal, PrincipalMetadata, SessionTokens};

use super::cookies;
use super::AppState;

/// Query parameters for the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

/// Registration form fields.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    email: String,
    password: String,
    display_name: Option<String>,
    role: Option<String>,
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
    #[serde(rename = "returnUrl")]
    return_url: Option<String>,
}

/// Handles the provider redirect after an OAuth sign-in.
///
/// A missing or rejected code sends the user back to login without
/// touching the store; a valid code establishes the session and runs the
/// profile bootstrap before landing on the role's dashboard.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let session = match state.identity.exchange_code(code).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "authorization code exchange failed");
            return Redirect::to(&format!("{LOGIN_PATH}?error=callback_error")).into_response();
        }
    };

    establish(&state, jar, &session.principal, &session.tokens, None).await
}

/// Handles email/password registration.
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Form(form): axum::Form<RegisterForm>,
) -> Response {
    let metadata = PrincipalMetadata {
        display_name: form.display_name.clone(),
        role: form.role.clone(),
        ..PrincipalMetadata::default()
    };

    let outcome = match state
        .identity
        .sign_up(&form.email, &form.password, &metadata)
        .await
    {
        Ok(outcome) => outcome,
        Err(IdentityError::SignUpRejected { reason }) => {
            tracing::info!(reason, "sign-up rejected");
            return Redirect::to(&format!("{REGISTER_PATH}?error=signup_failed"))
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-up failed");
            return Redirect::to(&format!("{REGISTER_PATH}?error=provider_unavailable"))
                .into_response();
        }
    };

    let Some(tokens) = outcome.tokens else {
        // Provider requires email confirmation before issuing a session.
        return Redirect::to(&format!("{LOGIN_PATH}?message=confirm_email")).into_response();
    };

    establish(&state, jar, &outcome.principal, &tokens, None).await
}

/// Handles email/password login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Form(form): axum::Form<LoginForm>,
) -> Response {
    let session = match state.identity.sign_in(&form.email, &form.password).await {
        Ok(session) => session,
        Err(IdentityError::InvalidCredentials) => {
            return Redirect::to(&format!("{LOGIN_PATH}?error=invalid_credentials"))
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-in failed");
            return Redirect::to(&format!("{LOGIN_PATH}?error=provider_unavailable"))
                .into_response();
        }
    };

    let return_to = safe_return_url(form.return_url.as_deref());
    establish(&state, jar, &session.principal, &session.tokens, return_to).await
}

/// Logs out: best-effort provider revocation, then cookie teardown.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(tokens) = cookies::session_tokens(&jar) {
        if let Err(e) = state.identity.sign_out(&tokens.access_token).await {
            tracing::warn!(error = %e, "provider sign-out failed");
        }
    }

    let jar = cookies::clear_session(jar);
    (jar, Redirect::to("/")).into_response()
}

/// Sets session cookies, runs the profile bootstrap, and redirects.
///
/// The bootstrap target wins over any `return_to`: a user whose profile
/// could not be created lands on setup, with the session cookies kept so
/// setup can retry.
async fn establish(
    state: &AppState,
    jar: CookieJar,
    principal: &Principal,
    tokens: &SessionTokens,
    return_to: Option<String>,
) -> Response {
    let jar = cookies::apply_session(jar, tokens, state.cookie_config.secure);

    let hints = BootstrapHints {
        display_name: principal.display_name_hint(),
        role: Role::from_hint(principal.role_hint()),
    };

    let bootstrapper = Bootstrapper::new(state.store.clone());
    let target = match bootstrapper.ensure(&principal.id, &principal.email, hints).await {
        Ok(outcome) => return_to.unwrap_or_else(|| outcome.role().home_path().to_string()),
        Err(e) => {
            tracing::error!(error = %e, principal = %principal.id, "profile bootstrap failed");
            SETUP_PATH.to_string()
        }
    };

    (jar, Redirect::to(&target)).into_response()
}

/// Accepts only site-relative return targets, dropping anything that
/// could redirect off-site.
fn safe_return_url(raw: Option<&str>) -> Option<String> {
    raw.filter(|p| p.starts_with('/') && !p.starts_with("//"))
        .map(str::to_string)
}
