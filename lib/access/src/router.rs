//! The per-request access decision.
//!
//! Every navigable request is classified here: public, auth-exchange, or
//! protected, and for protected paths the session and stored role gate the
//! outcome. The decision is a pure function of the request path, the
//! session state, and the (optionally fetched) profile — no state survives
//! between requests, so every request is re-evaluated from scratch.

use crate::role::Role;

/// The code-exchange endpoint. Never gated: it is what establishes the
/// session in the first place.
pub const AUTH_CALLBACK_PATH: &str = "/auth/callback";

/// Login page path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Registration page path.
pub const REGISTER_PATH: &str = "/auth/register";

/// Destination for authenticated principals with no (usable) profile row.
pub const SETUP_PATH: &str = "/auth/setup";

/// Logout endpoint. Stays reachable even without a usable profile: it is
/// the recovery path the setup page points at, and the session cookies
/// would otherwise pin the user to setup until they expire.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Generic dashboard alias resolved to the caller's role home.
pub const DASHBOARD_ALIAS: &str = "/dashboard";

/// Student area prefix.
pub const STUDENT_PREFIX: &str = "/student";

/// Teacher area prefix.
pub const TEACHER_PREFIX: &str = "/teacher";

/// Paths reachable without a session.
const PUBLIC_PATHS: [&str; 3] = ["/", LOGIN_PATH, REGISTER_PATH];

/// What the profile fetch produced, when one was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileGate {
    /// No row: the principal has not been bootstrapped.
    Missing,
    /// A row exists but its role column is not a known role. Kept distinct
    /// from both real roles so a corrupt row never grants the wrong area.
    Corrupt,
    /// A usable profile with this role.
    Found(Role),
}

/// Outcome of the access decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Let the request through to its handler.
    PassThrough,
    /// Redirect to the login page, optionally carrying the originally
    /// requested path as a return target.
    ToLogin { return_to: Option<String> },
    /// Redirect to the profile setup page.
    ToSetup,
    /// Redirect to the given role's dashboard.
    ToHome(Role),
}

/// Returns true for the auth-exchange endpoint.
#[must_use]
pub fn is_auth_exchange(path: &str) -> bool {
    path.starts_with(AUTH_CALLBACK_PATH)
}

/// Returns true for paths in the public set.
#[must_use]
pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Whether deciding this request requires the profile row.
///
/// The middleware uses this to avoid a store round-trip on anonymous or
/// plain public requests.
#[must_use]
pub fn needs_profile(path: &str, authenticated: bool) -> bool {
    if !authenticated || is_auth_exchange(path) || path == LOGOUT_PATH {
        return false;
    }
    if is_public(path) {
        // Only the logged-in-visits-auth-page redirect needs the role.
        return path == LOGIN_PATH || path == REGISTER_PATH;
    }
    true
}

/// Decides the outcome for one request.
///
/// `profile` must be supplied whenever `needs_profile` says so; a `None`
/// in a branch that needs it is treated as a missing row.
#[must_use]
pub fn decide(path: &str, authenticated: bool, profile: Option<ProfileGate>) -> RouteDecision {
    // 1. The auth exchange is never gated.
    if is_auth_exchange(path) {
        return RouteDecision::PassThrough;
    }

    // 2. Public paths pass, except a signed-in visit to login/register,
    //    which lands on the caller's own dashboard.
    if is_public(path) {
        if authenticated && (path == LOGIN_PATH || path == REGISTER_PATH) {
            return match profile {
                Some(ProfileGate::Found(role)) => RouteDecision::ToHome(role),
                Some(ProfileGate::Missing) | Some(ProfileGate::Corrupt) | None => {
                    RouteDecision::ToSetup
                }
            };
        }
        return RouteDecision::PassThrough;
    }

    // 3. Everything else requires a session.
    if !authenticated {
        return RouteDecision::ToLogin {
            return_to: Some(path.to_string()),
        };
    }

    let gate = profile.unwrap_or(ProfileGate::Missing);
    let role = match gate {
        ProfileGate::Found(role) => role,
        // 4. Bootstrapped-but-missing and corrupt rows both land on setup;
        //    setup itself and logout must stay reachable or the user is
        //    stuck there for the lifetime of the cookies.
        ProfileGate::Missing | ProfileGate::Corrupt => {
            if path == SETUP_PATH || path == LOGOUT_PATH {
                return RouteDecision::PassThrough;
            }
            return RouteDecision::ToSetup;
        }
    };

    // 5. Role-prefixed areas.
    if path.starts_with(STUDENT_PREFIX) {
        if role != Role::Student {
            return RouteDecision::ToHome(Role::Teacher);
        }
        return RouteDecision::PassThrough;
    }
    if path.starts_with(TEACHER_PREFIX) {
        if role != Role::Teacher {
            return RouteDecision::ToHome(Role::Student);
        }
        return RouteDecision::PassThrough;
    }

    // 6. Generic dashboard alias.
    if path == DASHBOARD_ALIAS {
        return RouteDecision::ToHome(role);
    }

    // 7. Anything else is an ordinary protected page.
    RouteDecision::PassThrough
}
