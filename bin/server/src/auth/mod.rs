//! Authentication wiring for the StudySync server.
//!
//! This module connects the library crates to HTTP:
//! - cookie helpers for the session token pair
//! - the access-router middleware run on every navigable request
//! - route handlers for callback, register, login, and logout
//!
//! All token verification is delegated to the identity provider; the
//! server holds no session state of its own. What a principal may see is
//! decided per request from the path, the resolved session, and the
//! stored profile role.

pub mod cookies;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use studysync_access::ProfileStore;
use studysync_identity::IdentityApi;

use crate::config::CookieConfig;

pub use middleware::{access_router, CurrentUser};

/// Shared application state.
///
/// The provider and the store are held behind their traits so handlers
/// can be exercised against scripted implementations.
pub struct AppState {
    /// Database connection pool.
    pub db_pool: sqlx::PgPool,
    /// Client for the identity provider.
    pub identity: Arc<dyn IdentityApi>,
    /// Profile store.
    pub store: Arc<dyn ProfileStore>,
    /// Cookie configuration.
    pub cookie_config: CookieConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        db_pool: sqlx::PgPool,
        identity: Arc<dyn IdentityApi>,
        store: Arc<dyn ProfileStore>,
        cookie_config: CookieConfig,
    ) -> Self {
        Self {
            db_pool,
            identity,
            store,
            cookie_config,
        }
    }
}
