//! StudySync HTTP server.

mod auth;
mod config;
mod db;
mod pages;

use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use studysync_identity::IdentityClient;
use tower_http::services::ServeDir;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::auth::AppState;
use crate::config::ServerConfig;
use crate::db::PgProfileStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        for cause in e.causes() {
            tracing::error!("configuration: {cause}");
        }
        std::process::exit(1);
    }
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Preflight the schema; the server still starts so /healthz can report
    let status = db::status::check(&db_pool).await;
    if !status.ready {
        tracing::warn!(
            missing = ?status.missing_relations,
            connected = status.connected,
            "database is not initialized; run the provisioning SQL"
        );
    }

    let identity =
        IdentityClient::new(config.identity.clone()).expect("failed to create identity client");
    let store = PgProfileStore::new(db_pool.clone());
    let app_state = Arc::new(AppState::new(
        db_pool,
        Arc::new(identity),
        Arc::new(store),
        config.cookies.clone(),
    ));

    let gated = Router::new()
        .route("/", get(pages::home))
        .route("/auth/login", get(pages::login_page).post(auth::routes::login))
        .route(
            "/auth/register",
            get(pages::register_page).post(auth::routes::register),
        )
        .route("/auth/setup", get(pages::setup_page))
        .route("/auth/callback", get(auth::routes::callback))
        .route("/auth/logout", get(auth::routes::logout))
        .route("/student", get(pages::student_dashboard))
        .route("/teacher", get(pages::teacher_dashboard))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            auth::access_router,
        ));

    // Health and static assets bypass the access router
    let app = gated
        .route("/healthz", get(db::status::healthz))
        .nest_service("/assets", ServeDir::new("assets"))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl-C handler");
}
