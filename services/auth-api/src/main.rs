//! Gatehouse Auth API
//!
//! Authentication microservice: registration, email verification,
//! login, password reset, and admin user management over REST.

mod config;
mod error;
mod extractors;
mod handlers;
mod state;

use axum::routing::{get, post, put};
use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Gatehouse Auth API");

    let config = Config::from_env()?;

    // Connect to the database; the pool is created once and shared
    let pool = gatehouse_db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    let state = AppState::new(&config, pool);

    // Build router
    let auth_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/profile", get(handlers::profile))
        .route("/verify-email", get(handlers::verify_email))
        .route("/forgot-password", post(handlers::forgot_password))
        .route("/reset-password", post(handlers::reset_password))
        .route("/users", get(handlers::list_users))
        .route(
            "/users/{id}",
            put(handlers::edit_user).delete(handlers::delete_user),
        );

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .nest("/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
