//! Lending Tracker Server
//!
//! A Rust REST API server that catalogs board games and books and records
//! loan/return transactions against them, gated by role-based authentication.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Embedded database migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Board games
        .route("/boardgames", get(api::catalog::list_boardgames))
        .route("/boardgames", post(api::catalog::create_boardgame))
        .route("/boardgames/:id", get(api::catalog::get_boardgame))
        .route("/boardgames/:id", put(api::catalog::update_boardgame))
        .route("/boardgames/:id", delete(api::catalog::delete_boardgame))
        // Books
        .route("/books", get(api::catalog::list_books))
        .route("/books", post(api::catalog::create_book))
        .route("/books/:id", get(api::catalog::get_book))
        .route("/books/:id", put(api::catalog::update_book))
        .route("/books/:id", delete(api::catalog::delete_book))
        // Loans
        .route("/loans/borrow", post(api::loans::borrow))
        .route("/loans/return", post(api::loans::return_loan))
        .route("/loans", get(api::loans::list_loans))
        .route("/loans/active", get(api::loans::active_loans))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
