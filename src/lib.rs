//! # Glowtrust - Trust-Aware Recommendation & Escrow Settlement Engine
//!
//! Scores beauty and wellness services against a mutable merchant trust signal
//! and drives the booking → escrow → completion → review lifecycle that feeds
//! that signal back.
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for the public API
//! - [`middleware`] - Bearer token authentication and the role check
//! - [`models`] - Domain records and the shared application state
//! - [`services`] - Scoring, escrow, trust and points rules
//! - [`store`] - Persistence trait with Postgres and in-memory backends
//! - [`utils`] - Configuration, telemetry, validators and constants

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::StartupError;
use crate::handlers::{
    cancel_booking, confirm_booking, confirm_completion, create_booking, create_payment,
    get_booking, get_payment, get_points, get_preference, get_recommendations, get_trust_score,
    health_check, submit_quiz, submit_review,
};
use crate::middleware::auth_middleware;
use crate::models::{AppState, Taxonomy};
use crate::services::jwt::JwtService;
use crate::store::{MemoryStore, PgStore, Store};
use crate::utils::config::{AppConfig, StoreBackend};

const DB_MAX_CONNECTIONS: u32 = 10;

/// Creates an Axum router with application routes over the given state.
pub fn app(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/api/preferences", post(submit_quiz).get(get_preference))
        .route("/api/recommendations", get(get_recommendations))
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/confirm", post(confirm_booking))
        .route("/api/bookings/{id}/cancel", post(cancel_booking))
        .route(
            "/api/bookings/{id}/payment",
            post(create_payment).get(get_payment),
        )
        .route("/api/bookings/{id}/complete", post(confirm_completion))
        .route("/api/bookings/{id}/review", post(submit_review))
        .route("/api/merchants/{id}/trust-score", get(get_trust_score))
        .route("/api/points", get(get_points))
        .route_layer(from_fn_with_state(Arc::clone(&state), auth_middleware));

    let public_routes = Router::new().route("/health-check", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Builds the shared state from configuration: connects the chosen store
/// (running migrations for Postgres), loads the taxonomy and the JWT keys.
///
/// # Errors
///
/// Returns [`StartupError`] if the database is unreachable, migrations fail,
/// or the taxonomy override cannot be read.
pub async fn build_state(config: &AppConfig) -> Result<Arc<AppState>, StartupError> {
    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(crate::utils::config::ConfigError::Missing("DATABASE_URL"))?;
            let db_pool = PgPoolOptions::new()
                .max_connections(DB_MAX_CONNECTIONS)
                .connect(database_url)
                .await?;
            let store = PgStore::new(db_pool);
            store.migrate().await?;
            info!("Using [PgStore] with migrations applied");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            info!("Using [MemoryStore], data is not persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let taxonomy = match &config.taxonomy_path {
        Some(path) => {
            let content = tokio::fs::read_to_string(path).await?;
            Taxonomy::from_json(&content)?
        }
        None => Taxonomy::builtin(),
    };

    Ok(Arc::new(AppState::new(
        store,
        JwtService::from_secret(&config.jwt_secret),
        taxonomy,
        config.default_preferred_budget,
    )))
}
