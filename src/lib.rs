pub mod auth;
pub mod config;
pub mod controllers;
pub mod database;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod models;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Shared state for the whole application.
pub struct AppState {
    pub engine: engine::ReservationEngine,
    pub users: Arc<dyn store::UserStore>,
    pub config: config::Config,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Seat Reservation API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
