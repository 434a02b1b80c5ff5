//! panda-server - Patient Appointment Network Data Application
//!
//! HTTP surface over the record service: patients, addresses and
//! appointments with the NHS-number and appointment-lifecycle rules
//! enforced in panda-core.

pub mod config;
pub mod handlers;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use panda_core::{RecordService, SystemClock};
use panda_store::SqliteStore;
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Application state
pub struct AppState {
    pub service: RecordService<SqliteStore, SystemClock>,
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok", "service": "panda" }))
}

/// Build the application router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Patients
        .route(
            "/patients",
            get(handlers::patients::list).post(handlers::patients::create),
        )
        // Must come before /patients/{id} so it is not matched as an id
        .route(
            "/patients/getbynhsnumber",
            get(handlers::patients::get_by_nhs_number),
        )
        .route(
            "/patients/{id}",
            get(handlers::patients::get)
                .put(handlers::patients::update)
                .delete(handlers::patients::delete),
        )
        .route(
            "/patients/{id}/address",
            get(handlers::patients::list_addresses).post(handlers::patients::create_address),
        )
        // Appointments
        .route(
            "/appointments",
            get(handlers::appointments::list).post(handlers::appointments::create),
        )
        .route(
            "/appointments/{id}",
            get(handlers::appointments::get).put(handlers::appointments::update),
        )
        .route(
            "/appointments/{id}/cancel",
            post(handlers::appointments::cancel),
        )
        .route(
            "/appointments/{id}/attended",
            post(handlers::appointments::mark_attended),
        )
        // Addresses
        .route("/addresses", get(handlers::addresses::list))
        .route("/addresses/{id}", get(handlers::addresses::get))
        // Middleware
        .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1MB
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
