//! # Health Routes

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::store::{Database, Resource};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Collections whose lock can still be taken
    pub collections: usize,
}

/// Health check route
pub fn health_routes(db: Arc<Database>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(db)
}

async fn health_handler(State(db): State<Arc<Database>>) -> impl IntoResponse {
    let readable = Resource::ALL
        .into_iter()
        .filter(|r| db.collection(*r).len().is_ok())
        .count();

    let (status, label) = if readable == Resource::ALL.len() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status: label.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        collections: readable,
    };

    (status, Json(response))
}
