//! # HTTP Server Module
//!
//! Axum server hosting the REST API.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/*` - NGO, animal, review and user resources

pub mod config;
pub mod health;
pub mod server;

pub use config::HttpServerConfig;
pub use server::{HttpServer, API_PREFIX};
