//! # REST API Module
//!
//! CRUD endpoints for NGOs, animals, reviews and users. Every listing goes
//! through the shared query pipeline.

pub mod errors;
pub mod handler;
pub mod response;
pub mod server;

pub use errors::{ErrorResponse, RestError, RestResult};
pub use handler::{DatabaseRestHandler, RadiusQuery, RestHandler, LOCATION_FIELD};
pub use response::{DeleteResponse, ListResponse, SingleResponse};
pub use server::RestServer;
