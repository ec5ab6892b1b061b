//! rescue-api - REST API for animal rescue NGOs
//!
//! Resources (NGOs, animals, reviews, users) live in document collections.
//! Every listing runs through one query pipeline that turns URL parameters
//! into a filter, projection, sort order and page window.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod rest_api;
pub mod store;
