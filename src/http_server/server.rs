//! # HTTP Server
//!
//! Main HTTP server combining the health route and the REST API.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Uri;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::rest_api::{DatabaseRestHandler, RestError, RestServer};
use crate::store::Database;

use super::config::HttpServerConfig;
use super::health::health_routes;

/// Prefix for every resource route
pub const API_PREFIX: &str = "/api/v1";

/// HTTP Server for the rescue API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_config(HttpServerConfig::default(), db)
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig, db: Arc<Database>) -> Self {
        let router = Self::build_router(&config, db);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, db: Arc<Database>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| match s.parse() {
                    Ok(origin) => Some(origin),
                    Err(_) => {
                        warn!(origin = %s, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let rest = RestServer::new(DatabaseRestHandler::new(db.clone())).router();

        Router::new()
            .merge(health_routes(db))
            .nest(API_PREFIX, rest)
            .fallback(fallback_handler)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, api = API_PREFIX, "HTTP server listening");

        axum::serve(listener, self.router).await
    }
}

async fn fallback_handler(uri: Uri) -> RestError {
    RestError::RouteNotFound(uri.path().to_string())
}
