//! # REST API HTTP Server
//!
//! Axum routes for the resource endpoints. Mounted under `/api/v1` by the
//! HTTP server.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::query::RawQuery;

use super::errors::{RestError, RestResult};
use super::handler::{RadiusQuery, RestHandler};
use super::response::{DeleteResponse, ListResponse, SingleResponse};

/// Query parameter selecting the radius unit; never a filter field
const UNIT_PARAM: &str = "unit";

/// REST API server state
pub struct RestServer<H: RestHandler> {
    handler: Arc<H>,
}

impl<H: RestHandler + 'static> RestServer<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        let state = Arc::new(self);

        Router::new()
            .route(
                "/:resource",
                get(list_handler::<H>).post(create_handler::<H>),
            )
            .route(
                "/:resource/:id",
                get(get_handler::<H>)
                    .put(update_handler::<H>)
                    .delete(delete_handler::<H>),
            )
            .route(
                "/:resource/:id/:child",
                get(list_nested_handler::<H>).post(create_nested_handler::<H>),
            )
            .route(
                "/:resource/radius/:lng/:lat/:distance",
                get(radius_handler::<H>),
            )
            .with_state(state)
    }
}

/// Shared state type
type ServerState<H> = Arc<RestServer<H>>;

fn raw_query(pairs: Vec<(String, String)>) -> RestResult<RawQuery> {
    Ok(RawQuery::from_pairs(pairs)?)
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> RestResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| RestError::InvalidBody(rejection.body_text()))
}

/// List records handler
async fn list_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Path(resource): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListResponse<Value>>, RestError> {
    let query = raw_query(pairs)?;
    let result = server.handler.list(&resource, &query)?;
    Ok(Json(result))
}

/// Get single record handler
async fn get_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<SingleResponse<Value>>, RestError> {
    let result = server.handler.get(&resource, &id)?;
    Ok(Json(result))
}

/// Create record handler
async fn create_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Path(resource): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SingleResponse<Value>>), RestError> {
    let result = server.handler.create(&resource, json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Update record handler
async fn update_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Path((resource, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SingleResponse<Value>>, RestError> {
    let result = server.handler.update(&resource, &id, json_body(body)?)?;
    Ok(Json(result))
}

/// Delete record handler
async fn delete_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, RestError> {
    let result = server.handler.delete(&resource, &id)?;
    Ok(Json(result))
}

/// Nested listing, e.g. `/ngos/:id/animals`
async fn list_nested_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Path((resource, id, child)): Path<(String, String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListResponse<Value>>, RestError> {
    let query = raw_query(pairs)?;
    let result = server.handler.list_nested(&resource, &id, &child, &query)?;
    Ok(Json(result))
}

/// Nested creation, e.g. `POST /ngos/:id/reviews`
async fn create_nested_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Path((resource, id, child)): Path<(String, String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SingleResponse<Value>>), RestError> {
    let result = server
        .handler
        .create_nested(&resource, &id, &child, json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Radius search handler
async fn radius_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Path((resource, lng, lat, distance)): Path<(String, String, String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListResponse<Value>>, RestError> {
    let (units, pairs): (Vec<_>, Vec<_>) = pairs.into_iter().partition(|(k, _)| k == UNIT_PARAM);
    let unit = units.first().map(|(_, v)| v.as_str());

    let area = RadiusQuery::parse(&lng, &lat, &distance, unit)?;
    let query = raw_query(pairs)?;
    let result = server.handler.radius(&resource, area, &query)?;
    Ok(Json(result))
}
