//! REST API Tests
//!
//! Route round trips through the full router:
//! - List responses carry status, count, pagination and data
//! - CRUD on every resource, with label-specific not-found messages
//! - Nested NGO routes and the cascade on NGO delete
//! - Radius search
//! - Error bodies and status codes

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use rescue_api::http_server::HttpServer;
use rescue_api::store::{Database, Resource};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

fn seeded_db() -> Arc<Database> {
    let db = Database::new();
    db.collection(Resource::Ngos)
        .insert_many(vec![
            json!({
                "_id": "n1",
                "name": "Happy Paws",
                "description": "Dog shelter",
                "address": "Pune",
                "goals": "Adoption",
                "location": {"type": "Point", "coordinates": [73.8567, 18.5204]},
                "createdAt": "2024-01-01T00:00:00.000Z"
            }),
            json!({
                "_id": "n2",
                "name": "Feline Friends",
                "description": "Cat rescue",
                "address": "Delhi",
                "goals": "Rescue",
                "location": {"type": "Point", "coordinates": [77.2090, 28.6139]},
                "createdAt": "2024-02-01T00:00:00.000Z"
            }),
        ])
        .unwrap();
    db.collection(Resource::Animals)
        .insert_many(vec![
            json!({"_id": "a1", "ngo": "n1", "animal_species": "dog", "rescue_priority": "High", "createdAt": "2024-03-01T00:00:00.000Z"}),
            json!({"_id": "a2", "ngo": "n1", "animal_species": "cat", "rescue_priority": "Low", "createdAt": "2024-03-02T00:00:00.000Z"}),
            json!({"_id": "a3", "ngo": "n2", "animal_species": "cat", "rescue_priority": "High", "createdAt": "2024-03-03T00:00:00.000Z"}),
        ])
        .unwrap();
    Arc::new(db)
}

fn app(db: Arc<Database>) -> Router {
    HttpServer::new(db).router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn ids(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["_id"].as_str())
        .collect()
}

// =============================================================================
// Listing Tests
// =============================================================================

#[tokio::test]
async fn test_list_shape() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/api/v1/animals?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["pagination"], json!({"next": {"page": 2, "limit": 2}}));
    assert_eq!(ids(&body), ["a3", "a2"]);
}

#[tokio::test]
async fn test_list_filter_select_sort() {
    let app = app(seeded_db());
    let (status, body) = get(
        &app,
        "/api/v1/animals?animal_species=cat&select=rescue_priority&sort=rescue_priority",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            {"_id": "a3", "rescue_priority": "High"},
            {"_id": "a2", "rescue_priority": "Low"}
        ])
    );
}

#[tokio::test]
async fn test_list_in_operator() {
    let app = app(seeded_db());
    let (_, body) = get(&app, "/api/v1/animals?_id%5Bin%5D=a1&_id%5Bin%5D=a3").await;
    assert_eq!(ids(&body), ["a3", "a1"]);
}

#[tokio::test]
async fn test_list_bad_in_operand() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/api/v1/animals?_id%5Bin%5D=a1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_bad_in_operand_on_empty_collection() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/api/v1/reviews?overall%5Bin%5D=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);

    let (status, _) = get(&app, "/api/v1/ngos/n1/reviews?overall%5Bin%5D=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_mixed_projection() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/api/v1/ngos?select=name,-goals").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_unknown_resource() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/api/v1/bootcamps").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Unknown resource: bootcamps");
}

#[tokio::test]
async fn test_unmatched_route() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

// =============================================================================
// CRUD Tests
// =============================================================================

#[tokio::test]
async fn test_create_get_update_delete() {
    let app = app(Arc::new(Database::new()));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/ngos",
        Some(json!({
            "name": "Second Chance Shelter",
            "description": "Rehabilitation",
            "address": "Mumbai",
            "goals": ["Nurture Animals"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "second-chance-shelter");
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let (status, body) = get(&app, &format!("/api/v1/ngos/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Second Chance Shelter");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/ngos/{}", id),
        Some(json!({"name": "Third Chance"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "third-chance");
    assert_eq!(body["data"]["address"], "Mumbai");

    let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/ngos/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": true, "msg": "Deleted Successfully"}));

    let (status, body) = get(&app, &format!("/api/v1/ngos/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("NGO not found with id of {}", id));
}

#[tokio::test]
async fn test_create_missing_fields() {
    let app = app(Arc::new(Database::new()));
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({"name": "Asha"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please add: email");
}

#[tokio::test]
async fn test_create_duplicate_id() {
    let app = app(Arc::new(Database::new()));
    let user = json!({"_id": "u1", "name": "Asha", "email": "asha@rescue.org"});

    let (status, _) = send(&app, Method::POST, "/api/v1/users", Some(user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/api/v1/users", Some(user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate id: u1");

    let (_, body) = get(&app, "/api/v1/users").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_create_unknown_rescue_priority() {
    let app = app(seeded_db());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/ngos/n1/animals",
        Some(json!({
            "animal_species": "dog",
            "description": "Injured paw",
            "address": "Pune",
            "rescue_priority": "Whatever"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_create_malformed_json() {
    let app = app(Arc::new(Database::new()));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_update_missing_document() {
    let app = app(seeded_db());
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/animals/zzz",
        Some(json!({"rescue_priority": "Low"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Animal not found with id of zzz");
}

// =============================================================================
// Nested Route Tests
// =============================================================================

#[tokio::test]
async fn test_nested_listing_is_scoped() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/api/v1/ngos/n1/animals").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["a2", "a1"]);

    let (status, body) = get(&app, "/api/v1/ngos/n1/animals?rescue_priority=High").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["a1"]);
}

#[tokio::test]
async fn test_nested_listing_missing_parent() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/api/v1/ngos/n9/reviews").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NGO not found with id of n9");
}

#[tokio::test]
async fn test_reviews_update_average_rating() {
    let app = app(seeded_db());

    for overall in [9, 6] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/ngos/n1/reviews",
            Some(json!({"title": "Visit", "text": "Caring staff", "overall": overall})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["ngo"], "n1");
    }

    let (_, body) = get(&app, "/api/v1/ngos/n1").await;
    assert_eq!(body["data"]["averageRating"], 7.5);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/ngos/n1/reviews",
        Some(json!({"title": "Visit", "text": "Too high", "overall": 11})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_moving_review_refreshes_old_ngo() {
    let app = app(seeded_db());
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/ngos/n1/reviews",
        Some(json!({"title": "Visit", "text": "Caring staff", "overall": 8})),
    )
    .await;
    let review = body["data"]["_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/reviews/{}", review),
        Some(json!({"ngo": "n2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, n1) = get(&app, "/api/v1/ngos/n1").await;
    let (_, n2) = get(&app, "/api/v1/ngos/n2").await;
    assert!(n1["data"]["averageRating"].is_null());
    assert_eq!(n2["data"]["averageRating"], 8.0);
}

#[tokio::test]
async fn test_ngo_delete_cascades_to_animals() {
    let db = seeded_db();
    let app = app(db.clone());

    let (status, _) = send(&app, Method::DELETE, "/api/v1/ngos/n1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/api/v1/animals").await;
    assert_eq!(ids(&body), ["a3"]);
    assert_eq!(db.collection(Resource::Animals).len().unwrap(), 1);
}

// =============================================================================
// Radius Tests
// =============================================================================

#[tokio::test]
async fn test_radius_search() {
    let app = app(seeded_db());

    // Pune to Delhi is roughly 1170 km
    let (status, body) = get(&app, "/api/v1/ngos/radius/73.8567/18.5204/100?unit=km").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["n1"]);

    let (_, body) = get(&app, "/api/v1/ngos/radius/73.8567/18.5204/1000").await;
    assert_eq!(ids(&body), ["n2", "n1"]);
}

#[tokio::test]
async fn test_radius_bad_coordinates() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/api/v1/ngos/radius/east/18.5/10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);
}

// =============================================================================
// Health Tests
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = app(seeded_db());
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["collections"], 4);
}
