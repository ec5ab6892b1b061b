//! # REST API Handler
//!
//! Handles REST requests and translates them to collection operations.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::query::{Condition, FilterExpression, PlannedQuery, RawQuery};
use crate::store::{Database, DistanceUnit, GeoSphere, Resource};

use super::errors::{RestError, RestResult};
use super::response::{DeleteResponse, ListResponse, SingleResponse};

/// Field holding a document's GeoJSON point
pub const LOCATION_FIELD: &str = "location";

/// Lowest and highest accepted review score
const RATING_RANGE: std::ops::RangeInclusive<f64> = 1.0..=10.0;

const RESCUE_PRIORITIES: [&str; 3] = ["High", "Low", "Medium"];
const NGO_GOALS: [&str; 2] = ["Nurture Animals", "Treating Diseased Animals"];

const NGO_NAME_MAX: usize = 50;
const NGO_DESCRIPTION_MAX: usize = 500;
const REVIEW_TITLE_MAX: usize = 100;

/// Centre and distance of a radius search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    pub lng: f64,
    pub lat: f64,
    pub distance: f64,
    pub unit: DistanceUnit,
}

impl RadiusQuery {
    /// Parse the path segments of a radius route
    pub fn parse(lng: &str, lat: &str, distance: &str, unit: Option<&str>) -> RestResult<Self> {
        let unit = match unit {
            Some(u) => u.parse::<DistanceUnit>().map_err(RestError::InvalidPathParam)?,
            None => DistanceUnit::default(),
        };

        Ok(Self {
            lng: parse_coordinate("lng", lng, 180.0)?,
            lat: parse_coordinate("lat", lat, 90.0)?,
            distance: parse_distance(distance)?,
            unit,
        })
    }

    pub fn sphere(&self) -> GeoSphere {
        GeoSphere::from_distance(self.lng, self.lat, self.distance, self.unit)
    }
}

fn parse_coordinate(name: &str, value: &str, bound: f64) -> RestResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.abs() <= bound)
        .ok_or_else(|| RestError::InvalidPathParam(format!("{} = {}", name, value)))
}

fn parse_distance(value: &str) -> RestResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| RestError::InvalidPathParam(format!("distance = {}", value)))
}

/// REST handler trait for resource operations
pub trait RestHandler: Send + Sync {
    /// List one page of a resource
    fn list(&self, resource: &str, query: &RawQuery) -> RestResult<ListResponse<Value>>;

    /// Get a single document by id
    fn get(&self, resource: &str, id: &str) -> RestResult<SingleResponse<Value>>;

    /// Create a document
    fn create(&self, resource: &str, data: Value) -> RestResult<SingleResponse<Value>>;

    /// Merge fields into a document
    fn update(&self, resource: &str, id: &str, data: Value) -> RestResult<SingleResponse<Value>>;

    /// Delete a document
    fn delete(&self, resource: &str, id: &str) -> RestResult<DeleteResponse>;

    /// List `child` documents belonging to one parent
    fn list_nested(
        &self,
        parent: &str,
        parent_id: &str,
        child: &str,
        query: &RawQuery,
    ) -> RestResult<ListResponse<Value>>;

    /// Create a `child` document under a parent
    fn create_nested(
        &self,
        parent: &str,
        parent_id: &str,
        child: &str,
        data: Value,
    ) -> RestResult<SingleResponse<Value>>;

    /// List documents whose location lies within a distance of a point
    fn radius(
        &self,
        resource: &str,
        area: RadiusQuery,
        query: &RawQuery,
    ) -> RestResult<ListResponse<Value>>;
}

/// Handler backed by the in-memory [`Database`]
pub struct DatabaseRestHandler {
    db: Arc<Database>,
}

impl DatabaseRestHandler {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Resolve a nested route to the child resource, checking the parent exists
    fn nested(
        &self,
        parent: &str,
        parent_id: &str,
        child: &str,
    ) -> RestResult<(Resource, &'static str)> {
        let parent: Resource = parent.parse()?;
        let child: Resource = child.parse()?;

        let field = match (parent, child.parent_field()) {
            (Resource::Ngos, Some(field)) => field,
            _ => return Err(RestError::RouteNotFound(format!("{}/:id/{}", parent, child))),
        };

        if self.db.collection(parent).get(parent_id)?.is_none() {
            return Err(RestError::NotFound {
                label: parent.label(),
                id: parent_id.to_string(),
            });
        }
        Ok((child, field))
    }

    /// Reject a document whose unique fields collide with another one.
    ///
    /// NGO names are unique, and a user reviews each NGO at most once.
    fn check_unique(
        &self,
        resource: Resource,
        doc: &Value,
        own_id: Option<&str>,
    ) -> RestResult<()> {
        let (filter, what) = match resource {
            Resource::Ngos => match text_field(doc, "name") {
                Some(name) => (
                    FilterExpression::new().with_equals("name", name),
                    format!("name = {}", name),
                ),
                None => return Ok(()),
            },
            Resource::Reviews => match (text_field(doc, "ngo"), text_field(doc, "user")) {
                (Some(ngo), Some(user)) => (
                    FilterExpression::new()
                        .with_equals("ngo", ngo)
                        .with_equals("user", user),
                    format!("user {} already reviewed NGO {}", user, ngo),
                ),
                _ => return Ok(()),
            },
            Resource::Animals | Resource::Users => return Ok(()),
        };

        let taken = self
            .db
            .collection(resource)
            .find_all(&filter)?
            .iter()
            .any(|other| other.get("_id").and_then(Value::as_str) != own_id);
        if taken {
            return Err(RestError::Duplicate(what));
        }
        Ok(())
    }
}

impl RestHandler for DatabaseRestHandler {
    fn list(&self, resource: &str, query: &RawQuery) -> RestResult<ListResponse<Value>> {
        let resource: Resource = resource.parse()?;
        let page = PlannedQuery::plan(query)?.execute(self.db.collection(resource))?;
        Ok(page.into())
    }

    fn get(&self, resource: &str, id: &str) -> RestResult<SingleResponse<Value>> {
        let resource: Resource = resource.parse()?;
        self.db
            .collection(resource)
            .get(id)?
            .map(SingleResponse::new)
            .ok_or_else(|| not_found(resource, id))
    }

    fn create(&self, resource: &str, data: Value) -> RestResult<SingleResponse<Value>> {
        let resource: Resource = resource.parse()?;
        validate_new(resource, &data)?;
        self.check_unique(resource, &data, None)?;

        let doc = self.db.insert(resource, data)?;
        info!(collection = %resource, id = ?doc.get("_id"), "document created");
        Ok(SingleResponse::new(doc))
    }

    fn update(&self, resource: &str, id: &str, data: Value) -> RestResult<SingleResponse<Value>> {
        let resource: Resource = resource.parse()?;
        validate_patch(resource, &data)?;
        if let Some(existing) = self.db.collection(resource).get(id)? {
            self.check_unique(resource, &merged(existing, &data), Some(id))?;
        }

        self.db
            .update(resource, id, data)?
            .map(SingleResponse::new)
            .ok_or_else(|| not_found(resource, id))
    }

    fn delete(&self, resource: &str, id: &str) -> RestResult<DeleteResponse> {
        let resource: Resource = resource.parse()?;
        match self.db.delete(resource, id)? {
            Some(_) => {
                info!(collection = %resource, id, "document deleted");
                Ok(DeleteResponse::success())
            }
            None => Err(not_found(resource, id)),
        }
    }

    fn list_nested(
        &self,
        parent: &str,
        parent_id: &str,
        child: &str,
        query: &RawQuery,
    ) -> RestResult<ListResponse<Value>> {
        let (child, field) = self.nested(parent, parent_id, child)?;
        let page = PlannedQuery::plan(query)?
            .scoped(field, parent_id)
            .execute(self.db.collection(child))?;
        Ok(page.into())
    }

    fn create_nested(
        &self,
        parent: &str,
        parent_id: &str,
        child: &str,
        mut data: Value,
    ) -> RestResult<SingleResponse<Value>> {
        let (child, field) = self.nested(parent, parent_id, child)?;
        match data.as_object_mut() {
            Some(obj) => {
                obj.insert(field.to_string(), Value::String(parent_id.to_string()));
            }
            None => return Err(RestError::InvalidBody("expected a JSON object".to_string())),
        }
        self.create(child.collection_name(), data)
    }

    fn radius(
        &self,
        resource: &str,
        area: RadiusQuery,
        query: &RawQuery,
    ) -> RestResult<ListResponse<Value>> {
        let resource: Resource = resource.parse()?;
        let sphere = area.sphere();
        debug!(collection = %resource, ?area, radians = sphere.radius, "radius search");

        let mut plan = PlannedQuery::plan(query)?;
        plan.filter = plan
            .filter
            .with_condition(LOCATION_FIELD, Condition::WithinSphere(sphere));

        let page = plan.execute(self.db.collection(resource))?;
        Ok(page.into())
    }
}

fn not_found(resource: Resource, id: &str) -> RestError {
    RestError::NotFound {
        label: resource.label(),
        id: id.to_string(),
    }
}

/// Check a document about to be created
fn validate_new(resource: Resource, data: &Value) -> RestResult<()> {
    let obj = data
        .as_object()
        .ok_or_else(|| RestError::InvalidBody("expected a JSON object".to_string()))?;

    let missing: Vec<String> = resource
        .required_fields()
        .iter()
        .filter(|field| match obj.get(**field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(RestError::MissingFields(missing));
    }

    validate_fields(resource, data)
}

/// Check the fields a patch sets
fn validate_patch(resource: Resource, data: &Value) -> RestResult<()> {
    if !data.is_object() {
        return Err(RestError::InvalidBody("expected a JSON object".to_string()));
    }
    validate_fields(resource, data)
}

fn validate_fields(resource: Resource, data: &Value) -> RestResult<()> {
    match resource {
        Resource::Ngos => {
            check_length(data, "name", NGO_NAME_MAX)?;
            check_length(data, "description", NGO_DESCRIPTION_MAX)?;
            check_goals(data)
        }
        Resource::Animals => check_one_of(data, "rescue_priority", &RESCUE_PRIORITIES),
        Resource::Reviews => {
            check_length(data, "title", REVIEW_TITLE_MAX)?;
            match data.get("overall") {
                None => Ok(()),
                Some(v) if v.as_f64().is_some_and(|n| RATING_RANGE.contains(&n)) => Ok(()),
                Some(v) => Err(RestError::InvalidBody(format!(
                    "overall must be a number between 1 and 10, got {}",
                    v
                ))),
            }
        }
        Resource::Users => match data.get("email") {
            None => Ok(()),
            Some(Value::String(email)) if is_email(email) => Ok(()),
            Some(v) => Err(RestError::InvalidBody(format!(
                "email is not a valid address: {}",
                v
            ))),
        },
    }
}

/// Text field no longer than `max` characters once trimmed
fn check_length(data: &Value, field: &str, max: usize) -> RestResult<()> {
    match data.get(field) {
        None => Ok(()),
        Some(Value::String(s)) if s.trim().chars().count() <= max => Ok(()),
        Some(Value::String(_)) => Err(RestError::InvalidBody(format!(
            "{} cannot exceed {} characters",
            field, max
        ))),
        Some(v) => Err(RestError::InvalidBody(format!(
            "{} must be a string, got {}",
            field, v
        ))),
    }
}

fn check_one_of(data: &Value, field: &str, allowed: &[&str]) -> RestResult<()> {
    match data.get(field) {
        None => Ok(()),
        Some(Value::String(s)) if allowed.contains(&s.as_str()) => Ok(()),
        Some(v) => Err(RestError::InvalidBody(format!(
            "{} must be one of {}, got {}",
            field,
            allowed.join(", "),
            v
        ))),
    }
}

/// `goals` holds one goal or a list of them
fn check_goals(data: &Value) -> RestResult<()> {
    let goals = match data.get("goals") {
        None => return Ok(()),
        Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
        Some(single) => vec![single],
    };

    match goals
        .into_iter()
        .find(|goal| !goal.as_str().is_some_and(|g| NGO_GOALS.contains(&g)))
    {
        None => Ok(()),
        Some(bad) => Err(RestError::InvalidBody(format!(
            "goals must be among {}, got {}",
            NGO_GOALS.join(", "),
            bad
        ))),
    }
}

fn text_field<'a>(doc: &'a Value, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

/// `doc` with the fields of `patch` written over it
fn merged(mut doc: Value, patch: &Value) -> Value {
    if let (Some(obj), Some(changes)) = (doc.as_object_mut(), patch.as_object()) {
        for (key, value) in changes {
            obj.insert(key.clone(), value.clone());
        }
    }
    doc
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
