//! # Document Store
//!
//! In-memory document collections and the engine-side evaluation of
//! filters, projections and sort orders produced by the query pipeline.
//!
//! The [`Collection`] trait is the seam between the two: the pipeline
//! only needs `count` and `find`.

pub mod database;
pub mod errors;
pub mod geo;
pub mod matcher;
pub mod memory;
pub mod projector;
pub mod resource;
pub mod snapshot;
pub mod sorter;

pub use database::{slugify, Database};
pub use errors::{EngineError, EngineResult};
pub use geo::{DistanceUnit, GeoSphere, EARTH_RADIUS_KM, EARTH_RADIUS_MILES};
pub use memory::{MemoryCollection, CREATED_AT_FIELD};
pub use projector::ID_FIELD;
pub use resource::{Resource, UnknownResource};
pub use snapshot::{export_snapshot, load_snapshot};

use crate::query::{FilterExpression, Projection, SortSpec};

/// One `find` request: filter, then sort, skip, limit and project
#[derive(Debug, Clone, Copy)]
pub struct FindQuery<'a> {
    pub filter: &'a FilterExpression,
    pub projection: &'a Projection,
    pub sort: &'a SortSpec,
    /// Documents to skip. Negative values are rejected by the collection.
    pub skip: i64,
    /// Maximum documents to return
    pub limit: i64,
}

/// A queryable document collection
pub trait Collection: Send + Sync {
    type Item;

    /// Number of documents matching `filter`
    fn count(&self, filter: &FilterExpression) -> EngineResult<u64>;

    /// Matching documents after sort, skip, limit and projection
    fn find(&self, query: &FindQuery<'_>) -> EngineResult<Vec<Self::Item>>;
}
