//! # Query Pipeline Module
//!
//! Shared list-query handling for every resource: filter operator
//! translation, field selection, sorting and offset pagination with
//! next/prev links.

pub mod errors;
pub mod filter;
pub mod page;
pub mod pipeline;
pub mod projection;
pub mod raw;
pub mod sort;

pub use errors::{QueryError, QueryResult};
pub use filter::{Comparison, Condition, FilterExpression, FilterValue, Operator};
pub use page::{PageLink, PageWindow, PagedResult, Pagination, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use pipeline::{build_page, PlannedQuery};
pub use projection::Projection;
pub use raw::{RawQuery, RawValue, RESERVED_KEYS};
pub use sort::{SortDirection, SortKey, SortSpec, DEFAULT_SORT_FIELD};
