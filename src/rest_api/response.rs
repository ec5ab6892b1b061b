//! # Response Formatting
//!
//! Standard response types for REST API.

use serde::Serialize;

use crate::query::{PagedResult, Pagination};

/// List response with pagination
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub status: bool,
    /// Documents on this page, not the total match count
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        let count = data.len();
        Self {
            status: true,
            count,
            pagination,
            data,
        }
    }
}

impl<T: Serialize> From<PagedResult<T>> for ListResponse<T> {
    fn from(page: PagedResult<T>) -> Self {
        Self::new(page.items, page.pagination)
    }
}

/// Single record response
#[derive(Debug, Clone, Serialize)]
pub struct SingleResponse<T: Serialize> {
    pub status: bool,
    pub data: T,
}

impl<T: Serialize> SingleResponse<T> {
    pub fn new(data: T) -> Self {
        Self { status: true, data }
    }
}

/// Delete response
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub status: bool,
    pub msg: &'static str,
}

impl DeleteResponse {
    pub fn success() -> Self {
        Self {
            status: true,
            msg: "Deleted Successfully",
        }
    }
}
