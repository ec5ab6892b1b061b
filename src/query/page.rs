//! # Page Window
//!
//! Offset/limit window for a request and the next/prev links derived from it.

use serde::{Deserialize, Serialize};

/// Page used when the request names none
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the request names none
pub const DEFAULT_LIMIT: i64 = 25;

/// Requested page and page size
///
/// Values are not validated: a negative page or limit is handed to the
/// collection as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageWindow {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Parse `page` and `limit` parameters.
    ///
    /// Only the leading integer of each value is read (`"2abc"` is 2).
    /// Missing and non-numeric values fall back to the defaults; zero and
    /// negative values are kept.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_or(page, DEFAULT_PAGE),
            limit: parse_or(limit, DEFAULT_LIMIT),
        }
    }

    /// Number of documents skipped before this page
    pub fn start_index(&self) -> i64 {
        (self.page.saturating_sub(1)).saturating_mul(self.limit)
    }

    /// Index one past the last document of this page
    pub fn end_index(&self) -> i64 {
        self.page.saturating_mul(self.limit)
    }

    /// Navigation links for a result set of `total` documents
    pub fn pagination(&self, total: u64) -> Pagination {
        let total = i64::try_from(total).unwrap_or(i64::MAX);

        let next = (self.end_index() < total).then(|| PageLink {
            page: self.page.saturating_add(1),
            limit: self.limit,
        });
        let prev = (self.start_index() > 0).then(|| PageLink {
            page: self.page.saturating_sub(1),
            limit: self.limit,
        });

        Pagination { next, prev }
    }
}

fn parse_or(value: Option<&str>, default: i64) -> i64 {
    value.and_then(parse_leading_int).unwrap_or(default)
}

/// Read an optional sign and the digits that follow, ignoring the rest
fn parse_leading_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let n: i64 = digits[..end].parse().ok()?;
    Some(if negative { -n } else { n })
}

/// Link to a neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: i64,
    pub limit: i64,
}

/// Neighbouring pages, present only when they hold documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

/// One page of query results
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// Documents matching the filter across all pages
    pub total_count: u64,
    pub pagination: Pagination,
}
