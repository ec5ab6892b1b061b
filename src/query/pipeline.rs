//! # Query Pipeline
//!
//! Turns raw request parameters into a filtered, projected, sorted page of
//! documents from any [`Collection`].

use tracing::debug;

use crate::store::{Collection, FindQuery};

use super::errors::QueryResult;
use super::filter::FilterExpression;
use super::page::{PageWindow, PagedResult};
use super::projection::Projection;
use super::raw::RawQuery;
use super::sort::SortSpec;

/// A request translated into collection terms
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    pub filter: FilterExpression,
    pub projection: Projection,
    pub sort: SortSpec,
    pub window: PageWindow,
}

impl PlannedQuery {
    /// Interpret request parameters. The input is never modified.
    pub fn plan(raw: &RawQuery) -> QueryResult<Self> {
        let filter = FilterExpression::from_raw(&raw.without_reserved())?;
        let projection = Projection::from_select(raw.joined("select").as_deref())?;
        let sort = SortSpec::from_param(raw.joined("sort").as_deref());
        let window = PageWindow::from_params(raw.first("page"), raw.first("limit"));

        Ok(Self {
            filter,
            projection,
            sort,
            window,
        })
    }

    /// Restrict results to documents whose `field` equals `value`
    pub fn scoped(mut self, field: &str, value: &str) -> Self {
        self.filter = self.filter.with_equals(field, value);
        self
    }

    /// Count matches, fetch the requested page and derive its links
    pub fn execute<C>(&self, collection: &C) -> QueryResult<PagedResult<C::Item>>
    where
        C: Collection + ?Sized,
    {
        let total_count = collection.count(&self.filter)?;

        let items = collection.find(&FindQuery {
            filter: &self.filter,
            projection: &self.projection,
            sort: &self.sort,
            skip: self.window.start_index(),
            limit: self.window.limit,
        })?;

        let pagination = self.window.pagination(total_count);

        debug!(
            filter = %self.filter.to_document(),
            page = self.window.page,
            limit = self.window.limit,
            total = total_count,
            returned = items.len(),
            "query page built"
        );

        Ok(PagedResult {
            items,
            total_count,
            pagination,
        })
    }
}

/// Build one page of results for `raw` from `collection`
pub fn build_page<C>(raw: &RawQuery, collection: &C) -> QueryResult<PagedResult<C::Item>>
where
    C: Collection + ?Sized,
{
    PlannedQuery::plan(raw)?.execute(collection)
}
