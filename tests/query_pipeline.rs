//! Query Pipeline Tests
//!
//! End-to-end behaviour of `build_page` against a collection that records
//! what it was asked for:
//! - Default page window
//! - next/prev links present exactly when neighbouring pages hold documents
//! - Operator rewrite reaches the collection, plain filters pass unchanged
//! - Projection and sort parsing
//! - Collection errors propagate

use std::sync::Mutex;

use rescue_api::query::{
    build_page, FilterExpression, PageLink, Pagination, Projection, QueryError, RawQuery,
    SortKey,
};
use rescue_api::store::{Collection, EngineError, EngineResult, FindQuery, MemoryCollection};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

/// Arguments of one `find` call
#[derive(Debug, Clone)]
struct FindCall {
    filter: Value,
    projection: Projection,
    sort: Vec<SortKey>,
    skip: i64,
    limit: i64,
}

/// Collection reporting a fixed total and recording every call
struct RecordingCollection {
    total: u64,
    counts: Mutex<Vec<Value>>,
    finds: Mutex<Vec<FindCall>>,
}

impl RecordingCollection {
    fn with_total(total: u64) -> Self {
        Self {
            total,
            counts: Mutex::new(Vec::new()),
            finds: Mutex::new(Vec::new()),
        }
    }

    fn last_find(&self) -> FindCall {
        self.finds.lock().unwrap().last().cloned().unwrap()
    }

    fn last_count_filter(&self) -> Value {
        self.counts.lock().unwrap().last().cloned().unwrap()
    }
}

impl Collection for RecordingCollection {
    type Item = Value;

    fn count(&self, filter: &FilterExpression) -> EngineResult<u64> {
        self.counts.lock().unwrap().push(filter.to_document());
        Ok(self.total)
    }

    fn find(&self, query: &FindQuery<'_>) -> EngineResult<Vec<Value>> {
        self.finds.lock().unwrap().push(FindCall {
            filter: query.filter.to_document(),
            projection: query.projection.clone(),
            sort: query.sort.keys().to_vec(),
            skip: query.skip,
            limit: query.limit,
        });

        let start = query.skip.max(0) as u64;
        let end = (start + query.limit.max(0) as u64).min(self.total);
        Ok((start..end).map(|i| json!({ "n": i })).collect())
    }
}

/// Collection whose reads always fail
struct BrokenCollection;

impl Collection for BrokenCollection {
    type Item = Value;

    fn count(&self, _filter: &FilterExpression) -> EngineResult<u64> {
        Err(EngineError::LockPoisoned)
    }

    fn find(&self, _query: &FindQuery<'_>) -> EngineResult<Vec<Value>> {
        Err(EngineError::LockPoisoned)
    }
}

fn raw(pairs: &[(&str, &str)]) -> RawQuery {
    RawQuery::from_pairs(pairs.iter().copied()).unwrap()
}

// =============================================================================
// Page Window Tests
// =============================================================================

#[test]
fn test_defaults_without_page_or_limit() {
    let collection = RecordingCollection::with_total(100);
    let page = build_page(&raw(&[("rescue_priority", "High")]), &collection).unwrap();

    let call = collection.last_find();
    assert_eq!(call.skip, 0);
    assert_eq!(call.limit, 25);
    assert_eq!(page.items.len(), 25);
    assert_eq!(page.total_count, 100);
}

#[test]
fn test_second_page_of_twenty_five() {
    let collection = RecordingCollection::with_total(25);
    let query = raw(&[
        ("select", "name"),
        ("sort", "-createdAt"),
        ("page", "2"),
        ("limit", "10"),
    ]);

    let page = build_page(&query, &collection).unwrap();

    let call = collection.last_find();
    assert_eq!(call.skip, 10);
    assert_eq!(call.limit, 10);
    assert_eq!(
        page.pagination,
        Pagination {
            next: Some(PageLink { page: 3, limit: 10 }),
            prev: Some(PageLink { page: 1, limit: 10 }),
        }
    );
    assert_eq!(
        serde_json::to_value(page.pagination).unwrap(),
        json!({"next": {"page": 3, "limit": 10}, "prev": {"page": 1, "limit": 10}})
    );
}

#[test]
fn test_single_page_has_no_links() {
    let collection = RecordingCollection::with_total(5);
    let page = build_page(&RawQuery::new(), &collection).unwrap();

    assert_eq!(page.pagination, Pagination::default());
    assert_eq!(serde_json::to_value(page.pagination).unwrap(), json!({}));
    assert_eq!(page.items.len(), 5);
}

#[test]
fn test_links_iff_neighbouring_documents() {
    for total in [0u64, 1, 9, 10, 11, 30] {
        for page in 1..=4i64 {
            for limit in [1i64, 5, 10] {
                let collection = RecordingCollection::with_total(total);
                let (page_param, limit_param) = (page.to_string(), limit.to_string());
                let query = raw(&[("page", page_param.as_str()), ("limit", limit_param.as_str())]);
                let result = build_page(&query, &collection).unwrap();

                assert_eq!(
                    result.pagination.next.is_some(),
                    page * limit < total as i64,
                    "next: total={} page={} limit={}",
                    total,
                    page,
                    limit
                );
                assert_eq!(
                    result.pagination.prev.is_some(),
                    (page - 1) * limit > 0,
                    "prev: total={} page={} limit={}",
                    total,
                    page,
                    limit
                );
            }
        }
    }
}

#[test]
fn test_unparsable_window_falls_back() {
    let collection = RecordingCollection::with_total(3);
    build_page(&raw(&[("page", "abc"), ("limit", "7items")]), &collection).unwrap();

    let call = collection.last_find();
    assert_eq!(call.skip, 0);
    assert_eq!(call.limit, 7);
}

#[test]
fn test_negative_page_reaches_collection() {
    let collection = RecordingCollection::with_total(3);
    build_page(&raw(&[("page", "-1")]), &collection).unwrap();
    assert_eq!(collection.last_find().skip, -50);
}

#[test]
fn test_zero_limit_reaches_collection() {
    let collection = RecordingCollection::with_total(3);
    let page = build_page(&raw(&[("limit", "0")]), &collection).unwrap();

    let call = collection.last_find();
    assert_eq!(call.skip, 0);
    assert_eq!(call.limit, 0);
    assert_eq!(page.pagination.next, Some(PageLink { page: 2, limit: 0 }));
}

// =============================================================================
// Filter Translation Tests
// =============================================================================

#[test]
fn test_plain_filter_passes_unchanged() {
    let collection = RecordingCollection::with_total(1);
    build_page(&raw(&[("rescue_priority", "High")]), &collection).unwrap();

    assert_eq!(collection.last_find().filter, json!({"rescue_priority": "High"}));
    assert_eq!(collection.last_count_filter(), json!({"rescue_priority": "High"}));
}

#[test]
fn test_operator_rewrite_reaches_collection() {
    let collection = RecordingCollection::with_total(1);
    let query = raw(&[
        ("age[gte]", "5"),
        ("age[lt]", "10"),
        ("gtefield", "5"),
        ("animal_species[in]", "dog"),
        ("animal_species[in]", "cat"),
    ]);
    build_page(&query, &collection).unwrap();

    assert_eq!(
        collection.last_find().filter,
        json!({
            "age": {"$gte": "5", "$lt": "10"},
            "animal_species": {"$in": ["dog", "cat"]},
            "gtefield": "5"
        })
    );
}

#[test]
fn test_rewrite_is_idempotent() {
    let bare = RecordingCollection::with_total(1);
    build_page(&raw(&[("age[gte]", "5")]), &bare).unwrap();

    let rewritten = RecordingCollection::with_total(1);
    build_page(&raw(&[("age[$gte]", "5")]), &rewritten).unwrap();

    assert_eq!(bare.last_find().filter, rewritten.last_find().filter);
}

#[test]
fn test_field_named_like_operator_stays_a_field() {
    let collection = RecordingCollection::with_total(1);
    build_page(&raw(&[("gte", "5")]), &collection).unwrap();
    assert_eq!(collection.last_find().filter, json!({"gte": "5"}));
}

#[test]
fn test_reserved_keys_never_filter() {
    let collection = RecordingCollection::with_total(1);
    let query = raw(&[("select", "name"), ("sort", "name"), ("page", "1"), ("limit", "5")]);
    build_page(&query, &collection).unwrap();
    assert_eq!(collection.last_find().filter, json!({}));
}

#[test]
fn test_raw_query_is_not_modified() {
    let collection = RecordingCollection::with_total(1);
    let query = raw(&[("select", "name"), ("age[gt]", "3")]);
    let before = query.clone();

    build_page(&query, &collection).unwrap();
    assert_eq!(query, before);
}

// =============================================================================
// Projection and Sort Tests
// =============================================================================

#[test]
fn test_select_keeps_order() {
    let collection = RecordingCollection::with_total(1);
    build_page(&raw(&[("select", "name,age")]), &collection).unwrap();
    assert_eq!(
        collection.last_find().projection,
        Projection::Include(vec!["name".to_string(), "age".to_string()])
    );

    build_page(&RawQuery::new(), &collection).unwrap();
    assert!(collection.last_find().projection.is_all());
}

#[test]
fn test_sort_parsing() {
    let collection = RecordingCollection::with_total(1);
    build_page(&raw(&[("sort", "-rating,name")]), &collection).unwrap();
    assert_eq!(
        collection.last_find().sort,
        [SortKey::desc("rating"), SortKey::asc("name")]
    );

    build_page(&RawQuery::new(), &collection).unwrap();
    assert_eq!(collection.last_find().sort, [SortKey::desc("createdAt")]);
}

#[test]
fn test_mixed_projection_is_client_error() {
    let collection = RecordingCollection::with_total(1);
    let err = build_page(&raw(&[("select", "name,-age")]), &collection).unwrap_err();
    assert!(matches!(err, QueryError::MixedProjection(_)));
    assert!(collection.finds.lock().unwrap().is_empty());
}

// =============================================================================
// Engine Integration Tests
// =============================================================================

#[test]
fn test_engine_errors_propagate() {
    let err = build_page(&RawQuery::new(), &BrokenCollection).unwrap_err();
    assert!(matches!(err, QueryError::Engine(EngineError::LockPoisoned)));
    assert!(!err.is_client_error());
}

/// Query values stay strings, so numeric comparisons never match numbers.
#[test]
fn test_string_operands_do_not_match_numbers() {
    let collection = MemoryCollection::new("animals");
    collection
        .insert_many(vec![json!({"age": 7}), json!({"age": "7"})])
        .unwrap();

    let page = build_page(&raw(&[("age[gte]", "5")]), &collection).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0]["age"], "7");
}

#[test]
fn test_memory_collection_page() {
    let collection = MemoryCollection::new("ngos");
    for i in 0..12 {
        collection
            .insert(json!({
                "name": format!("ngo-{:02}", i),
                "createdAt": format!("2024-01-{:02}T00:00:00.000Z", i + 1)
            }))
            .unwrap();
    }

    let query = raw(&[("select", "name"), ("page", "2"), ("limit", "5")]);
    let page = build_page(&query, &collection).unwrap();

    let names: Vec<&str> = page.items.iter().filter_map(|d| d["name"].as_str()).collect();
    assert_eq!(names, ["ngo-06", "ngo-05", "ngo-04", "ngo-03", "ngo-02"]);
    assert!(page.items.iter().all(|d| d.get("createdAt").is_none()));
    assert_eq!(page.total_count, 12);
    assert_eq!(page.pagination.next, Some(PageLink { page: 3, limit: 5 }));
    assert_eq!(page.pagination.prev, Some(PageLink { page: 1, limit: 5 }));
}
