//! # Filter Expression
//!
//! Typed filter handed to a collection, built from the filter source of a
//! request. Bracketed comparison keys (`age[gte]=5`) are rewritten to the
//! engine operator spelling (`{"age": {"$gte": "5"}}`); everything else is an
//! equality test.
//!
//! Values are kept exactly as received. No number or boolean coercion is
//! performed here, so `age[gte]=5` compares against the string `"5"`.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::store::GeoSphere;

use super::errors::{QueryError, QueryResult};
use super::raw::{RawQuery, RawValue};

/// Comparison operators accepted in bracketed filter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Value in list
    In,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
    ];

    /// Bare keyword as written in a query string
    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
        }
    }

    /// Engine spelling of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::In => "$in",
        }
    }

    /// Match a whole key against the operator set.
    ///
    /// Accepts both the bare keyword and the engine spelling, so rewriting
    /// an already rewritten key is a no-op.
    pub fn from_key(key: &str) -> Option<Self> {
        let bare = key.strip_prefix('$').unwrap_or(key);
        Self::ALL.into_iter().find(|op| op.keyword() == bare)
    }
}

/// A literal value inside a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
    /// Embedded document compared as a whole
    Document(BTreeMap<String, FilterValue>),
}

impl FilterValue {
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Text(s) => Value::String(s.clone()),
            FilterValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FilterValue::Document(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// One operator applied to a field
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub operator: Operator,
    pub value: FilterValue,
}

/// Condition on a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value (or an array field contains it)
    Equals(FilterValue),
    /// All comparisons must hold
    Compare(Vec<Comparison>),
    /// Location lies inside a sphere cap
    WithinSphere(GeoSphere),
}

impl Condition {
    fn to_json(&self) -> Value {
        match self {
            Condition::Equals(value) => value.to_json(),
            Condition::Compare(comparisons) => Value::Object(
                comparisons
                    .iter()
                    .map(|c| (c.operator.as_str().to_string(), c.value.to_json()))
                    .collect(),
            ),
            Condition::WithinSphere(sphere) => json!({
                "$geoWithin": {
                    "$centerSphere": [[sphere.lng, sphere.lat], sphere.radius]
                }
            }),
        }
    }
}

/// Conjunction of per-field conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    conditions: BTreeMap<String, Condition>,
}

impl FilterExpression {
    /// Filter that matches every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a filter source (reserved keys already removed)
    pub fn from_raw(source: &RawQuery) -> QueryResult<Self> {
        let mut conditions = BTreeMap::new();

        for (field, value) in source.iter() {
            if field.starts_with('$') {
                return Err(QueryError::ReservedFieldName(field.to_string()));
            }

            let condition = match value {
                RawValue::Text(s) => Condition::Equals(FilterValue::Text(s.clone())),
                RawValue::List(items) => Condition::Equals(FilterValue::List(items.clone())),
                RawValue::Map(nested) => field_condition(field, nested)?,
            };
            conditions.insert(field.to_string(), condition);
        }

        Ok(Self { conditions })
    }

    /// Add or replace an equality condition
    pub fn with_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.insert(
            field.into(),
            Condition::Equals(FilterValue::Text(value.into())),
        );
        self
    }

    /// Add or replace an arbitrary condition
    pub fn with_condition(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.conditions.insert(field.into(), condition);
        self
    }

    /// Filter on documents whose `field` lies inside `sphere`
    pub fn within_sphere(field: impl Into<String>, sphere: GeoSphere) -> Self {
        Self::new().with_condition(field, Condition::WithinSphere(sphere))
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render in the document-query syntax the engine understands
    pub fn to_document(&self) -> Value {
        Value::Object(
            self.conditions
                .iter()
                .map(|(field, condition)| (field.clone(), condition.to_json()))
                .collect(),
        )
    }
}

/// Condition for a field given as a bracketed map
fn field_condition(field: &str, nested: &RawQuery) -> QueryResult<Condition> {
    let operator_keys = nested
        .iter()
        .filter(|(k, _)| Operator::from_key(k).is_some())
        .count();

    if operator_keys == 0 {
        return Ok(Condition::Equals(document(field, nested)?));
    }
    if operator_keys != nested.len() {
        return Err(QueryError::MixedOperators(field.to_string()));
    }

    // Later spellings of the same operator replace earlier ones
    let mut by_operator = BTreeMap::new();
    for (key, value) in nested.iter() {
        if let Some(operator) = Operator::from_key(key) {
            by_operator.insert(operator, literal(field, value)?);
        }
    }

    Ok(Condition::Compare(
        by_operator
            .into_iter()
            .map(|(operator, value)| Comparison { operator, value })
            .collect(),
    ))
}

fn literal(field: &str, value: &RawValue) -> QueryResult<FilterValue> {
    match value {
        RawValue::Text(s) => Ok(FilterValue::Text(s.clone())),
        RawValue::List(items) => Ok(FilterValue::List(items.clone())),
        RawValue::Map(nested) => document(field, nested),
    }
}

/// Embedded document value; operators are only valid directly under a field
fn document(field: &str, nested: &RawQuery) -> QueryResult<FilterValue> {
    let mut fields = BTreeMap::new();
    for (key, value) in nested.iter() {
        if key.starts_with('$') || Operator::from_key(key).is_some() {
            return Err(QueryError::MisplacedOperator {
                field: field.to_string(),
                operator: key.to_string(),
            });
        }
        fields.insert(key.to_string(), literal(field, value)?);
    }
    Ok(FilterValue::Document(fields))
}
