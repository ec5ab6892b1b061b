//! # Filter Evaluation
//!
//! Evaluates a [`FilterExpression`] against JSON documents.
//!
//! Comparisons only hold between values of the same JSON type. A string
//! operand never matches a numeric or boolean field, which is how the engine
//! treats query-string values that were not coerced upstream.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{Comparison, Condition, FilterExpression, FilterValue, Operator};

use super::errors::{EngineError, EngineResult};

/// Reject operands the engine cannot evaluate, independent of any document.
///
/// Collections call this before scanning so an empty collection fails the
/// same way a populated one does.
pub fn validate(filter: &FilterExpression) -> EngineResult<()> {
    for (_, condition) in filter.iter() {
        if let Condition::Compare(comparisons) = condition {
            comparisons.iter().try_for_each(check_operand)?;
        }
    }
    Ok(())
}

fn check_operand(comparison: &Comparison) -> EngineResult<()> {
    match (comparison.operator, &comparison.value) {
        (Operator::In, FilterValue::List(_)) => Ok(()),
        (Operator::In, other) => Err(EngineError::InvalidOperand(format!(
            "{} needs an array, got {}",
            Operator::In.as_str(),
            other.to_json()
        ))),
        _ => Ok(()),
    }
}

/// Check a document against every condition of `filter`
pub fn matches(doc: &Value, filter: &FilterExpression) -> EngineResult<bool> {
    for (field, condition) in filter.iter() {
        if !matches_condition(lookup(doc, field), condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Resolve a dotted path such as `location.city`
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

fn matches_condition(value: Option<&Value>, condition: &Condition) -> EngineResult<bool> {
    match condition {
        Condition::Equals(expected) => Ok(equals(value, &expected.to_json())),
        Condition::Compare(comparisons) => {
            for comparison in comparisons {
                if !compare(value, comparison)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::WithinSphere(sphere) => Ok(value.is_some_and(|v| sphere.contains_value(v))),
    }
}

/// Equality with array fields matching any of their elements
fn equals(value: Option<&Value>, expected: &Value) -> bool {
    match value {
        None => expected.is_null(),
        Some(Value::Array(items)) => {
            items.iter().any(|item| item == expected) || expected.as_array() == Some(items)
        }
        Some(v) => v == expected,
    }
}

fn compare(value: Option<&Value>, comparison: &Comparison) -> EngineResult<bool> {
    check_operand(comparison)?;
    let operand = comparison.value.to_json();

    if let (Operator::In, Value::Array(candidates)) = (comparison.operator, &operand) {
        return Ok(candidates.iter().any(|c| equals(value, c)));
    }

    let value = match value {
        Some(v) => v,
        None => return Ok(false),
    };

    let satisfied = |v: &Value| match ordering(v, &operand) {
        Some(ord) => satisfies(comparison.operator, ord),
        None => false,
    };

    Ok(match value {
        Value::Array(items) => items.iter().any(satisfied),
        other => satisfied(other),
    })
}

/// Ordering between two values of the same type; `None` across types
fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn satisfies(operator: Operator, ord: Ordering) -> bool {
    match operator {
        Operator::Gt => ord == Ordering::Greater,
        Operator::Gte => ord != Ordering::Less,
        Operator::Lt => ord == Ordering::Less,
        Operator::Lte => ord != Ordering::Greater,
        Operator::In => false,
    }
}
