//! Document sorting for collection reads.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{SortDirection, SortSpec};

use super::matcher::lookup;

/// Sorts documents according to a sort specification.
///
/// Sort is stable: documents equal on every key keep insertion order.
pub fn sort_documents(documents: &mut [Value], spec: &SortSpec) {
    documents.sort_by(|a, b| {
        for key in spec.keys() {
            let ordering = compare_values(lookup(a, &key.field), lookup(b, &key.field));
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Compares two JSON values for sorting.
///
/// Ordering rules:
/// - missing < null < bool < number < string < array < object
/// - For same types, natural ordering
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let type_order = |v: Option<&Value>| -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(Value::Array(_)) => 5,
            Some(Value::Object(_)) => 6,
        }
    };

    match (a, b) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        // Arrays and objects are not compared
        _ => type_order(a).cmp(&type_order(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortKey;
    use serde_json::json;

    fn names(docs: &[Value]) -> Vec<&str> {
        docs.iter().filter_map(|d| d["name"].as_str()).collect()
    }

    #[test]
    fn test_descending_then_ascending() {
        let mut docs = vec![
            json!({"name": "b", "averageRating": 7}),
            json!({"name": "a", "averageRating": 7}),
            json!({"name": "c", "averageRating": 9}),
        ];
        let spec = SortSpec::new(vec![SortKey::desc("averageRating"), SortKey::asc("name")]);
        sort_documents(&mut docs, &spec);
        assert_eq!(names(&docs), ["c", "a", "b"]);
    }

    #[test]
    fn test_missing_sorts_first_ascending() {
        let mut docs = vec![
            json!({"name": "rated", "averageRating": 3}),
            json!({"name": "unrated"}),
            json!({"name": "null", "averageRating": null}),
        ];
        sort_documents(&mut docs, &SortSpec::new(vec![SortKey::asc("averageRating")]));
        assert_eq!(names(&docs), ["unrated", "null", "rated"]);
    }

    #[test]
    fn test_default_sort_newest_first() {
        let mut docs = vec![
            json!({"name": "old", "createdAt": "2023-01-01T00:00:00.000Z"}),
            json!({"name": "new", "createdAt": "2024-06-01T00:00:00.000Z"}),
        ];
        sort_documents(&mut docs, &SortSpec::default());
        assert_eq!(names(&docs), ["new", "old"]);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let mut docs = vec![json!({"name": "x"}), json!({"name": "y"}), json!({"name": "z"})];
        sort_documents(&mut docs, &SortSpec::new(vec![SortKey::asc("missing")]));
        assert_eq!(names(&docs), ["x", "y", "z"]);
    }
}
