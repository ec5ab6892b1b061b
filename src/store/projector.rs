//! Field projection over JSON documents.

use serde_json::{Map, Value};

use crate::query::Projection;

use super::matcher::lookup;

/// Identifier field kept by inclusion projections
pub const ID_FIELD: &str = "_id";

/// Apply a projection to one document
pub fn project(doc: Value, projection: &Projection) -> Value {
    match projection {
        Projection::All => doc,
        Projection::Include(fields) => {
            let mut out = Map::new();
            if let Some(id) = doc.get(ID_FIELD) {
                out.insert(ID_FIELD.to_string(), id.clone());
            }
            for field in fields {
                if let Some(value) = lookup(&doc, field) {
                    set_path(&mut out, field, value.clone());
                }
            }
            Value::Object(out)
        }
        Projection::Exclude(fields) => {
            let mut doc = doc;
            if let Value::Object(obj) = &mut doc {
                for field in fields {
                    remove_path(obj, field);
                }
            }
            doc
        }
    }
}

fn set_path(obj: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            obj.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = obj
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                set_path(child, rest, value);
            }
        }
    }
}

fn remove_path(obj: &mut Map<String, Value>, path: &str) {
    match path.split_once('.') {
        None => {
            obj.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = obj.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}
