//! # In-Memory Collection
//!
//! Thread-safe document collection holding JSON objects in insertion order.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::query::FilterExpression;

use super::errors::{EngineError, EngineResult};
use super::matcher::{matches, validate};
use super::projector::{project, ID_FIELD};
use super::sorter::sort_documents;
use super::{Collection, FindQuery};

/// Creation timestamp assigned on insert
pub const CREATED_AT_FIELD: &str = "createdAt";

/// A named collection of JSON documents
#[derive(Debug)]
pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<Value>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Vec<Value>>> {
        self.documents.read().map_err(|_| EngineError::LockPoisoned)
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Vec<Value>>> {
        self.documents.write().map_err(|_| EngineError::LockPoisoned)
    }

    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Store a document, assigning `_id` and `createdAt` when absent.
    ///
    /// A given `_id` must not already be taken.
    pub fn insert(&self, doc: Value) -> EngineResult<Value> {
        let doc = prepare(doc)?;
        let mut documents = self.write()?;
        if let Some(id) = document_id(&doc) {
            if documents.iter().any(|d| document_id(d) == Some(id)) {
                return Err(EngineError::DuplicateId(id.to_string()));
            }
        }
        documents.push(doc.clone());
        debug!(collection = %self.name, id = ?document_id(&doc), "document inserted");
        Ok(doc)
    }

    /// Store several documents; all are validated before any is stored
    pub fn insert_many(&self, docs: Vec<Value>) -> EngineResult<usize> {
        let prepared = docs
            .into_iter()
            .map(prepare)
            .collect::<EngineResult<Vec<_>>>()?;
        let count = prepared.len();

        let mut documents = self.write()?;
        {
            let mut taken: HashSet<&str> = documents.iter().filter_map(document_id).collect();
            for id in prepared.iter().filter_map(document_id) {
                if !taken.insert(id) {
                    return Err(EngineError::DuplicateId(id.to_string()));
                }
            }
        }
        documents.extend(prepared);
        Ok(count)
    }

    pub fn get(&self, id: &str) -> EngineResult<Option<Value>> {
        Ok(self
            .read()?
            .iter()
            .find(|d| document_id(d) == Some(id))
            .cloned())
    }

    /// Shallow-merge `patch` into the document with `id`. `_id` is immutable.
    pub fn update(&self, id: &str, patch: Value) -> EngineResult<Option<Value>> {
        let patch = match patch {
            Value::Object(obj) => obj,
            other => {
                return Err(EngineError::InvalidDocument(format!(
                    "update must be an object, got {}",
                    other
                )))
            }
        };

        let mut documents = self.write()?;
        let doc = match documents.iter_mut().find(|d| document_id(d) == Some(id)) {
            Some(doc) => doc,
            None => return Ok(None),
        };

        if let Value::Object(obj) = &mut *doc {
            for (key, value) in patch {
                if key != ID_FIELD {
                    obj.insert(key, value);
                }
            }
        }
        Ok(Some(doc.clone()))
    }

    /// Remove and return the document with `id`
    pub fn delete(&self, id: &str) -> EngineResult<Option<Value>> {
        let mut documents = self.write()?;
        Ok(documents
            .iter()
            .position(|d| document_id(d) == Some(id))
            .map(|idx| documents.remove(idx)))
    }

    /// Remove every document matching `filter`, returning how many went
    pub fn delete_many(&self, filter: &FilterExpression) -> EngineResult<usize> {
        validate(filter)?;
        let mut documents = self.write()?;

        // All verdicts are in before anything is removed
        let doomed = documents
            .iter()
            .map(|doc| matches(doc, filter))
            .collect::<EngineResult<Vec<bool>>>()?;

        let before = documents.len();
        let mut verdicts = doomed.into_iter();
        documents.retain(|_| !verdicts.next().unwrap_or(false));

        Ok(before - documents.len())
    }

    /// Every matching document, unsorted and unprojected
    pub fn find_all(&self, filter: &FilterExpression) -> EngineResult<Vec<Value>> {
        validate(filter)?;
        let documents = self.read()?;
        let mut found = Vec::new();
        for doc in documents.iter() {
            if matches(doc, filter)? {
                found.push(doc.clone());
            }
        }
        Ok(found)
    }
}

impl Collection for MemoryCollection {
    type Item = Value;

    fn count(&self, filter: &FilterExpression) -> EngineResult<u64> {
        validate(filter)?;
        let documents = self.read()?;
        let mut count = 0u64;
        for doc in documents.iter() {
            if matches(doc, filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn find(&self, query: &FindQuery<'_>) -> EngineResult<Vec<Value>> {
        let skip = usize::try_from(query.skip).map_err(|_| EngineError::NegativeSkip(query.skip))?;

        // Zero means no limit; a negative limit counts like its absolute value
        let limit = match query.limit.unsigned_abs() {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };

        let mut found = self.find_all(query.filter)?;
        sort_documents(&mut found, query.sort);

        Ok(found
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| project(doc, query.projection))
            .collect())
    }
}

pub(crate) fn document_id(doc: &Value) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

fn prepare(doc: Value) -> EngineResult<Value> {
    let mut obj: Map<String, Value> = match doc {
        Value::Object(obj) => obj,
        other => {
            return Err(EngineError::InvalidDocument(format!(
                "expected an object, got {}",
                other
            )))
        }
    };

    if !obj.get(ID_FIELD).is_some_and(Value::is_string) {
        obj.insert(ID_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    obj.entry(CREATED_AT_FIELD).or_insert_with(|| {
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
    });

    Ok(Value::Object(obj))
}
