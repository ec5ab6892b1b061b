//! # Snapshots
//!
//! JSON array files of documents. Used to seed collections at startup and
//! by the explicit export command. Listing documents never writes one.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use super::errors::{EngineError, EngineResult};

/// Read a JSON array of documents
pub fn load_snapshot(path: &Path) -> EngineResult<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        EngineError::Snapshot(format!("Failed to read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        EngineError::Snapshot(format!(
            "{} is not a JSON array of documents: {}",
            path.display(),
            e
        ))
    })
}

/// Write documents as a pretty-printed JSON array, replacing any existing file
pub fn export_snapshot(path: &Path, documents: &[Value]) -> EngineResult<()> {
    let body = serde_json::to_vec_pretty(documents)
        .map_err(|e| EngineError::Snapshot(format!("Failed to encode documents: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            EngineError::Snapshot(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    fs::write(path, body).map_err(|e| {
        EngineError::Snapshot(format!("Failed to write {}: {}", path.display(), e))
    })?;

    info!(path = %path.display(), documents = documents.len(), "snapshot exported");
    Ok(())
}
