//! JSON file persistence for the in-memory backend.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::InMemory;
use crate::{
    Error, Result,
    backend::errors::BackendError,
    entity::{ItemId, Record, sort_records},
};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk layout. Records are written as a sorted list so diffs of the file stay readable.
#[derive(Serialize, Deserialize)]
struct SerializableContent {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    records: Vec<Record>,
}

pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let mut records: Vec<Record> = backend.records.read().await.values().cloned().collect();
    records.sort_by(|a, b| a.scope.cmp(&b.scope));
    // Stable sort keeps scope grouping while ordering each group for display.
    for group in records.chunk_by_mut(|a, b| a.scope == b.scope) {
        sort_records(group);
    }

    let serializable = SerializableContent {
        version: PERSISTENCE_VERSION,
        records,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path.as_ref(), json)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })?;
    tracing::info!(path = %path.as_ref().display(), "Saved content");
    Ok(())
}

pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(json) => {
            let content: SerializableContent = serde_json::from_str(&json).map_err(|e| -> Error {
                BackendError::DeserializationFailed { source: e }.into()
            })?;
            let records: HashMap<ItemId, Record> = content
                .records
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect();
            tracing::info!(path = %path.as_ref().display(), count = records.len(), "Loaded content");
            let backend = InMemory::new();
            *backend.records.write().await = records;
            Ok(backend)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
