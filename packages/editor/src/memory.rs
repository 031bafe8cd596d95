//! In-memory document store.
//!
//! Holds whole values per path (`research/{id}`), the same granularity the
//! editor reads and writes. Every write and delete is appended to an
//! operation log so callers can see exactly what reached the store.

use crate::keys::KeyGenerator;
use crate::services::{DocumentStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

/// A persistence side effect observed by the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Write { path: String, value: Value },
    Delete { path: String },
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
    log: RwLock<Vec<StoreOp>>,
    keys: KeyGenerator,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `(path, value)` entries; seeding is not logged
    pub fn with_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, Value)>,
        P: Into<String>,
    {
        Self {
            entries: RwLock::new(entries.into_iter().map(|(p, v)| (p.into(), v)).collect()),
            ..Self::default()
        }
    }

    /// Writes and deletes in the order they happened
    pub async fn operations(&self) -> Vec<StoreOp> {
        self.log.read().await.clone()
    }

    /// Only the writes, as `(path, value)`
    pub async fn writes(&self) -> Vec<(String, Value)> {
        self.log
            .read()
            .await
            .iter()
            .filter_map(|op| match op {
                StoreOp::Write { path, value } => Some((path.clone(), value.clone())),
                StoreOp::Delete { .. } => None,
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn check_path(path: &str) -> Result<&str, StoreError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(str::is_empty) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(trimmed)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let path = check_path(path)?;
        Ok(self.entries.read().await.get(path).cloned())
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let path = check_path(path)?.to_string();
        debug!(path = %path, "Writing entry");

        self.entries.write().await.insert(path.clone(), value.clone());
        self.log.write().await.push(StoreOp::Write { path, value });
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let path = check_path(path)?.to_string();
        debug!(path = %path, "Deleting entry");

        self.entries.write().await.remove(&path);
        self.log.write().await.push(StoreOp::Delete { path });
        Ok(())
    }

    async fn new_key(&self, collection: &str) -> Result<String, StoreError> {
        let collection = check_path(collection)?;
        let entries = self.entries.read().await;

        loop {
            let key = self.keys.next_key();
            if !entries.contains_key(&format!("{}/{}", collection, key)) {
                return Ok(key);
            }
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let prefix = format!("{}/", check_path(collection)?);

        Ok(self
            .entries
            .read()
            .await
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter_map(|(path, value)| {
                let key = &path[prefix.len()..];
                (!key.contains('/')).then(|| (key.to_string(), value.clone()))
            })
            .collect())
    }
}
