//! In-memory document store for tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::errors::{AppError, AppResult};
use common::models::Record;

use super::DocumentStore;

/// Collections and indexes held in memory, with optional injected failures.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<Record>>>,
    indexes: RwLock<BTreeMap<String, Vec<String>>>,
    failing_inserts: HashSet<String>,
    failing_listing: bool,
    failing_indexes: bool,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes inserts into `collection` fail.
    pub fn fail_inserts_into(mut self, collection: &str) -> Self {
        self.failing_inserts.insert(collection.to_string());
        self
    }

    /// Makes listing collections fail.
    pub fn fail_listing(mut self) -> Self {
        self.failing_listing = true;
        self
    }

    /// Makes index creation fail.
    pub fn fail_indexing(mut self) -> Self {
        self.failing_indexes = true;
        self
    }

    /// Pre-populates a collection.
    pub async fn seed(&self, collection: &str, records: Vec<Record>) {
        self.collections
            .write()
            .await
            .insert(collection.to_string(), records);
    }

    pub async fn documents(&self, collection: &str) -> Vec<Record> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn indexes(&self, collection: &str) -> Vec<String> {
        self.indexes
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn delete_all(&self, collection: &str) -> AppResult<u64> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .map(|docs| docs.drain(..).count())
            .unwrap_or(0);
        Ok(removed as u64)
    }

    async fn insert_many(&self, collection: &str, records: &[Record]) -> AppResult<u64> {
        if self.failing_inserts.contains(collection) {
            return Err(AppError::import(collection, "injected insert failure"));
        }
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(records.len() as u64)
    }

    async fn ensure_index(&self, collection: &str, field: &str) -> AppResult<()> {
        if self.failing_indexes {
            return Err(AppError::import(collection, "injected index failure"));
        }
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default();
        let mut indexes = self.indexes.write().await;
        let fields = indexes.entry(collection.to_string()).or_default();
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
        Ok(())
    }

    async fn collection_names(&self) -> AppResult<Vec<String>> {
        if self.failing_listing {
            return Err(AppError::Unexpected("injected listing failure".into()));
        }
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn count(&self, collection: &str) -> AppResult<u64> {
        Ok(self.documents(collection).await.len() as u64)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
