//! Document store abstraction.
//!
//! The import service only needs a handful of collection-level operations;
//! `MongoStore` implements them against a live server.

#[cfg(test)]
pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use common::errors::AppResult;
use common::models::Record;

pub use mongo::MongoStore;

/// Collection-level operations used by the importer.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Deletes every document in the collection, returning how many were removed.
    async fn delete_all(&self, collection: &str) -> AppResult<u64>;

    /// Inserts the records, returning how many were inserted.
    async fn insert_many(&self, collection: &str, records: &[Record]) -> AppResult<u64>;

    /// Creates an ascending single-field index unless it already exists.
    async fn ensure_index(&self, collection: &str, field: &str) -> AppResult<()>;

    /// Names of all collections in the target database.
    async fn collection_names(&self) -> AppResult<Vec<String>>;

    /// Number of documents in the collection.
    async fn count(&self, collection: &str) -> AppResult<u64>;

    /// Releases the connection. Calling it again is a no-op.
    async fn close(&self);
}
