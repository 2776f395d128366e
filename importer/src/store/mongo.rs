//! MongoDB-backed document store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::{Client, Collection, Database, IndexModel};
use serde_json::Value;

use common::config::MongoConfig;
use common::errors::{AppError, AppResult};
use common::models::Record;

use super::DocumentStore;

/// Store backed by a single MongoDB client.
pub struct MongoStore {
    client: Client,
    database: Database,
    closed: AtomicBool,
}

impl MongoStore {
    /// Opens a client and verifies the server answers `ping`.
    ///
    /// # Errors
    /// `AppError::Connection` if the server is unreachable or rejects the credentials.
    pub async fn connect(config: &MongoConfig) -> AppResult<Self> {
        let options = client_options(config)?;
        let client =
            Client::with_options(options).map_err(|e| AppError::Connection(e.to_string()))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.redacted_uri(), "Connected to MongoDB");
        Ok(Self {
            database: client.database(&config.database),
            client,
            closed: AtomicBool::new(false),
        })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

/// Builds client options from the connection descriptor.
fn client_options(config: &MongoConfig) -> AppResult<ClientOptions> {
    let address = ServerAddress::parse(format!("{}:{}", config.host, config.port))
        .map_err(|e| AppError::Config(format!("invalid MongoDB address: {}", e)))?;

    let mut options = ClientOptions::default();
    options.hosts = vec![address];
    options.app_name = Some(config.app_name.clone());
    options.default_database = Some(config.database.clone());
    options.server_selection_timeout = Some(config.server_selection_timeout());
    options.connect_timeout = Some(config.server_selection_timeout());

    if config.has_credentials() {
        let mut credential = Credential::default();
        credential.username = Some(config.username.clone());
        credential.password = Some(config.password.clone());
        credential.source = Some(config.auth_source.clone());
        options.credential = Some(credential);
    }
    Ok(options)
}

/// Converts a record into a BSON document, keeping column order.
pub fn record_to_document(record: &Record) -> Document {
    let mut document = Document::new();
    for (key, value) in record.iter() {
        document.insert(key.clone(), json_to_bson(value));
    }
    document
}

/// Integers that fit in 32 bits are stored as int32, larger ones as int64.
fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).map(Bson::Int32).unwrap_or(Bson::Int64(i))
            } else {
                n.as_f64().map(Bson::Double).unwrap_or(Bson::Null)
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_bson(v)))
                .collect(),
        ),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn delete_all(&self, collection: &str) -> AppResult<u64> {
        let result = self
            .collection(collection)
            .delete_many(doc! {})
            .await
            .map_err(|e| AppError::import(collection, e))?;
        Ok(result.deleted_count)
    }

    async fn insert_many(&self, collection: &str, records: &[Record]) -> AppResult<u64> {
        let documents: Vec<Document> = records.iter().map(record_to_document).collect();
        let result = self
            .collection(collection)
            .insert_many(documents)
            .await
            .map_err(|e| AppError::import(collection, e))?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn ensure_index(&self, collection: &str, field: &str) -> AppResult<()> {
        let mut keys = Document::new();
        keys.insert(field, 1_i32);
        let index = IndexModel::builder().keys(keys).build();

        let result = self
            .collection(collection)
            .create_index(index)
            .await
            .map_err(|e| AppError::import(collection, e))?;
        tracing::debug!(collection = %collection, index = %result.index_name, "Index ensured");
        Ok(())
    }

    async fn collection_names(&self) -> AppResult<Vec<String>> {
        self.database
            .list_collection_names()
            .await
            .map_err(|e| AppError::Unexpected(format!("failed to list collections: {}", e)))
    }

    async fn count(&self, collection: &str) -> AppResult<u64> {
        self.collection(collection)
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::Unexpected(format!("failed to count {}: {}", collection, e)))
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB connection closed");
    }
}
