//! Application configuration.
//!
//! All connection parameters are read from the environment (optionally
//! seeded from a `.env` file) and validated before the importer connects.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::{AppError, AppResult};
use crate::models::mapping::{default_mappings, validate_unique_targets, CollectionMapping};

/// Default directory holding the reference CSV files (name as shipped with the dataset).
pub const DEFAULT_DATA_DIR: &str = "Refrence Data";
pub const DEFAULT_FEEDBACK_COLLECTION: &str = "feedback";

/// MongoDB connection descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_credentials"))]
pub struct MongoConfig {
    /// Server host.
    #[validate(length(min = 1, message = "MONGO_HOST must not be empty"))]
    pub host: String,
    /// Server port.
    #[validate(range(min = 1, message = "MONGO_PORT must be a valid port"))]
    pub port: u16,
    /// Username (empty disables authentication).
    #[serde(default)]
    pub username: String,
    /// Password (never serialized).
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Target database name.
    #[validate(length(min = 1, max = 63, message = "MONGO_DATABASE must be 1-63 characters"))]
    pub database: String,
    /// Database holding the user's credentials.
    #[validate(length(min = 1, message = "MONGO_AUTH_SOURCE must not be empty"))]
    pub auth_source: String,
    /// Application name reported to the server.
    pub app_name: String,
    /// Server selection timeout in seconds.
    #[validate(range(min = 1, max = 300, message = "MONGO_TIMEOUT_SECS must be 1-300"))]
    pub timeout_secs: u64,
}

impl MongoConfig {
    /// Whether credentials should be sent.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }

    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connection target without credentials, safe to log.
    pub fn redacted_uri(&self) -> String {
        let user = if self.has_credentials() {
            format!("{}:***@", self.username)
        } else {
            String::new()
        };
        format!(
            "mongodb://{}{}:{}/{}?authSource={}",
            user, self.host, self.port, self.database, self.auth_source
        )
    }
}

fn validate_credentials(config: &MongoConfig) -> Result<(), ValidationError> {
    if config.has_credentials() && config.password.is_empty() {
        let mut err = ValidationError::new("missing_password");
        err.message = Some("MONGO_PASSWORD is required when MONGO_USERNAME is set".into());
        return Err(err);
    }
    Ok(())
}

/// Import settings: where to read from and what to replace.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImportConfig {
    /// Directory containing the CSV files; backups are written here too.
    pub data_dir: PathBuf,
    /// Ordered mapping table.
    #[validate(
        length(min = 1, message = "at least one mapping is required"),
        nested,
        custom(function = "validate_unique_targets")
    )]
    pub mappings: Vec<CollectionMapping>,
    /// Collection receiving the sample feedback.
    #[validate(length(min = 1, message = "IMPORT_FEEDBACK_COLLECTION must not be empty"))]
    pub feedback_collection: String,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub mongo: MongoConfig,
    #[validate(nested)]
    pub import: ImportConfig,
}

impl AppConfig {
    /// Loads the configuration from the process environment and validates it.
    pub fn load(app_name: &str) -> AppResult<Self> {
        Self::from_lookup(app_name, |key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(app_name: &str, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let mappings = match lookup("IMPORT_MAPPINGS_FILE").filter(|v| !v.trim().is_empty()) {
            Some(path) => load_mappings(Path::new(path.trim()))?,
            None => default_mappings(),
        };

        let config = Self {
            mongo: MongoConfig {
                host: var("MONGO_HOST", "localhost"),
                port: parse_number("MONGO_PORT", &var("MONGO_PORT", "27017"))?,
                username: var("MONGO_USERNAME", ""),
                password: lookup("MONGO_PASSWORD").unwrap_or_default(),
                database: var("MONGO_DATABASE", "firm_data"),
                auth_source: var("MONGO_AUTH_SOURCE", "admin"),
                app_name: app_name.to_string(),
                timeout_secs: parse_number("MONGO_TIMEOUT_SECS", &var("MONGO_TIMEOUT_SECS", "5"))?,
            },
            import: ImportConfig {
                data_dir: PathBuf::from(var("IMPORT_DATA_DIR", DEFAULT_DATA_DIR)),
                mappings,
                feedback_collection: var("IMPORT_FEEDBACK_COLLECTION", DEFAULT_FEEDBACK_COLLECTION),
            },
        };

        config.check()?;
        Ok(config)
    }

    /// Overrides the data directory (from the command line).
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.import.data_dir = data_dir.into();
        self
    }

    /// Runs all validation rules.
    pub fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        if self
            .import
            .mappings
            .iter()
            .any(|m| m.target == self.import.feedback_collection)
        {
            return Err(AppError::Config(format!(
                "collection `{}` is reserved for feedback samples",
                self.import.feedback_collection
            )));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.parse()
        .map_err(|_| AppError::Config(format!("{} must be a number, got `{}`", key, raw)))
}

/// Reads a mapping table from a JSON file: `[{"source": "...", "target": "..."}]`.
pub fn load_mappings(path: &Path) -> AppResult<Vec<CollectionMapping>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("cannot read mapping file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        AppError::Config(format!("invalid mapping file {}: {}", path.display(), e))
    })
}

/// Loads a `.env` file (best-effort, no error if missing).
///
/// Variables already present in the environment are left untouched.
/// Returns whether a file was read.
pub fn load_dotenv(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    for (key, value) in parse_dotenv(&content) {
        if std::env::var(&key).is_err() {
            std::env::set_var(&key, value);
        }
    }
    true
}

fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}
