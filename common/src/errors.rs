//! Error types for the import pipeline.
//!
//! Every step returns an [`AppResult`]; the top-level reporter uses
//! [`AppError::is_fatal`] to decide whether the run continues.

use thiserror::Error;

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while importing reference data.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The database is unreachable or rejected the credentials.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// The source file does not exist.
    #[error("source file not found: {0}")]
    SourceMissing(String),

    /// The source file exists but could not be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Writing a collection failed.
    #[error("failed to import into {collection}: {message}")]
    Import { collection: String, message: String },

    /// Writing the JSON backup failed.
    #[error("failed to write backup {path}: {message}")]
    Backup { path: String, message: String },

    /// Anything else, reported at the top level.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Builds a parse error for the given path.
    pub fn parse(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Builds an import error for the given collection.
    pub fn import(collection: impl Into<String>, message: impl ToString) -> Self {
        Self::Import {
            collection: collection.into(),
            message: message.to_string(),
        }
    }

    /// Builds a backup error for the given path.
    pub fn backup(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Backup {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Stable error code, used in log fields and the report.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Connection(_) => "CONNECTION_ERROR",
            AppError::SourceMissing(_) => "SOURCE_MISSING",
            AppError::Parse { .. } => "PARSE_ERROR",
            AppError::Import { .. } => "IMPORT_ERROR",
            AppError::Backup { .. } => "BACKUP_ERROR",
            AppError::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    /// Whether this error must abort the whole run.
    ///
    /// Per-file and per-collection failures are not fatal: the remaining
    /// mappings are still processed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Config(_) | AppError::Connection(_) | AppError::Unexpected(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_unit_errors_are_not_fatal() {
        assert!(!AppError::SourceMissing("a.csv".into()).is_fatal());
        assert!(!AppError::parse("a.csv", "bad row").is_fatal());
        assert!(!AppError::import("x", "write failed").is_fatal());
        assert!(!AppError::backup("x.json", "disk full").is_fatal());
    }

    #[test]
    fn test_connection_error_is_fatal() {
        let err = AppError::Connection("auth failed".into());
        assert!(err.is_fatal());
        assert_eq!(err.code(), "CONNECTION_ERROR");
    }

    #[test]
    fn test_display_includes_context() {
        let err = AppError::import("login_users", "duplicate key");
        assert_eq!(
            err.to_string(),
            "failed to import into login_users: duplicate key"
        );
    }
}
