//! Shared building blocks for the CSV seed importer.
//!
//! - `config`: connection descriptor and import settings loaded from the environment
//! - `errors`: the error taxonomy shared by every import step
//! - `models`: records, mapping table, feedback samples and the import report
//! - `utils`: small helpers (run identifiers)

pub mod config;
pub mod errors;
pub mod models;
pub mod utils;
