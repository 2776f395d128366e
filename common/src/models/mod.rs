//! Shared data models for the importer.

pub mod feedback;
pub mod mapping;
pub mod record;
pub mod report;

// Re-export commonly used types
pub use feedback::{sample_feedback, FeedbackEntry};
pub use mapping::{default_mappings, CollectionMapping};
pub use record::Record;
pub use report::{
    BackupStatus, CollectionCount, FeedbackReport, ImportReport, ImportStatus, IndexStatus,
    MappingReport, ReportMeta,
};
