//! Import report types.
//!
//! Collects the outcome of every step so a single reporter can print them.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Outcome of writing one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportStatus {
    /// Documents were inserted.
    Imported(u64),
    /// The source had no rows; the collection was cleared.
    NothingImported,
    /// The source was missing or unparsable.
    Skipped(String),
    /// Writing the collection failed.
    Failed(String),
}

/// Outcome of the JSON backup for one mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupStatus {
    Written(PathBuf),
    Failed(String),
    NotAttempted,
}

/// Outcome of creating the index on the feedback collection.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexStatus {
    /// Index on the named field exists.
    Created(String),
    Failed(String),
    NotAttempted,
}

/// Outcome of seeding the feedback collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackReport {
    pub import: ImportStatus,
    pub index: IndexStatus,
}

/// Report for one entry of the mapping table.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingReport {
    pub source: String,
    pub collection: String,
    pub import: ImportStatus,
    pub backup: BackupStatus,
}

/// Document count of one collection after the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCount {
    pub name: String,
    pub count: u64,
}

/// Run metadata.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    /// Identifier of this run (also attached to log lines).
    pub run_id: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Total processing time in milliseconds.
    pub duration_ms: Option<u64>,
}

impl ReportMeta {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            duration_ms: None,
        }
    }
}

/// Full report of one import run.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub mappings: Vec<MappingReport>,
    pub feedback: FeedbackReport,
    pub collections: Vec<CollectionCount>,
    pub meta: ReportMeta,
}

impl ImportReport {
    /// Creates an empty report for the given run.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            mappings: Vec::new(),
            feedback: FeedbackReport {
                import: ImportStatus::NothingImported,
                index: IndexStatus::NotAttempted,
            },
            collections: Vec::new(),
            meta: ReportMeta::new(run_id),
        }
    }

    /// Sets the duration from the start timestamp.
    pub fn finish(mut self) -> Self {
        let elapsed = Utc::now() - self.meta.started_at;
        self.meta.duration_ms = Some(elapsed.num_milliseconds().max(0) as u64);
        self
    }

    /// Mappings whose collection was written (including cleared-only ones).
    pub fn succeeded(&self) -> usize {
        self.mappings
            .iter()
            .filter(|m| matches!(m.import, ImportStatus::Imported(_) | ImportStatus::NothingImported))
            .count()
    }

    /// Returns the report entry for a collection.
    pub fn mapping(&self, collection: &str) -> Option<&MappingReport> {
        self.mappings.iter().find(|m| m.collection == collection)
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStatus::Imported(n) => write!(f, "imported {} documents", n),
            ImportStatus::NothingImported => write!(f, "nothing imported"),
            ImportStatus::Skipped(reason) => write!(f, "skipped ({})", reason),
            ImportStatus::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import summary (run {}):", self.meta.run_id)?;
        for mapping in &self.mappings {
            writeln!(
                f,
                "  {} -> {}: {}",
                mapping.source, mapping.collection, mapping.import
            )?;
        }
        writeln!(f, "  feedback: {}", self.feedback.import)?;
        if let IndexStatus::Failed(reason) = &self.feedback.index {
            writeln!(f, "  warning: feedback index not created ({})", reason)?;
        }
        writeln!(f, "Database summary:")?;
        for collection in &self.collections {
            writeln!(f, "  - {}: {} documents", collection.name, collection.count)?;
        }
        if let Some(ms) = self.meta.duration_ms {
            write!(f, "Finished in {} ms", ms)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(collection: &str, import: ImportStatus) -> MappingReport {
        MappingReport {
            source: format!("{}.csv", collection),
            collection: collection.to_string(),
            import,
            backup: BackupStatus::NotAttempted,
        }
    }

    #[test]
    fn test_succeeded_counts_cleared_collections() {
        let mut report = ImportReport::new("run-1");
        report.mappings.push(mapping("a", ImportStatus::Imported(3)));
        report.mappings.push(mapping("b", ImportStatus::NothingImported));
        report.mappings.push(mapping("c", ImportStatus::Skipped("missing".into())));
        report.mappings.push(mapping("d", ImportStatus::Failed("boom".into())));
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.mapping("c").map(|m| &m.import), Some(&ImportStatus::Skipped("missing".into())));
    }

    #[test]
    fn test_display_lists_collection_counts() {
        let mut report = ImportReport::new("run-2");
        report.collections.push(CollectionCount {
            name: "feedback".into(),
            count: 3,
        });
        let text = report.finish().to_string();
        assert!(text.contains("  - feedback: 3 documents"));
        assert!(text.contains("Finished in"));
    }

    #[test]
    fn test_display_warns_about_missing_index() {
        let mut report = ImportReport::new("run-3");
        report.feedback = FeedbackReport {
            import: ImportStatus::Imported(3),
            index: IndexStatus::Failed("not authorized".into()),
        };
        let text = report.to_string();
        assert!(text.contains("  feedback: imported 3 documents"));
        assert!(text.contains("  warning: feedback index not created (not authorized)"));
    }
}
