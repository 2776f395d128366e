//! Mapping table models.
//!
//! Pairs each source file with the collection it replaces.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// One `{source, target}` entry of the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CollectionMapping {
    /// CSV file name, relative to the data directory.
    #[validate(length(min = 1, message = "Source file name is required"))]
    pub source: String,
    /// Target collection name.
    #[validate(length(min = 1, max = 120, message = "Collection name must be 1-120 characters"))]
    pub target: String,
}

impl CollectionMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Full path of the source file inside `data_dir`.
    pub fn source_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.source)
    }

    /// Path of the JSON backup written next to the source file.
    pub fn backup_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.json", self.target))
    }
}

/// The reference data set shipped with the project.
pub fn default_mappings() -> Vec<CollectionMapping> {
    [
        ("firm_data.financial_data.csv", "financial_data"),
        ("firm_data.firm_prediction.csv", "firm_prediction"),
        ("firm_data.company_statuses.csv", "company_statuses"),
        ("firm_data.login_users.csv", "login_users"),
        ("american_bankruptcy.csv", "american_bankruptcy"),
    ]
    .into_iter()
    .map(|(source, target)| CollectionMapping::new(source, target))
    .collect()
}

/// Rejects mapping tables in which two sources replace the same collection.
pub fn validate_unique_targets(mappings: &[CollectionMapping]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for mapping in mappings {
        if !seen.insert(mapping.target.as_str()) {
            let mut err = ValidationError::new("duplicate_target");
            err.message = Some(format!("collection `{}` is mapped more than once", mapping.target).into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let targets: Vec<String> = default_mappings().into_iter().map(|m| m.target).collect();
        assert_eq!(
            targets,
            vec![
                "financial_data",
                "firm_prediction",
                "company_statuses",
                "login_users",
                "american_bankruptcy"
            ]
        );
    }

    #[test]
    fn test_backup_path_uses_target_name() {
        let mapping = CollectionMapping::new("firm_data.login_users.csv", "login_users");
        assert_eq!(
            mapping.backup_path(Path::new("data")),
            Path::new("data").join("login_users.json")
        );
    }

    #[test]
    fn test_duplicate_targets_are_rejected() {
        let mappings = vec![
            CollectionMapping::new("a.csv", "x"),
            CollectionMapping::new("b.csv", "x"),
        ];
        assert!(validate_unique_targets(&mappings).is_err());
        assert!(validate_unique_targets(&default_mappings()).is_ok());
    }

    #[test]
    fn test_empty_target_fails_validation() {
        assert!(CollectionMapping::new("a.csv", "").validate().is_err());
    }
}
