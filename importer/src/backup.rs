//! JSON backups of converted records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use common::errors::{AppError, AppResult};
use common::models::Record;

/// Writes `records` to `path` as pretty-printed JSON (2-space indent),
/// replacing any previous file.
pub fn write_backup(path: &Path, records: &[Record]) -> AppResult<PathBuf> {
    let label = path.display().to_string();
    let file = File::create(path).map_err(|e| AppError::backup(&label, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| AppError::backup(&label, e))?;
    writer.flush().map_err(|e| AppError::backup(&label, e))?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backup_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        let records: Vec<Record> = vec![[("name", json!("Globex")), ("amount", json!(200))]
            .into_iter()
            .collect()];

        write_backup(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "[\n  {\n    \"name\": \"Globex\",\n    \"amount\": 200\n  }\n]"
        );
    }

    #[test]
    fn test_backup_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        std::fs::write(&path, "stale content that is longer than the new one").unwrap();

        write_backup(&path, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_unwritable_path_is_a_backup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("x.json");
        let err = write_backup(&path, &[]).unwrap_err();
        assert!(matches!(err, AppError::Backup { .. }));
    }
}
