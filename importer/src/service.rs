//! 数据导入服务模块
//!
//! 按映射表依次执行：CSV 转换 → 替换集合 → 写入 JSON 备份，
//! 随后写入示例反馈数据并输出各集合文档数。

use std::sync::Arc;

use common::config::ImportConfig;
use common::errors::{AppError, AppResult};
use common::models::{
    sample_feedback, BackupStatus, CollectionCount, CollectionMapping, FeedbackReport,
    ImportReport, ImportStatus, IndexStatus, MappingReport, Record,
};

use crate::backup::write_backup;
use crate::converter::CsvConverter;
use crate::store::DocumentStore;

/// 反馈集合上建立索引的字段
pub const FEEDBACK_INDEX_FIELD: &str = "timestamp";

/// CSV 导入服务
pub struct ImportService {
    store: Arc<dyn DocumentStore>,
    converter: CsvConverter,
    config: ImportConfig,
}

impl ImportService {
    /// 创建新的导入服务实例
    pub fn new(store: Arc<dyn DocumentStore>, config: ImportConfig) -> Self {
        Self {
            store,
            converter: CsvConverter,
            config,
        }
    }

    /// 执行完整导入流程
    ///
    /// 单个文件或集合的失败只记录在报告中；只有致命错误才会中止。
    pub async fn run(&self, run_id: &str) -> AppResult<ImportReport> {
        let mut report = ImportReport::new(run_id);

        report.mappings = self.process_all().await?;

        tracing::info!(collection = %self.config.feedback_collection, "Adding sample feedback data");
        report.feedback = self.seed_feedback().await?;

        report.collections = self.summarize().await?;

        tracing::info!(
            imported = report.succeeded(),
            total = report.mappings.len(),
            "Import completed"
        );
        Ok(report.finish())
    }

    /// 依次处理映射表中的每一项（不会因单项失败而提前结束）
    pub async fn process_all(&self) -> AppResult<Vec<MappingReport>> {
        let mut reports = Vec::with_capacity(self.config.mappings.len());
        for mapping in &self.config.mappings {
            reports.push(self.process_mapping(mapping).await?);
        }
        Ok(reports)
    }

    /// 处理单个映射：转换 → 替换集合 → 备份
    pub async fn process_mapping(&self, mapping: &CollectionMapping) -> AppResult<MappingReport> {
        let path = mapping.source_path(&self.config.data_dir);
        tracing::info!(source = %path.display(), collection = %mapping.target, "Processing source file");

        let mut report = MappingReport {
            source: mapping.source.clone(),
            collection: mapping.target.clone(),
            import: ImportStatus::NothingImported,
            backup: BackupStatus::NotAttempted,
        };

        let records = match self.converter.convert_file(&path) {
            Ok(records) => records,
            Err(e) => {
                report.import = settle(&mapping.target, Err(e))?;
                return Ok(report);
            }
        };

        report.import = settle(
            &mapping.target,
            self.replace_collection(&mapping.target, &records).await,
        )?;

        // 备份失败仅告警，不影响导入结果
        let backup_path = mapping.backup_path(&self.config.data_dir);
        report.backup = match write_backup(&backup_path, &records) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Saved backup JSON");
                BackupStatus::Written(path)
            }
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "Backup not written");
                BackupStatus::Failed(e.to_string())
            }
        };

        Ok(report)
    }

    /// 清空集合后写入新记录
    ///
    /// 记录为空时仍会清空集合，但不执行插入，结果为 `NothingImported`。
    pub async fn replace_collection(
        &self,
        collection: &str,
        records: &[Record],
    ) -> AppResult<ImportStatus> {
        let removed = self.store.delete_all(collection).await?;
        tracing::debug!(collection = %collection, removed, "Cleared collection");

        if records.is_empty() {
            tracing::warn!(collection = %collection, "No data to import");
            return Ok(ImportStatus::NothingImported);
        }

        let inserted = self.store.insert_many(collection, records).await?;
        tracing::info!(collection = %collection, count = inserted, "Imported documents");
        Ok(ImportStatus::Imported(inserted))
    }

    /// 写入示例反馈数据并确保时间戳索引存在（可重复执行）
    ///
    /// 索引创建失败只作为警告记录，不影响已写入的反馈数据。
    pub async fn seed_feedback(&self) -> AppResult<FeedbackReport> {
        let collection = &self.config.feedback_collection;
        let records: Vec<Record> = sample_feedback().iter().map(|f| f.to_record()).collect();

        let import = settle(collection, self.replace_collection(collection, &records).await)?;

        let index = match self.store.ensure_index(collection, FEEDBACK_INDEX_FIELD).await {
            Ok(()) => {
                tracing::info!(collection = %collection, field = FEEDBACK_INDEX_FIELD, "Created index");
                IndexStatus::Created(FEEDBACK_INDEX_FIELD.to_string())
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(collection = %collection, code = e.code(), error = %e, "Index not created");
                IndexStatus::Failed(e.to_string())
            }
        };

        Ok(FeedbackReport { import, index })
    }

    /// 统计数据库中所有集合的文档数（按名称排序）
    pub async fn summarize(&self) -> AppResult<Vec<CollectionCount>> {
        let mut names = self.store.collection_names().await?;
        names.sort();

        let mut counts = Vec::with_capacity(names.len());
        for name in names {
            let count = self.store.count(&name).await?;
            counts.push(CollectionCount { name, count });
        }
        Ok(counts)
    }
}

/// 将单项结果归类：致命错误继续向上传播，其余错误记录后继续
fn settle(collection: &str, result: AppResult<ImportStatus>) -> AppResult<ImportStatus> {
    let err = match result {
        Ok(status) => return Ok(status),
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => e,
    };

    match err {
        AppError::SourceMissing(_) => {
            tracing::warn!(collection = %collection, error = %err, "File not found, skipping");
            Ok(ImportStatus::Skipped(err.to_string()))
        }
        AppError::Parse { .. } => {
            tracing::error!(collection = %collection, code = err.code(), error = %err, "Conversion failed, skipping");
            Ok(ImportStatus::Skipped(err.to_string()))
        }
        _ => {
            tracing::error!(collection = %collection, code = err.code(), error = %err, "Import failed");
            Ok(ImportStatus::Failed(err.to_string()))
        }
    }
}
