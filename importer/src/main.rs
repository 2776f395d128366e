//! CSV 参考数据导入工具
//!
//! 一次性将参考 CSV 文件导入 MongoDB：
//! - 连接数据库并 ping 检查
//! - 按映射表转换 CSV 并整体替换目标集合，同时写入 JSON 备份
//! - 写入示例反馈数据并创建时间戳索引
//! - 输出各集合文档数后关闭连接
//!
//! 用法：`importer [数据目录]`

mod backup;
mod converter;
mod service;
mod state;
mod store;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use common::config::{load_dotenv, AppConfig};
use common::utils::IdGenerator;
use state::AppState;
use store::MongoStore;
use tracing::{debug, error, info, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "csv-importer";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 优先加载 .env 文件（若存在）
    let dotenv_loaded = load_dotenv(Path::new(".env"));

    // 初始化日志追踪
    init_tracing();
    if dotenv_loaded {
        debug!("Loaded .env file");
    }

    // 加载并校验配置
    let mut config = AppConfig::load(SERVICE_NAME).context("failed to load configuration")?;
    if let Some(data_dir) = std::env::args_os().nth(1) {
        config = config.with_data_dir(data_dir);
    }

    info!(
        service = SERVICE_NAME,
        data_dir = %config.import.data_dir.display(),
        mappings = config.import.mappings.len(),
        "ProfitPulse CSV to MongoDB import"
    );

    // 连接失败时直接退出，不处理任何文件
    let store = MongoStore::connect(&config.mongo)
        .await
        .context("failed to connect to MongoDB")?;
    let state = AppState::new(config, Arc::new(store));

    let run_id = IdGenerator::run_id();
    let span = tracing::info_span!("import", run_id = %run_id);
    match state.run(&run_id).instrument(span).await {
        Ok(report) => {
            println!("{}", report);
            Ok(())
        }
        Err(e) => {
            error!(code = e.code(), error = %e, "Import failed");
            Err(e.into())
        }
    }
}

/// `RUST_LOG` 控制日志级别（默认 info），`LOG_FORMAT=json` 输出 JSON 日志
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
