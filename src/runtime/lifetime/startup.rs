use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::GradeService;
use crate::storage::{Storage, create_storage};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub grade_service: Arc<GradeService>,
}

/// 准备服务器启动的上下文
/// 包括存储后端和评分服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    let storage = create_storage(&config.database).await?;
    warn!("Storage backend initialized and migrations completed");

    let grading = config.grading.clone();
    debug!(
        "Grading config: bulk_max_items={}, bulk_concurrency={}, page_size={}/{}",
        grading.bulk_max_items,
        grading.bulk_concurrency,
        grading.default_page_size,
        grading.max_page_size
    );

    // 记录锁表挂在服务实例上，所有 worker 共享同一个实例
    let grade_service = Arc::new(GradeService::new(storage.clone(), grading));

    Ok(StartupContext {
        storage,
        grade_service,
    })
}
