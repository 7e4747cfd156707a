//! 数据模型定义
//!
//! 业务实体、请求与响应结构，与 `entity` 模块中的数据库实体分离。

pub mod actor;
pub mod assignments;
pub mod common;
pub mod courses;
pub mod grades;
pub mod submissions;
pub mod users;

pub use common::error_code::ErrorCode;
pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
