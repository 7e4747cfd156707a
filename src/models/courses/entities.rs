use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    /// 课程代码，用于导出文件名
    pub code: String,
    pub title: String,
    pub instructor_id: i64,
    /// 学分，用于 GPA 加权
    pub credits: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
