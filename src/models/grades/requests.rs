use serde::Deserialize;
use ts_rs::TS;

use crate::models::submissions::entities::RubricScore;

/// 单个提交评分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeSubmissionRequest {
    pub points: f64,
    pub feedback: Option<String>,
    pub comments: Option<String>,
    pub rubric_scores: Option<Vec<RubricScore>>,
}

/// 批量评分中的单个条目
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradeItem {
    pub submission_id: i64,
    pub points: f64,
    pub feedback: Option<String>,
    pub comments: Option<String>,
}

/// 批量评分请求（作业 ID 来自路径）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradeRequest {
    pub items: Vec<BulkGradeItem>,
}

/// 成绩单元格编辑请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct UpdateGradeCellRequest {
    pub points: f64,
}

/// 导出列的生成方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum ExportColumns {
    /// 以第一条记录的作业作为列，其它记录必须与之一致
    #[default]
    FirstRecord,
    /// 所有记录作业标题的并集，按首次出现顺序
    Union,
}

/// 导出查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct ExportQuery {
    pub columns: Option<ExportColumns>,
}
