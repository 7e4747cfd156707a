use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::models::PaginationInfo;
use crate::models::grades::entities::{AssignmentGrade, GradeRecord, LetterGrade};
use crate::models::submissions::entities::Submission;
use crate::utils::round2;

/// 成绩记录响应（总评保留两位小数）
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeRecordResponse {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub entries: Vec<AssignmentGrade>,
    pub overall_grade: Option<f64>,
    pub letter_grade: Option<LetterGrade>,
    pub updated_at: DateTime<Utc>,
}

impl From<&GradeRecord> for GradeRecordResponse {
    fn from(record: &GradeRecord) -> Self {
        Self {
            id: record.id,
            student_id: record.student_id,
            course_id: record.course_id,
            entries: record.entries.clone(),
            overall_grade: record.overall_grade.map(round2),
            letter_grade: record.letter_grade,
            updated_at: record.updated_at,
        }
    }
}

/// 单个提交评分结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeSubmissionResponse {
    pub submission: Submission,
    pub overall_grade: Option<f64>,
    pub letter_grade: Option<LetterGrade>,
}

/// 批量评分失败条目
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradeFailure {
    pub submission_id: i64,
    pub code: String,
    pub error: String,
}

/// 批量评分结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradeResponse {
    pub assignment_id: i64,
    pub successful_ids: Vec<i64>,
    pub failures: Vec<BulkGradeFailure>,
    pub success_count: usize,
    pub failure_count: usize,
}

/// 课程成绩查询结果：学生只看到自己的记录，教师看到分页列表
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "view", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum CourseGradesResponse {
    Own {
        record: Option<GradeRecordResponse>,
    },
    Listing {
        items: Vec<GradeRecordResponse>,
        pagination: PaginationInfo,
    },
}

/// 成绩册中的单门课程
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradebookCourseEntry {
    pub course_id: i64,
    pub course_code: String,
    pub course_title: String,
    pub credits: f64,
    pub overall_grade: Option<f64>,
    pub letter_grade: Option<LetterGrade>,
}

/// 学生跨课程成绩册
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradebookResponse {
    pub student_id: i64,
    pub courses: Vec<GradebookCourseEntry>,
    pub gpa: f64,
}

/// 等级分布
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeDistribution {
    #[serde(rename = "A")]
    pub a: i64,
    #[serde(rename = "B")]
    pub b: i64,
    #[serde(rename = "C")]
    pub c: i64,
    #[serde(rename = "D")]
    pub d: i64,
    #[serde(rename = "F")]
    pub f: i64,
}

impl GradeDistribution {
    pub fn record(&mut self, letter: LetterGrade) {
        match letter {
            LetterGrade::A => self.a += 1,
            LetterGrade::B => self.b += 1,
            LetterGrade::C => self.c += 1,
            LetterGrade::D => self.d += 1,
            LetterGrade::F => self.f += 1,
        }
    }
}

/// 课程成绩统计
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum CourseStatistics {
    /// 没有任何学生获得总评
    NoGradedStudents { total_records: i64 },
    Graded {
        total_records: i64,
        graded_records: i64,
        average: f64,
        min: f64,
        max: f64,
        distribution: GradeDistribution,
    },
}
