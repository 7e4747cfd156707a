use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 提交状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionStatus {
    Submitted, // 已提交，待评分
    Graded,    // 已评分
}

impl SubmissionStatus {
    pub const SUBMITTED: &'static str = "submitted";
    pub const GRADED: &'static str = "graded";
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Submitted => write!(f, "{}", SubmissionStatus::SUBMITTED),
            SubmissionStatus::Graded => write!(f, "{}", SubmissionStatus::GRADED),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SubmissionStatus::SUBMITTED => Ok(SubmissionStatus::Submitted),
            SubmissionStatus::GRADED => Ok(SubmissionStatus::Graded),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

/// 评分细则中的单项得分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct RubricScore {
    pub criterion: String,
    pub points: f64,
    pub comment: Option<String>,
}

// 提交实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub points: Option<f64>,
    pub feedback: Option<String>,
    pub comments: Option<String>,
    pub rubric_scores: Option<Vec<RubricScore>>,
    pub status: SubmissionStatus,
    pub grader_id: Option<i64>,
    pub graded_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
}

/// 一次评分动作写入提交的内容
#[derive(Debug, Clone, Default)]
pub struct GradeMark {
    pub points: f64,
    pub feedback: Option<String>,
    pub comments: Option<String>,
    pub rubric_scores: Option<Vec<RubricScore>>,
}

impl Submission {
    /// 写入评分结果并标记为已评分
    pub fn mark_graded(&mut self, mark: GradeMark, grader_id: i64, now: DateTime<Utc>) {
        self.points = Some(mark.points);
        self.feedback = mark.feedback;
        self.comments = mark.comments;
        self.rubric_scores = mark.rubric_scores;
        self.status = SubmissionStatus::Graded;
        self.grader_id = Some(grader_id);
        self.graded_at = Some(now);
    }

    /// 仅同步分数（成绩单元格编辑），保留已有评语
    pub fn mirror_points(&mut self, points: f64, grader_id: i64, now: DateTime<Utc>) {
        self.points = Some(points);
        self.status = SubmissionStatus::Graded;
        self.grader_id = Some(grader_id);
        self.graded_at = Some(now);
    }
}
