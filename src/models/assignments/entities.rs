use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 作业类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum AssignmentCategory {
    Homework,
    Quiz,
    Exam,
    Project,
    Other,
}

impl std::fmt::Display for AssignmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentCategory::Homework => write!(f, "homework"),
            AssignmentCategory::Quiz => write!(f, "quiz"),
            AssignmentCategory::Exam => write!(f, "exam"),
            AssignmentCategory::Project => write!(f, "project"),
            AssignmentCategory::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for AssignmentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "homework" => Ok(AssignmentCategory::Homework),
            "quiz" => Ok(AssignmentCategory::Quiz),
            "exam" => Ok(AssignmentCategory::Exam),
            "project" => Ok(AssignmentCategory::Project),
            "other" => Ok(AssignmentCategory::Other),
            _ => Err(format!("Invalid assignment category: {s}")),
        }
    }
}

// 作业实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub max_points: f64,
    pub category: AssignmentCategory,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
