use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 等级成绩
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    /// GPA 绩点
    pub fn grade_points(self) -> f64 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::B => 3.0,
            LetterGrade::C => 2.0,
            LetterGrade::D => 1.0,
            LetterGrade::F => 0.0,
        }
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for LetterGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(LetterGrade::A),
            "B" => Ok(LetterGrade::B),
            "C" => Ok(LetterGrade::C),
            "D" => Ok(LetterGrade::D),
            "F" => Ok(LetterGrade::F),
            _ => Err(format!("Invalid letter grade: {s}")),
        }
    }
}

/// 成绩记录中的单项作业成绩
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct AssignmentGrade {
    pub assignment_id: i64,
    pub points: Option<f64>,
    /// 评分时作业的满分
    pub max_points: f64,
    pub updated_at: DateTime<Utc>,
}

/// 学生在某门课程中的成绩记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeRecord {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub entries: Vec<AssignmentGrade>,
    pub overall_grade: Option<f64>,
    pub letter_grade: Option<LetterGrade>,
    pub updated_at: DateTime<Utc>,
}

impl GradeRecord {
    /// 尚无任何成绩项的新记录
    pub fn empty(id: i64, student_id: i64, course_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            student_id,
            course_id,
            entries: Vec::new(),
            overall_grade: None,
            letter_grade: None,
            updated_at: now,
        }
    }

    /// 尚未持久化的记录，id 为 0，首次 `commit_grade` 时分配
    pub fn draft(student_id: i64, course_id: i64, now: DateTime<Utc>) -> Self {
        Self::empty(0, student_id, course_id, now)
    }

    pub fn entry(&self, assignment_id: i64) -> Option<&AssignmentGrade> {
        self.entries.iter().find(|e| e.assignment_id == assignment_id)
    }

    /// 插入或原地替换某个作业的成绩项
    pub fn upsert_entry(
        &mut self,
        assignment_id: i64,
        points: Option<f64>,
        max_points: f64,
        now: DateTime<Utc>,
    ) {
        let entry = AssignmentGrade {
            assignment_id,
            points,
            max_points,
            updated_at: now,
        };
        match self
            .entries
            .iter_mut()
            .find(|e| e.assignment_id == assignment_id)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_entry_replaces_in_place() {
        let now = Utc::now();
        let mut record = GradeRecord::empty(1, 100, 10, now);
        record.upsert_entry(1000, Some(40.0), 100.0, now);
        record.upsert_entry(1001, Some(10.0), 50.0, now);
        record.upsert_entry(1000, Some(85.0), 100.0, now);

        assert_eq!(record.entries.len(), 2);
        assert_eq!(record.entries[0].assignment_id, 1000);
        assert_eq!(record.entries[0].points, Some(85.0));
        assert_eq!(record.entry(1001).and_then(|e| e.points), Some(10.0));
    }

    #[test]
    fn test_letter_grade_points() {
        assert_eq!(LetterGrade::A.grade_points(), 4.0);
        assert_eq!(LetterGrade::F.grade_points(), 0.0);
        assert_eq!("C".parse::<LetterGrade>(), Ok(LetterGrade::C));
        assert!("E".parse::<LetterGrade>().is_err());
    }
}
