//! 总评计算
//!
//! 纯函数，不访问存储。每次成绩项变更后都必须调用 [`refresh_aggregate`]，
//! 总评与等级永远由服务端重新计算。

use chrono::{DateTime, Utc};

use crate::errors::{GradebookError, Result};
use crate::models::grades::entities::{AssignmentGrade, GradeRecord, LetterGrade};

/// 按固定阈值划分等级，每个阈值包含下界
pub fn classify(overall: f64) -> LetterGrade {
    if overall >= 90.0 {
        LetterGrade::A
    } else if overall >= 80.0 {
        LetterGrade::B
    } else if overall >= 70.0 {
        LetterGrade::C
    } else if overall >= 60.0 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

/// 根据成绩项计算总评百分比
///
/// 只统计已给分的成绩项；没有任何已给分项时返回 `None`，
/// 满分合计为 0 时返回 0，不做除零。
pub fn recalculate(entries: &[AssignmentGrade]) -> Option<f64> {
    let mut earned = 0.0;
    let mut possible = 0.0;
    let mut graded = 0usize;

    for entry in entries {
        if let Some(points) = entry.points {
            earned += points;
            possible += entry.max_points;
            graded += 1;
        }
    }

    if graded == 0 {
        return None;
    }
    if possible <= 0.0 {
        return Some(0.0);
    }
    Some(100.0 * earned / possible)
}

/// 重新计算记录的总评与等级
pub fn refresh_aggregate(record: &mut GradeRecord, now: DateTime<Utc>) {
    let overall = recalculate(&record.entries);
    record.overall_grade = overall;
    record.letter_grade = overall.map(classify);
    record.updated_at = now;
}

/// 校验分数：必须是有限数且位于 [0, max_points]
pub fn validate_points(points: f64, max_points: f64) -> Result<()> {
    if !points.is_finite() {
        return Err(GradebookError::validation("分数必须是有效数字"));
    }
    if points < 0.0 {
        return Err(GradebookError::validation(format!(
            "分数不能为负数: {points}"
        )));
    }
    if points > max_points {
        return Err(GradebookError::validation(format!(
            "分数 {points} 超过作业满分 {max_points}"
        )));
    }
    Ok(())
}

/// 学分加权 GPA
///
/// 只统计已有总评的课程；未知或缺失的等级按 0 绩点计；学分合计为 0 时返回 0。
pub fn compute_gpa<I>(courses: I) -> f64
where
    I: IntoIterator<Item = (Option<f64>, Option<LetterGrade>, f64)>,
{
    let mut weighted = 0.0;
    let mut credits_total = 0.0;

    for (overall, letter, credits) in courses {
        if overall.is_none() {
            continue;
        }
        let grade_points = letter.map(LetterGrade::grade_points).unwrap_or(0.0);
        weighted += grade_points * credits;
        credits_total += credits;
    }

    if credits_total <= 0.0 {
        0.0
    } else {
        weighted / credits_total
    }
}
