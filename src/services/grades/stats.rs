use super::GradeService;
use super::calc::classify;
use crate::errors::Result;
use crate::models::actor::Actor;
use crate::models::grades::entities::GradeRecord;
use crate::models::grades::responses::{CourseStatistics, GradeDistribution};
use crate::utils::round2;

/// 课程成绩统计
/// GET /courses/{id}/grades/statistics
///
/// 只读扫描，不加记录锁；与并发批量评分交错时读到中间状态是允许的。
pub async fn course_statistics(
    service: &GradeService,
    actor: &Actor,
    course_id: i64,
) -> Result<CourseStatistics> {
    let course = service.managed_course(actor, course_id).await?;
    let records = service
        .storage()
        .list_grade_records_by_course(course.id)
        .await?;
    Ok(summarize(&records))
}

/// 汇总一组成绩记录
pub fn summarize(records: &[GradeRecord]) -> CourseStatistics {
    let total_records = records.len() as i64;
    let graded: Vec<f64> = records.iter().filter_map(|r| r.overall_grade).collect();

    if graded.is_empty() {
        return CourseStatistics::NoGradedStudents { total_records };
    }

    let mut distribution = GradeDistribution::default();
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &overall in &graded {
        distribution.record(classify(overall));
        sum += overall;
        min = min.min(overall);
        max = max.max(overall);
    }

    CourseStatistics::Graded {
        total_records,
        graded_records: graded.len() as i64,
        average: round2(sum / graded.len() as f64),
        min: round2(min),
        max: round2(max),
        distribution,
    }
}
