use chrono::Utc;
use tracing::info;

use super::GradeService;
use super::calc::{refresh_aggregate, validate_points};
use crate::errors::{GradebookError, Result};
use crate::models::actor::Actor;
use crate::models::assignments::entities::Assignment;
use crate::models::grades::entities::GradeRecord;
use crate::models::grades::requests::GradeSubmissionRequest;
use crate::models::grades::responses::GradeSubmissionResponse;
use crate::models::submissions::entities::{GradeMark, Submission};
use crate::utils::round2;

/// 为单个提交评分
/// POST /submissions/{id}/grade
pub async fn grade_submission(
    service: &GradeService,
    actor: &Actor,
    submission_id: i64,
    req: GradeSubmissionRequest,
) -> Result<GradeSubmissionResponse> {
    let storage = service.storage();

    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| GradebookError::not_found(format!("提交 {submission_id} 不存在")))?;

    let assignment = storage
        .get_assignment_by_id(submission.assignment_id)
        .await?
        .ok_or_else(|| {
            GradebookError::not_found(format!("作业 {} 不存在", submission.assignment_id))
        })?;

    service.managed_course(actor, assignment.course_id).await?;

    let mark = GradeMark {
        points: req.points,
        feedback: req.feedback,
        comments: req.comments,
        rubric_scores: req.rubric_scores,
    };
    let (submission, record) = apply_grade(service, actor, submission, &assignment, mark).await?;

    Ok(GradeSubmissionResponse {
        submission,
        overall_grade: record.overall_grade.map(round2),
        letter_grade: record.letter_grade,
    })
}

/// 评分的读-改-写流程，单个评分与批量评分共用
///
/// 调用前需完成权限检查。分数校验先于任何写入；
/// 成绩记录在记录锁内获取、更新并与提交一起提交。
pub(crate) async fn apply_grade(
    service: &GradeService,
    actor: &Actor,
    submission: Submission,
    assignment: &Assignment,
    mark: GradeMark,
) -> Result<(Submission, GradeRecord)> {
    if submission.assignment_id != assignment.id {
        return Err(GradebookError::validation(format!(
            "提交 {} 不属于作业 {}",
            submission.id, assignment.id
        )));
    }
    validate_points(mark.points, assignment.max_points)?;

    let storage = service.storage();
    let points = mark.points;
    let student_id = submission.student_id;
    let course_id = assignment.course_id;

    let _guard = service.locks().acquire(student_id, course_id).await;

    let mut record = storage
        .find_or_init_grade_record(student_id, course_id)
        .await?;

    let now = Utc::now();
    let mut submission = submission;
    submission.mark_graded(mark, actor.user_id, now);

    record.upsert_entry(assignment.id, Some(points), assignment.max_points, now);
    refresh_aggregate(&mut record, now);

    let record = storage.commit_grade(Some(&submission), &record).await?;

    info!(
        "Submission {} graded {} by user {}; course {} overall {:?} ({:?})",
        submission.id, points, actor.user_id, course_id, record.overall_grade, record.letter_grade
    );

    Ok((submission, record))
}
