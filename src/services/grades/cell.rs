use chrono::Utc;
use tracing::info;

use super::GradeService;
use super::calc::{refresh_aggregate, validate_points};
use crate::errors::{GradebookError, Result};
use crate::models::actor::Actor;
use crate::models::grades::requests::UpdateGradeCellRequest;
use crate::models::grades::responses::GradeRecordResponse;

/// 编辑已有成绩记录中的单个作业成绩
/// PATCH /courses/{course_id}/grades/{student_id}/assignments/{assignment_id}
///
/// 新分数同步到该学生在此作业下的最新提交（如果存在）。
pub async fn update_grade_cell(
    service: &GradeService,
    actor: &Actor,
    course_id: i64,
    student_id: i64,
    assignment_id: i64,
    req: UpdateGradeCellRequest,
) -> Result<GradeRecordResponse> {
    let course = service.managed_course(actor, course_id).await?;
    let storage = service.storage();

    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| GradebookError::not_found(format!("作业 {assignment_id} 不存在")))?;
    if assignment.course_id != course.id {
        return Err(GradebookError::validation(format!(
            "作业 {} 不属于课程 {}",
            assignment.id, course.id
        )));
    }
    validate_points(req.points, assignment.max_points)?;

    let _guard = service.locks().acquire(student_id, course.id).await;

    let mut record = storage
        .find_grade_record(student_id, course.id)
        .await?
        .ok_or_else(|| {
            GradebookError::not_found(format!(
                "学生 {student_id} 在课程 {} 中没有成绩记录",
                course.id
            ))
        })?;

    let now = Utc::now();
    record.upsert_entry(assignment.id, Some(req.points), assignment.max_points, now);
    refresh_aggregate(&mut record, now);

    let submission = storage
        .get_latest_submission(assignment.id, student_id)
        .await?
        .map(|mut submission| {
            submission.mirror_points(req.points, actor.user_id, now);
            submission
        });

    let record = storage.commit_grade(submission.as_ref(), &record).await?;

    info!(
        "Grade cell updated: student {} assignment {} -> {} by user {}; overall {:?}",
        student_id, assignment.id, req.points, actor.user_id, record.overall_grade
    );

    Ok(GradeRecordResponse::from(&record))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use crate::errors::ErrorKind;
    use crate::models::grades::entities::LetterGrade;
    use crate::models::grades::requests::UpdateGradeCellRequest;
    use crate::storage::Storage;

    fn cell(points: f64) -> UpdateGradeCellRequest {
        UpdateGradeCellRequest { points }
    }

    #[tokio::test]
    async fn test_cell_edit_recalculates_and_mirrors_submission() {
        let fx = fixture();
        fx.service
            .grade_submission(&instructor(), SUB_A_HOMEWORK, grade_req(85.0))
            .await
            .unwrap();

        let updated = fx
            .service
            .update_grade_cell(&instructor(), COURSE_ID, STUDENT_A, QUIZ_1, cell(20.0))
            .await
            .unwrap();

        // (85 + 20) / 150
        assert_eq!(updated.overall_grade, Some(70.0));
        assert_eq!(updated.letter_grade, Some(LetterGrade::C));

        let quiz = fx
            .storage
            .get_submission_by_id(SUB_A_QUIZ)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quiz.points, Some(20.0));
        assert_eq!(quiz.grader_id, Some(INSTRUCTOR_ID));
        // 评语保持不变
        let homework = fx
            .storage
            .get_submission_by_id(SUB_A_HOMEWORK)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(homework.feedback.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_cell_edit_requires_existing_record() {
        let fx = fixture();
        let err = fx
            .service
            .update_grade_cell(&instructor(), COURSE_ID, STUDENT_B, HOMEWORK_1, cell(50.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(
            fx.storage
                .find_grade_record(STUDENT_B, COURSE_ID)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cell_edit_validation() {
        let fx = fixture();
        fx.service
            .grade_submission(&instructor(), SUB_A_HOMEWORK, grade_req(85.0))
            .await
            .unwrap();
        let before = fx.storage.find_grade_record(STUDENT_A, COURSE_ID).await.unwrap();

        let over = fx
            .service
            .update_grade_cell(&instructor(), COURSE_ID, STUDENT_A, QUIZ_1, cell(51.0))
            .await
            .unwrap_err();
        assert_eq!(over.kind(), ErrorKind::InvalidInput);

        let foreign = fx
            .service
            .update_grade_cell(&admin(), COURSE_ID, STUDENT_A, OTHER_ASSIGNMENT, cell(1.0))
            .await
            .unwrap_err();
        assert_eq!(foreign.kind(), ErrorKind::InvalidInput);

        let forbidden = fx
            .service
            .update_grade_cell(&other_instructor(), COURSE_ID, STUDENT_A, QUIZ_1, cell(1.0))
            .await
            .unwrap_err();
        assert_eq!(forbidden.kind(), ErrorKind::Forbidden);

        assert_eq!(
            fx.storage.find_grade_record(STUDENT_A, COURSE_ID).await.unwrap(),
            before
        );
    }
}
