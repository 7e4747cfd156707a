use tracing::warn;

use super::GradeService;
use super::calc::compute_gpa;
use crate::errors::{GradebookError, Result};
use crate::models::actor::Actor;
use crate::models::grades::responses::{GradebookCourseEntry, GradebookResponse};
use crate::utils::round2;

/// 学生跨课程成绩册与 GPA
/// GET /students/{id}/gradebook
pub async fn get_gradebook(
    service: &GradeService,
    actor: &Actor,
    student_id: i64,
) -> Result<GradebookResponse> {
    if !actor.can_view_student(student_id) {
        return Err(GradebookError::authorization(format!(
            "用户 {} 无权查看学生 {} 的成绩册",
            actor.user_id, student_id
        )));
    }

    let storage = service.storage();
    storage
        .get_user_by_id(student_id)
        .await?
        .ok_or_else(|| GradebookError::not_found(format!("学生 {student_id} 不存在")))?;

    let records = storage.list_grade_records_by_student(student_id).await?;

    let mut courses = Vec::with_capacity(records.len());
    for record in records {
        let Some(course) = storage.get_course_by_id(record.course_id).await? else {
            warn!(
                "Grade record {} references missing course {}",
                record.id, record.course_id
            );
            continue;
        };
        courses.push(GradebookCourseEntry {
            course_id: course.id,
            course_code: course.code,
            course_title: course.title,
            credits: course.credits,
            overall_grade: record.overall_grade.map(round2),
            letter_grade: record.letter_grade,
        });
    }

    let gpa = compute_gpa(
        courses
            .iter()
            .map(|c| (c.overall_grade, c.letter_grade, c.credits)),
    );

    Ok(GradebookResponse {
        student_id,
        courses,
        gpa: round2(gpa),
    })
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use crate::errors::ErrorKind;

    #[tokio::test]
    async fn test_gradebook_gpa_across_courses() {
        let fx = fixture();
        // CS101: 85/100 -> B (3 学分)；MA201: 19/20 -> A (4 学分)
        fx.service
            .grade_submission(&instructor(), SUB_A_HOMEWORK, grade_req(85.0))
            .await
            .unwrap();
        fx.service
            .grade_submission(&other_instructor(), SUB_A_OTHER, grade_req(19.0))
            .await
            .unwrap();

        let book = fx
            .service
            .get_gradebook(&student(STUDENT_A), STUDENT_A)
            .await
            .unwrap();

        assert_eq!(book.courses.len(), 2);
        assert_eq!(book.courses[0].course_code, "CS101");
        assert_eq!(book.courses[1].overall_grade, Some(95.0));
        // (3*3 + 4*4) / 7 = 3.571...
        assert_eq!(book.gpa, 3.57);
    }

    #[tokio::test]
    async fn test_gradebook_without_grades_has_zero_gpa() {
        let fx = fixture();
        let book = fx
            .service
            .get_gradebook(&admin(), STUDENT_B)
            .await
            .unwrap();
        assert!(book.courses.is_empty());
        assert_eq!(book.gpa, 0.0);
    }

    #[tokio::test]
    async fn test_gradebook_access() {
        let fx = fixture();

        let other_student = fx
            .service
            .get_gradebook(&student(STUDENT_B), STUDENT_A)
            .await
            .unwrap_err();
        assert_eq!(other_student.kind(), ErrorKind::Forbidden);

        let teacher = fx
            .service
            .get_gradebook(&instructor(), STUDENT_A)
            .await
            .unwrap_err();
        assert_eq!(teacher.kind(), ErrorKind::Forbidden);

        let missing = fx
            .service
            .get_gradebook(&admin(), 4040)
            .await
            .unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }
}
