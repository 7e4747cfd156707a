use super::GradeService;
use crate::errors::{GradebookError, Result};
use crate::models::PaginationQuery;
use crate::models::actor::Actor;
use crate::models::grades::responses::{CourseGradesResponse, GradeRecordResponse};
use crate::models::users::entities::UserRole;

/// 查询课程成绩
/// GET /courses/{id}/grades
///
/// 任课教师与管理员得到分页列表；学生只得到自己的记录（可能为空）。
pub async fn list_course_grades(
    service: &GradeService,
    actor: &Actor,
    course_id: i64,
    query: PaginationQuery,
) -> Result<CourseGradesResponse> {
    let storage = service.storage();

    let course = storage
        .get_course_by_id(course_id)
        .await?
        .ok_or_else(|| GradebookError::not_found(format!("课程 {course_id} 不存在")))?;

    if actor.can_manage_course(course.id) {
        let config = service.config();
        let (page, size) = query.normalize(config.default_page_size, config.max_page_size);
        let listing = storage
            .list_grade_records_with_pagination(course.id, page, size)
            .await?;

        return Ok(CourseGradesResponse::Listing {
            items: listing.items.iter().map(GradeRecordResponse::from).collect(),
            pagination: listing.pagination,
        });
    }

    if actor.role == UserRole::Student {
        let record = storage.find_grade_record(actor.user_id, course.id).await?;
        return Ok(CourseGradesResponse::Own {
            record: record.as_ref().map(GradeRecordResponse::from),
        });
    }

    Err(GradebookError::authorization(format!(
        "用户 {} 无权查看课程 {} 的成绩",
        actor.user_id, course.id
    )))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use crate::errors::ErrorKind;
    use crate::models::PaginationQuery;
    use crate::models::grades::responses::CourseGradesResponse;

    async fn grade_all(fx: &Fixture) {
        let actor = instructor();
        for (id, points) in [
            (SUB_A_HOMEWORK, 88.0),
            (SUB_B_HOMEWORK, 61.0),
            (SUB_C_HOMEWORK, 93.456),
        ] {
            fx.service
                .grade_submission(&actor, id, grade_req(points))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_staff_receive_paginated_listing() {
        let fx = fixture();
        grade_all(&fx).await;

        let page = fx
            .service
            .list_course_grades(&instructor(), COURSE_ID, PaginationQuery::new(2, 2))
            .await
            .unwrap();

        match page {
            CourseGradesResponse::Listing { items, pagination } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].student_id, STUDENT_C);
                assert_eq!(items[0].overall_grade, Some(93.46));
                assert_eq!(pagination.total, 3);
                assert_eq!(pagination.total_pages, 2);
                assert_eq!(pagination.page, 2);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let fx = fixture();
        grade_all(&fx).await;

        let page = fx
            .service
            .list_course_grades(&instructor(), COURSE_ID, PaginationQuery::new(i64::MAX, 100))
            .await
            .unwrap();

        match page {
            CourseGradesResponse::Listing { items, pagination } => {
                assert!(items.is_empty());
                assert_eq!(pagination.total, 3);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_student_receives_only_own_record() {
        let fx = fixture();
        grade_all(&fx).await;

        let own = fx
            .service
            .list_course_grades(&student(STUDENT_B), COURSE_ID, PaginationQuery::default())
            .await
            .unwrap();
        match own {
            CourseGradesResponse::Own { record: Some(record) } => {
                assert_eq!(record.student_id, STUDENT_B);
                assert_eq!(record.overall_grade, Some(61.0));
            }
            other => panic!("unexpected response: {other:?}"),
        }

        let none = fx
            .service
            .list_course_grades(&student(STUDENT_A), OTHER_COURSE_ID, PaginationQuery::default())
            .await
            .unwrap();
        assert!(matches!(none, CourseGradesResponse::Own { record: None }));
    }

    #[tokio::test]
    async fn test_foreign_instructor_and_missing_course() {
        let fx = fixture();

        let forbidden = fx
            .service
            .list_course_grades(&other_instructor(), COURSE_ID, PaginationQuery::default())
            .await
            .unwrap_err();
        assert_eq!(forbidden.kind(), ErrorKind::Forbidden);

        let missing = fx
            .service
            .list_course_grades(&admin(), 77, PaginationQuery::default())
            .await
            .unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }
}
