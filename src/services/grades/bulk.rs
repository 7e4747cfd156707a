use futures_util::stream::{self, StreamExt};
use tracing::{error, info, warn};

use super::GradeService;
use super::grade::apply_grade;
use crate::errors::{ErrorKind, GradebookError, Result};
use crate::models::actor::Actor;
use crate::models::assignments::entities::Assignment;
use crate::models::grades::requests::{BulkGradeItem, BulkGradeRequest};
use crate::models::grades::responses::{BulkGradeFailure, BulkGradeResponse};
use crate::models::submissions::entities::GradeMark;

/// 批量评分
/// POST /assignments/{id}/bulk-grade
///
/// 作业与权限只检查一次；之后每个条目独立处理，单个条目失败只记录在结果中，
/// 不影响其它条目。
pub async fn bulk_grade(
    service: &GradeService,
    actor: &Actor,
    assignment_id: i64,
    req: BulkGradeRequest,
) -> Result<BulkGradeResponse> {
    let config = service.config();
    if req.items.is_empty() {
        return Err(GradebookError::validation("批量评分条目不能为空"));
    }
    if req.items.len() > config.bulk_max_items {
        return Err(GradebookError::validation(format!(
            "批量评分条目过多: {} (上限 {})",
            req.items.len(),
            config.bulk_max_items
        )));
    }

    let assignment = service
        .storage()
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| GradebookError::not_found(format!("作业 {assignment_id} 不存在")))?;

    service.managed_course(actor, assignment.course_id).await?;

    let total = req.items.len();
    let assignment = &assignment;
    let outcomes: Vec<(i64, Result<()>)> = stream::iter(req.items)
        .map(|item| async move {
            let submission_id = item.submission_id;
            let outcome = grade_item(service, actor, assignment, item).await;
            (submission_id, outcome)
        })
        .buffer_unordered(config.bulk_concurrency.max(1))
        .collect()
        .await;

    let mut successful_ids = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (submission_id, outcome) in outcomes {
        match outcome {
            Ok(()) => successful_ids.push(submission_id),
            Err(e) => {
                if e.kind() == ErrorKind::Internal {
                    error!("Bulk grading item {} failed: {}", submission_id, e);
                } else {
                    warn!("Bulk grading item {} rejected: {}", submission_id, e);
                }
                failures.push(BulkGradeFailure {
                    submission_id,
                    code: e.code().to_string(),
                    error: e.message().to_string(),
                });
            }
        }
    }

    info!(
        "Bulk grading for assignment {} by user {}: {} succeeded, {} failed",
        assignment.id,
        actor.user_id,
        successful_ids.len(),
        failures.len()
    );

    Ok(BulkGradeResponse {
        assignment_id: assignment.id,
        success_count: successful_ids.len(),
        failure_count: failures.len(),
        successful_ids,
        failures,
    })
}

async fn grade_item(
    service: &GradeService,
    actor: &Actor,
    assignment: &Assignment,
    item: BulkGradeItem,
) -> Result<()> {
    let submission = service
        .storage()
        .get_submission_by_id(item.submission_id)
        .await?
        .ok_or_else(|| {
            GradebookError::not_found(format!("提交 {} 不存在", item.submission_id))
        })?;

    let mark = GradeMark {
        points: item.points,
        feedback: item.feedback,
        comments: item.comments,
        rubric_scores: None,
    };
    apply_grade(service, actor, submission, assignment, mark)
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use crate::config::GradingConfig;
    use crate::errors::ErrorKind;
    use crate::models::grades::requests::{BulkGradeItem, BulkGradeRequest};
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::storage::Storage;

    fn item(submission_id: i64, points: f64) -> BulkGradeItem {
        BulkGradeItem {
            submission_id,
            points,
            feedback: None,
            comments: None,
        }
    }

    #[tokio::test]
    async fn test_bulk_isolates_invalid_item() {
        let fx = fixture();
        let req = BulkGradeRequest {
            items: vec![
                item(SUB_A_HOMEWORK, 90.0),
                item(SUB_B_HOMEWORK, 120.0),
                item(SUB_C_HOMEWORK, 65.0),
            ],
        };

        let result = fx
            .service
            .bulk_grade(&instructor(), HOMEWORK_1, req)
            .await
            .unwrap();

        let mut ids = result.successful_ids.clone();
        ids.sort_unstable();
        assert_eq!(ids, vec![SUB_A_HOMEWORK, SUB_C_HOMEWORK]);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.failures[0].submission_id, SUB_B_HOMEWORK);
        assert_eq!(result.failures[0].code, "E004");

        for (id, graded) in [
            (SUB_A_HOMEWORK, true),
            (SUB_B_HOMEWORK, false),
            (SUB_C_HOMEWORK, true),
        ] {
            let submission = fx.storage.get_submission_by_id(id).await.unwrap().unwrap();
            assert_eq!(submission.status == SubmissionStatus::Graded, graded);
        }
        assert!(
            fx.storage
                .find_grade_record(STUDENT_B, COURSE_ID)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_bulk_records_missing_and_foreign_submissions() {
        let fx = fixture();
        let req = BulkGradeRequest {
            items: vec![
                item(9999, 10.0),
                item(SUB_A_QUIZ, 10.0),
                item(SUB_A_HOMEWORK, 70.0),
            ],
        };

        let result = fx
            .service
            .bulk_grade(&admin(), HOMEWORK_1, req)
            .await
            .unwrap();

        assert_eq!(result.successful_ids, vec![SUB_A_HOMEWORK]);
        let mut failed: Vec<i64> = result.failures.iter().map(|f| f.submission_id).collect();
        failed.sort_unstable();
        assert_eq!(failed, vec![SUB_A_QUIZ, 9999]);
        assert_eq!(result.success_count + result.failure_count, 3);
    }

    #[tokio::test]
    async fn test_bulk_batch_wide_checks() {
        let fx = fixture();

        let empty = fx
            .service
            .bulk_grade(&instructor(), HOMEWORK_1, BulkGradeRequest { items: vec![] })
            .await
            .unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::InvalidInput);

        let missing = fx
            .service
            .bulk_grade(
                &instructor(),
                4242,
                BulkGradeRequest {
                    items: vec![item(SUB_A_HOMEWORK, 1.0)],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let forbidden = fx
            .service
            .bulk_grade(
                &other_instructor(),
                HOMEWORK_1,
                BulkGradeRequest {
                    items: vec![item(SUB_A_HOMEWORK, 1.0)],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(forbidden.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_bulk_respects_item_limit() {
        let fx = fixture_with_config(GradingConfig {
            bulk_max_items: 2,
            ..GradingConfig::default()
        });
        let req = BulkGradeRequest {
            items: vec![
                item(SUB_A_HOMEWORK, 1.0),
                item(SUB_B_HOMEWORK, 1.0),
                item(SUB_C_HOMEWORK, 1.0),
            ],
        };

        let err = fx
            .service
            .bulk_grade(&instructor(), HOMEWORK_1, req)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bulk_and_single_grading_share_record_lock() {
        let fx = std::sync::Arc::new(fixture());

        let bulk = {
            let fx = fx.clone();
            tokio::spawn(async move {
                fx.service
                    .bulk_grade(
                        &instructor(),
                        HOMEWORK_1,
                        BulkGradeRequest {
                            items: vec![item(SUB_A_HOMEWORK, 100.0)],
                        },
                    )
                    .await
            })
        };
        let single = {
            let fx = fx.clone();
            tokio::spawn(async move {
                fx.service
                    .grade_submission(&instructor(), SUB_A_QUIZ, grade_req(0.0))
                    .await
            })
        };
        assert_eq!(bulk.await.unwrap().unwrap().success_count, 1);
        single.await.unwrap().unwrap();

        let record = fx
            .storage
            .find_grade_record(STUDENT_A, COURSE_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.entries.len(), 2);
        let overall = record.overall_grade.unwrap();
        assert!((overall - 100.0 * 100.0 / 150.0).abs() < 1e-9);
    }
}
