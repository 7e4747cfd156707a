//! 成绩记录存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::assignment_grades::{
    ActiveModel as AssignmentGradeActiveModel, Column as AssignmentGradeColumn,
    Entity as AssignmentGrades, Model as AssignmentGradeModel,
};
use crate::entity::grade_records::{ActiveModel, Column, Entity as GradeRecords, Model};
use crate::entity::submissions::ActiveModel as SubmissionActiveModel;
use crate::errors::{GradebookError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, grades::entities::GradeRecord,
    submissions::entities::Submission,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::warn;

/// 批量读取成绩项，按记录分组并保持 position 顺序
async fn load_entries<C: ConnectionTrait>(
    db: &C,
    record_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<AssignmentGradeModel>>> {
    if record_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = AssignmentGrades::find()
        .filter(AssignmentGradeColumn::GradeRecordId.is_in(record_ids))
        .order_by_asc(AssignmentGradeColumn::GradeRecordId)
        .order_by_asc(AssignmentGradeColumn::Position)
        .all(db)
        .await
        .map_err(|e| GradebookError::database_operation(format!("查询成绩项失败: {e}")))?;

    let mut grouped: HashMap<i64, Vec<AssignmentGradeModel>> = HashMap::new();
    for row in rows {
        grouped.entry(row.grade_record_id).or_default().push(row);
    }
    Ok(grouped)
}

/// 为记录模型附加成绩项
async fn assemble<C: ConnectionTrait>(db: &C, models: Vec<Model>) -> Result<Vec<GradeRecord>> {
    let mut entries = load_entries(db, models.iter().map(|m| m.id).collect()).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let record_entries = entries.remove(&m.id).unwrap_or_default();
            m.into_grade_record(record_entries)
        })
        .collect())
}

fn submission_active_model(submission: &Submission) -> Result<SubmissionActiveModel> {
    let rubric_scores = submission
        .rubric_scores
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    Ok(SubmissionActiveModel {
        id: Set(submission.id),
        assignment_id: Set(submission.assignment_id),
        student_id: Set(submission.student_id),
        points: Set(submission.points),
        feedback: Set(submission.feedback.clone()),
        comments: Set(submission.comments.clone()),
        rubric_scores: Set(rubric_scores),
        status: Set(submission.status.to_string()),
        grader_id: Set(submission.grader_id),
        graded_at: Set(submission.graded_at.map(|dt| dt.timestamp())),
        submitted_at: Set(submission.submitted_at.timestamp()),
    })
}

impl SeaOrmStorage {
    /// 查找 (学生, 课程) 的成绩记录
    pub async fn find_grade_record_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<GradeRecord>> {
        let model = GradeRecords::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询成绩记录失败: {e}")))?;

        match model {
            Some(model) => Ok(assemble(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 课程下全部成绩记录
    pub async fn list_grade_records_by_course_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<GradeRecord>> {
        let models = GradeRecords::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询课程成绩失败: {e}")))?;

        assemble(&self.db, models).await
    }

    /// 分页列出课程成绩记录
    pub async fn list_grade_records_with_pagination_impl(
        &self,
        course_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<GradeRecord>> {
        let size = size.max(1);
        // 偏移量以 i64 传给数据库
        let page = page.clamp(1, i64::MAX as u64 / size);

        let paginator = GradeRecords::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询成绩记录总数失败: {e}")))?;

        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询成绩记录列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: assemble(&self.db, models).await?,
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    /// 学生在所有课程中的成绩记录
    pub async fn list_grade_records_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<GradeRecord>> {
        let models = GradeRecords::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::CourseId)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询学生成绩失败: {e}")))?;

        assemble(&self.db, models).await
    }

    /// 在同一事务中写入成绩记录（必要时创建）、成绩项与提交，任一步失败则全部回滚
    pub async fn commit_grade_impl(
        &self,
        submission: Option<&Submission>,
        record: &GradeRecord,
    ) -> Result<GradeRecord> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradebookError::database_operation(format!("开启事务失败: {e}")))?;

        let record_id = match write_grade(&txn, submission, record).await {
            Ok(id) => id,
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("回滚成绩事务失败: {}", rollback_err);
                }
                return Err(e);
            }
        };

        txn.commit()
            .await
            .map_err(|e| GradebookError::database_operation(format!("提交事务失败: {e}")))?;

        let mut saved = record.clone();
        saved.id = record_id;
        Ok(saved)
    }
}

/// 事务内的写入步骤，返回成绩记录 ID
async fn write_grade<C: ConnectionTrait>(
    txn: &C,
    submission: Option<&Submission>,
    record: &GradeRecord,
) -> Result<i64> {
    let existing = GradeRecords::find()
        .filter(Column::StudentId.eq(record.student_id))
        .filter(Column::CourseId.eq(record.course_id))
        .one(txn)
        .await
        .map_err(|e| GradebookError::database_operation(format!("查询成绩记录失败: {e}")))?;

    let mut model = ActiveModel {
        student_id: Set(record.student_id),
        course_id: Set(record.course_id),
        overall_grade: Set(record.overall_grade),
        letter_grade: Set(record.letter_grade.map(|l| l.to_string())),
        updated_at: Set(record.updated_at.timestamp()),
        ..Default::default()
    };

    let record_id = match existing {
        Some(existing) => {
            model.id = Set(existing.id);
            model
                .update(txn)
                .await
                .map_err(|e| GradebookError::database_operation(format!("更新成绩记录失败: {e}")))?
                .id
        }
        None => {
            model
                .insert(txn)
                .await
                .map_err(|e| GradebookError::database_operation(format!("创建成绩记录失败: {e}")))?
                .id
        }
    };

    // 成绩项整体替换，position 保留原有顺序
    AssignmentGrades::delete_many()
        .filter(AssignmentGradeColumn::GradeRecordId.eq(record_id))
        .exec(txn)
        .await
        .map_err(|e| GradebookError::database_operation(format!("清理成绩项失败: {e}")))?;

    if !record.entries.is_empty() {
        let rows = record
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| AssignmentGradeActiveModel {
                grade_record_id: Set(record_id),
                assignment_id: Set(entry.assignment_id),
                points: Set(entry.points),
                max_points: Set(entry.max_points),
                position: Set(position as i32),
                updated_at: Set(entry.updated_at.timestamp()),
                ..Default::default()
            });

        AssignmentGrades::insert_many(rows)
            .exec(txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("写入成绩项失败: {e}")))?;
    }

    if let Some(submission) = submission {
        submission_active_model(submission)?
            .update(txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("更新提交失败: {e}")))?;
    }

    Ok(record_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::entity::{assignments, courses, submissions, users};
    use crate::models::grades::entities::LetterGrade;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::services::grades::calc::refresh_aggregate;
    use crate::services::grades::fixtures::submission;
    use chrono::Utc;

    const INSTRUCTOR: i64 = 1;
    const ALICE: i64 = 100;
    const BOB: i64 = 101;
    const COURSE: i64 = 10;
    const HOMEWORK: i64 = 1000;
    const QUIZ: i64 = 1001;
    const ALICE_HOMEWORK: i64 = 5000;

    async fn seeded_storage() -> SeaOrmStorage {
        // 内存库的每个连接都是独立数据库，连接池只保留一个连接
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        };
        let storage = SeaOrmStorage::new_async(&config.url, &config).await.unwrap();
        let db = &storage.db;
        let now = Utc::now().timestamp();

        for (id, username, role) in [
            (INSTRUCTOR, "t.lin", "instructor"),
            (ALICE, "s2024001", "student"),
            (BOB, "s2024002", "student"),
        ] {
            users::ActiveModel {
                id: Set(id),
                username: Set(username.to_string()),
                display_name: Set(None),
                role: Set(role.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await
            .unwrap();
        }

        courses::ActiveModel {
            id: Set(COURSE),
            code: Set("CS101".to_string()),
            title: Set("Intro to Programming".to_string()),
            instructor_id: Set(INSTRUCTOR),
            credits: Set(3.0),
            created_at: Set(now),
        }
        .insert(db)
        .await
        .unwrap();

        for (id, title, max_points) in [(HOMEWORK, "Homework 1", 100.0), (QUIZ, "Quiz 1", 50.0)] {
            assignments::ActiveModel {
                id: Set(id),
                course_id: Set(COURSE),
                title: Set(title.to_string()),
                max_points: Set(max_points),
                category: Set("homework".to_string()),
                created_at: Set(now),
            }
            .insert(db)
            .await
            .unwrap();
        }

        submissions::ActiveModel {
            id: Set(ALICE_HOMEWORK),
            assignment_id: Set(HOMEWORK),
            student_id: Set(ALICE),
            points: Set(None),
            feedback: Set(None),
            comments: Set(None),
            rubric_scores: Set(None),
            status: Set("submitted".to_string()),
            grader_id: Set(None),
            graded_at: Set(None),
            submitted_at: Set(now - 3600),
        }
        .insert(db)
        .await
        .unwrap();

        storage
    }

    /// Alice：先测验 40/50，再作业 85/100，作业提交同时标记为已评分
    async fn grade_alice(storage: &SeaOrmStorage) -> GradeRecord {
        let now = Utc::now();
        let mut record = GradeRecord::draft(ALICE, COURSE, now);
        record.upsert_entry(QUIZ, Some(40.0), 50.0, now);
        record.upsert_entry(HOMEWORK, Some(85.0), 100.0, now);
        refresh_aggregate(&mut record, now);

        let mut graded = storage
            .get_submission_by_id_impl(ALICE_HOMEWORK)
            .await
            .unwrap()
            .unwrap();
        graded.points = Some(85.0);
        graded.status = SubmissionStatus::Graded;
        graded.grader_id = Some(INSTRUCTOR);
        graded.graded_at = Some(now);

        storage
            .commit_grade_impl(Some(&graded), &record)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_commit_creates_record_with_ordered_entries() {
        let storage = seeded_storage().await;
        assert!(
            storage
                .find_grade_record_impl(ALICE, COURSE)
                .await
                .unwrap()
                .is_none()
        );

        let saved = grade_alice(&storage).await;
        assert!(saved.id > 0);

        let loaded = storage
            .find_grade_record_impl(ALICE, COURSE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, saved.id);
        let order: Vec<i64> = loaded.entries.iter().map(|e| e.assignment_id).collect();
        assert_eq!(order, vec![QUIZ, HOMEWORK]);
        assert_eq!(loaded.letter_grade, Some(LetterGrade::B));
        assert_eq!(loaded.overall_grade, saved.overall_grade);
        assert_eq!(loaded.updated_at.timestamp(), saved.updated_at.timestamp());

        let submission = storage
            .get_submission_by_id_impl(ALICE_HOMEWORK)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.status, SubmissionStatus::Graded);
        assert_eq!(submission.points, Some(85.0));
        assert_eq!(submission.grader_id, Some(INSTRUCTOR));
    }

    #[tokio::test]
    async fn test_regrade_updates_the_same_record_in_place() {
        let storage = seeded_storage().await;
        let first = grade_alice(&storage).await;

        let now = Utc::now();
        let mut record = storage
            .find_grade_record_impl(ALICE, COURSE)
            .await
            .unwrap()
            .unwrap();
        record.upsert_entry(QUIZ, Some(50.0), 50.0, now);
        refresh_aggregate(&mut record, now);
        storage.commit_grade_impl(None, &record).await.unwrap();

        let records = storage.list_grade_records_by_course_impl(COURSE).await.unwrap();
        assert_eq!(records.len(), 1);
        let regraded = &records[0];
        assert_eq!(regraded.id, first.id);
        assert_eq!(regraded.entries.len(), 2);
        assert_eq!(regraded.entries[0].assignment_id, QUIZ);
        assert_eq!(regraded.entries[0].points, Some(50.0));
        assert_eq!(regraded.overall_grade, Some(90.0));
        assert_eq!(regraded.letter_grade, Some(LetterGrade::A));
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back_every_write() {
        let storage = seeded_storage().await;
        grade_alice(&storage).await;
        let missing = submission(9999, HOMEWORK, ALICE);

        // 已有记录：成绩项的改动随提交更新失败一起回滚
        let now = Utc::now();
        let mut record = storage
            .find_grade_record_impl(ALICE, COURSE)
            .await
            .unwrap()
            .unwrap();
        record.upsert_entry(HOMEWORK, Some(10.0), 100.0, now);
        refresh_aggregate(&mut record, now);
        let err = storage
            .commit_grade_impl(Some(&missing), &record)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");

        let unchanged = storage
            .find_grade_record_impl(ALICE, COURSE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.entry(HOMEWORK).unwrap().points, Some(85.0));
        assert_eq!(unchanged.letter_grade, Some(LetterGrade::B));

        // 新记录：创建也一起回滚
        let mut draft = GradeRecord::draft(BOB, COURSE, now);
        draft.upsert_entry(HOMEWORK, Some(70.0), 100.0, now);
        refresh_aggregate(&mut draft, now);
        storage
            .commit_grade_impl(Some(&missing), &draft)
            .await
            .unwrap_err();
        assert!(
            storage
                .find_grade_record_impl(BOB, COURSE)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_pagination_beyond_last_page() {
        let storage = seeded_storage().await;
        grade_alice(&storage).await;

        let first = storage
            .list_grade_records_with_pagination_impl(COURSE, 1, 20)
            .await
            .unwrap();
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.items[0].entries.len(), 2);

        let far = storage
            .list_grade_records_with_pagination_impl(COURSE, u64::MAX, 100)
            .await
            .unwrap();
        assert!(far.items.is_empty());
        assert_eq!(far.pagination.total, 1);
    }
}
