//! 进程内存储
//!
//! 数据只保存在内存中，进程重启后丢失。用于开发环境（`memory://`）与服务层测试。
//! 所有表共用一把锁，因此 `commit_grade` 的多表写入天然是原子的。

use std::collections::HashMap;
use std::sync::RwLock;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::errors::{GradebookError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, assignments::entities::Assignment,
    courses::entities::Course, grades::entities::GradeRecord, submissions::entities::Submission,
    users::entities::User,
};
use crate::storage::Storage;

#[derive(Default)]
struct MemoryState {
    users: HashMap<i64, User>,
    courses: HashMap<i64, Course>,
    assignments: HashMap<i64, Assignment>,
    submissions: HashMap<i64, Submission>,
    grade_records: HashMap<i64, GradeRecord>,
    next_record_id: i64,
}

impl MemoryState {
    fn record_by_key(&self, student_id: i64, course_id: i64) -> Option<&GradeRecord> {
        self.grade_records
            .values()
            .find(|r| r.student_id == student_id && r.course_id == course_id)
    }

    fn records_sorted<F>(&self, filter: F) -> Vec<GradeRecord>
    where
        F: Fn(&GradeRecord) -> bool,
    {
        let mut records: Vec<GradeRecord> = self
            .grade_records
            .values()
            .filter(|r| filter(r))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.id);
        records
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
    #[cfg(test)]
    fail_commits: AtomicBool,
}

fn lock_error<E: std::fmt::Display>(e: E) -> GradebookError {
    GradebookError::internal(format!("Lock error: {e}"))
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) -> Result<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .users
            .insert(user.id, user);
        Ok(())
    }

    pub fn insert_course(&self, course: Course) -> Result<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .courses
            .insert(course.id, course);
        Ok(())
    }

    pub fn insert_assignment(&self, assignment: Assignment) -> Result<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .assignments
            .insert(assignment.id, assignment);
        Ok(())
    }

    pub fn insert_submission(&self, submission: Submission) -> Result<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .submissions
            .insert(submission.id, submission);
        Ok(())
    }

    /// 让后续的 commit_grade 全部失败，用于验证失败时不产生部分写入
    #[cfg(test)]
    pub(crate) fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn commits_fail(&self) -> bool {
        self.fail_commits.load(Ordering::SeqCst)
    }

    #[cfg(not(test))]
    fn commits_fail(&self) -> bool {
        false
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.state.read().map_err(lock_error)?.users.get(&id).cloned())
    }

    async fn list_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut users: Vec<User> = ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect();
        users.sort_by_key(|u| u.id);
        users.dedup_by_key(|u| u.id);
        Ok(users)
    }

    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>> {
        Ok(self
            .state
            .read()
            .map_err(lock_error)?
            .courses
            .get(&course_id)
            .cloned())
    }

    async fn list_course_ids_by_instructor(&self, instructor_id: i64) -> Result<Vec<i64>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut ids: Vec<i64> = state
            .courses
            .values()
            .filter(|c| c.instructor_id == instructor_id)
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        Ok(self
            .state
            .read()
            .map_err(lock_error)?
            .assignments
            .get(&assignment_id)
            .cloned())
    }

    async fn list_assignments_by_course(&self, course_id: i64) -> Result<Vec<Assignment>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut assignments: Vec<Assignment> = state
            .assignments
            .values()
            .filter(|a| a.course_id == course_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| a.id);
        Ok(assignments)
    }

    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>> {
        Ok(self
            .state
            .read()
            .map_err(lock_error)?
            .submissions
            .get(&submission_id)
            .cloned())
    }

    async fn get_latest_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .submissions
            .values()
            .filter(|s| s.assignment_id == assignment_id && s.student_id == student_id)
            .max_by_key(|s| (s.submitted_at, s.id))
            .cloned())
    }

    async fn find_grade_record(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<GradeRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.record_by_key(student_id, course_id).cloned())
    }

    async fn list_grade_records_by_course(&self, course_id: i64) -> Result<Vec<GradeRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.records_sorted(|r| r.course_id == course_id))
    }

    async fn list_grade_records_with_pagination(
        &self,
        course_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<GradeRecord>> {
        let page = page.max(1);
        let size = size.max(1);
        let records = {
            let state = self.state.read().map_err(lock_error)?;
            state.records_sorted(|r| r.course_id == course_id)
        };
        let total = records.len() as u64;
        let offset = usize::try_from((page - 1).saturating_mul(size)).unwrap_or(usize::MAX);
        let items = records
            .into_iter()
            .skip(offset)
            .take(usize::try_from(size).unwrap_or(usize::MAX))
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    async fn list_grade_records_by_student(&self, student_id: i64) -> Result<Vec<GradeRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut records = state.records_sorted(|r| r.student_id == student_id);
        records.sort_by_key(|r| r.course_id);
        Ok(records)
    }

    async fn commit_grade(
        &self,
        submission: Option<&Submission>,
        record: &GradeRecord,
    ) -> Result<GradeRecord> {
        if self.commits_fail() {
            return Err(GradebookError::database_operation("模拟的存储写入失败"));
        }

        let mut state = self.state.write().map_err(lock_error)?;
        if let Some(submission) = submission {
            if !state.submissions.contains_key(&submission.id) {
                return Err(GradebookError::database_operation(format!(
                    "提交 {} 不存在",
                    submission.id
                )));
            }
        }

        let existing_id = state
            .record_by_key(record.student_id, record.course_id)
            .map(|r| r.id);
        let mut saved = record.clone();
        saved.id = match existing_id {
            Some(id) => id,
            None => {
                state.next_record_id += 1;
                state.next_record_id
            }
        };

        if let Some(submission) = submission {
            state.submissions.insert(submission.id, submission.clone());
        }
        state.grade_records.insert(saved.id, saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_commit_creates_record_once_per_student_course() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.find_or_init_grade_record(100, 10).await.unwrap().id, 0);
        // 查找不会写入
        assert!(storage.find_grade_record(100, 10).await.unwrap().is_none());

        let mut draft = GradeRecord::draft(100, 10, Utc::now());
        draft.upsert_entry(1000, Some(80.0), 100.0, Utc::now());
        let created = storage.commit_grade(None, &draft).await.unwrap();
        assert!(created.id > 0);

        // 再次提交同一 (学生, 课程) 的草稿仍落到同一条记录
        let again = storage
            .commit_grade(None, &GradeRecord::draft(100, 10, Utc::now()))
            .await
            .unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(storage.list_grade_records_by_course(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_with_missing_submission_writes_nothing() {
        let storage = MemoryStorage::new();
        let submission = crate::services::grades::fixtures::submission(5000, 1000, 100);

        let err = storage
            .commit_grade(Some(&submission), &GradeRecord::draft(100, 10, Utc::now()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");
        assert!(storage.find_grade_record(100, 10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pagination_past_the_end_is_empty() {
        let storage = MemoryStorage::new();
        storage
            .commit_grade(None, &GradeRecord::draft(100, 10, Utc::now()))
            .await
            .unwrap();

        let page = storage
            .list_grade_records_with_pagination(10, u64::MAX, u64::MAX)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 1);
    }
}
