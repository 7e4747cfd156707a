use std::sync::Arc;

use crate::models::{
    PaginatedResponse, assignments::entities::Assignment, courses::entities::Course,
    grades::entities::GradeRecord, submissions::entities::Submission, users::entities::User,
};

use crate::config::DatabaseConfig;
use crate::errors::{GradebookError, Result};

pub mod memory_storage;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 批量获取用户（导出时解析学生姓名）
    async fn list_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;

    /// 课程
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    // 教师任课的课程 ID
    async fn list_course_ids_by_instructor(&self, instructor_id: i64) -> Result<Vec<i64>>;

    /// 作业
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_by_course(&self, course_id: i64) -> Result<Vec<Assignment>>;

    /// 提交
    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>>;
    // 学生在某作业下最近一次提交
    async fn get_latest_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;

    /// 成绩记录
    async fn find_grade_record(&self, student_id: i64, course_id: i64)
    -> Result<Option<GradeRecord>>;
    // 查找 (学生, 课程) 的成绩记录，不存在时返回未持久化的新记录。
    // 新记录只由 commit_grade 写入，失败的评分不会留下空记录。
    async fn find_or_init_grade_record(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<GradeRecord> {
        Ok(self
            .find_grade_record(student_id, course_id)
            .await?
            .unwrap_or_else(|| GradeRecord::draft(student_id, course_id, chrono::Utc::now())))
    }
    // 课程全部成绩记录，按记录 ID 升序
    async fn list_grade_records_by_course(&self, course_id: i64) -> Result<Vec<GradeRecord>>;
    async fn list_grade_records_with_pagination(
        &self,
        course_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<GradeRecord>>;
    async fn list_grade_records_by_student(&self, student_id: i64) -> Result<Vec<GradeRecord>>;
    // 原子提交：按 (学生, 课程) 写入成绩记录（不存在则创建，含全部成绩项）并更新提交（可选），
    // 返回带持久化 ID 的记录
    async fn commit_grade(
        &self,
        submission: Option<&Submission>,
        record: &GradeRecord,
    ) -> Result<GradeRecord>;
}

/// 根据数据库 URL 选择存储实现，`memory://` 使用进程内存储
pub async fn create_storage(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let url = config.url.trim();
    if url.starts_with("memory://") {
        return Ok(Arc::new(memory_storage::MemoryStorage::new()));
    }
    if url.is_empty() {
        return Err(GradebookError::database_config("数据库 URL 不能为空"));
    }
    let storage = sea_orm_storage::SeaOrmStorage::new_async(url, config).await?;
    Ok(Arc::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            pool_size: 1,
            timeout: 5,
        }
    }

    #[tokio::test]
    async fn test_create_storage_follows_the_given_url() {
        let memory = create_storage(&database("memory://")).await.unwrap();
        assert!(memory.get_user_by_id(1).await.unwrap().is_none());

        // 连接给定的 SQLite 内存库并完成迁移
        let sqlite = create_storage(&database("sqlite::memory:")).await.unwrap();
        assert!(sqlite.list_grade_records_by_course(10).await.unwrap().is_empty());

        let err = create_storage(&database("  ")).await.err().unwrap();
        assert_eq!(err.code(), "E001");
        let err = create_storage(&database("ftp://nowhere")).await.err().unwrap();
        assert_eq!(err.code(), "E001");
    }
}
