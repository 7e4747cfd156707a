//! 成绩服务
//!
//! 评分、批量评分、成绩单元格编辑、成绩查询、统计与导出。
//! 每个操作接收已解析的 [`Actor`]，返回 `Result`，由路由层转换为响应。

pub mod bulk;
pub mod calc;
pub mod cell;
pub mod export;
pub mod grade;
pub mod gradebook;
pub mod list;
pub mod locks;
pub mod stats;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

use crate::config::GradingConfig;
use crate::errors::{GradebookError, Result};
use crate::models::PaginationQuery;
use crate::models::actor::Actor;
use crate::models::courses::entities::Course;
use crate::models::grades::{
    requests::{BulkGradeRequest, ExportColumns, GradeSubmissionRequest, UpdateGradeCellRequest},
    responses::{
        BulkGradeResponse, CourseGradesResponse, CourseStatistics, GradeRecordResponse,
        GradeSubmissionResponse, GradebookResponse,
    },
};
use crate::storage::Storage;

pub use export::GradeExport;
pub use locks::RecordLocks;

pub struct GradeService {
    storage: Arc<dyn Storage>,
    locks: RecordLocks,
    config: GradingConfig,
}

impl GradeService {
    pub fn new(storage: Arc<dyn Storage>, config: GradingConfig) -> Self {
        Self {
            storage,
            locks: RecordLocks::new(),
            config,
        }
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub(crate) fn locks(&self) -> &RecordLocks {
        &self.locks
    }

    pub(crate) fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// 获取课程并确认调用者可以管理它
    pub(crate) async fn managed_course(&self, actor: &Actor, course_id: i64) -> Result<Course> {
        let course = self
            .storage
            .get_course_by_id(course_id)
            .await?
            .ok_or_else(|| GradebookError::not_found(format!("课程 {course_id} 不存在")))?;

        if !actor.can_manage_course(course.id) {
            return Err(GradebookError::authorization(format!(
                "用户 {} 无权管理课程 {}",
                actor.user_id, course.id
            )));
        }
        Ok(course)
    }

    /// 为单个提交评分
    pub async fn grade_submission(
        &self,
        actor: &Actor,
        submission_id: i64,
        req: GradeSubmissionRequest,
    ) -> Result<GradeSubmissionResponse> {
        grade::grade_submission(self, actor, submission_id, req).await
    }

    /// 批量评分
    pub async fn bulk_grade(
        &self,
        actor: &Actor,
        assignment_id: i64,
        req: BulkGradeRequest,
    ) -> Result<BulkGradeResponse> {
        bulk::bulk_grade(self, actor, assignment_id, req).await
    }

    /// 查询课程成绩
    pub async fn list_course_grades(
        &self,
        actor: &Actor,
        course_id: i64,
        query: PaginationQuery,
    ) -> Result<CourseGradesResponse> {
        list::list_course_grades(self, actor, course_id, query).await
    }

    /// 学生成绩册与 GPA
    pub async fn get_gradebook(&self, actor: &Actor, student_id: i64) -> Result<GradebookResponse> {
        gradebook::get_gradebook(self, actor, student_id).await
    }

    /// 编辑成绩单元格
    pub async fn update_grade_cell(
        &self,
        actor: &Actor,
        course_id: i64,
        student_id: i64,
        assignment_id: i64,
        req: UpdateGradeCellRequest,
    ) -> Result<GradeRecordResponse> {
        cell::update_grade_cell(self, actor, course_id, student_id, assignment_id, req).await
    }

    /// 课程成绩统计
    pub async fn course_statistics(&self, actor: &Actor, course_id: i64) -> Result<CourseStatistics> {
        stats::course_statistics(self, actor, course_id).await
    }

    /// 导出课程成绩
    pub async fn export_course_grades(
        &self,
        actor: &Actor,
        course_id: i64,
        columns: ExportColumns,
    ) -> Result<GradeExport> {
        export::export_course_grades(self, actor, course_id, columns).await
    }
}
