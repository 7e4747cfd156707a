use super::SeaOrmStorage;
use crate::entity::courses::{Column, Entity as Courses};
use crate::errors::{GradebookError, Result};
use crate::models::courses::entities::Course;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};

impl SeaOrmStorage {
    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 教师任课的课程 ID 列表
    pub async fn list_course_ids_by_instructor_impl(&self, instructor_id: i64) -> Result<Vec<i64>> {
        Courses::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::InstructorId.eq(instructor_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询任课课程失败: {e}")))
    }
}
