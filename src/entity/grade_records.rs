//! 课程成绩记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub overall_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::assignment_grades::Entity")]
    AssignmentGrades,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::assignment_grades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignmentGrades.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 组装业务模型，`entries` 需按 position 升序传入
    pub fn into_grade_record(
        self,
        entries: Vec<super::assignment_grades::Model>,
    ) -> crate::models::grades::entities::GradeRecord {
        use crate::models::grades::entities::{GradeRecord, LetterGrade};
        use chrono::{DateTime, Utc};

        GradeRecord {
            id: self.id,
            student_id: self.student_id,
            course_id: self.course_id,
            entries: entries
                .into_iter()
                .map(|m| m.into_assignment_grade())
                .collect(),
            overall_grade: self.overall_grade,
            letter_grade: self
                .letter_grade
                .and_then(|s| s.parse::<LetterGrade>().ok()),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
