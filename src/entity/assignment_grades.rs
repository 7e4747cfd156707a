//! 成绩记录中的单项作业成绩

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignment_grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub grade_record_id: i64,
    pub assignment_id: i64,
    pub points: Option<f64>,
    /// 写入时作业满分的快照
    pub max_points: f64,
    /// 条目在记录中的顺序
    pub position: i32,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grade_records::Entity",
        from = "Column::GradeRecordId",
        to = "super::grade_records::Column::Id"
    )]
    GradeRecord,
}

impl Related<super::grade_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_assignment_grade(self) -> crate::models::grades::entities::AssignmentGrade {
        use crate::models::grades::entities::AssignmentGrade;
        use chrono::{DateTime, Utc};

        AssignmentGrade {
            assignment_id: self.assignment_id,
            points: self.points,
            max_points: self.max_points,
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
