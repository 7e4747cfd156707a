//! 请求主体
//!
//! 每个请求在认证中间件中解析一次，随后显式传入各个服务操作，
//! 服务层不再自行判断角色名称。

use std::collections::HashSet;

use crate::models::users::entities::UserRole;

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub user_id: i64,
    pub role: UserRole,
    /// 该用户作为任课教师拥有的课程
    owned_courses: HashSet<i64>,
}

impl Actor {
    pub fn new(user_id: i64, role: UserRole, owned_courses: impl IntoIterator<Item = i64>) -> Self {
        Self {
            user_id,
            role,
            owned_courses: owned_courses.into_iter().collect(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// 是否可以管理（评分、统计、导出）某门课程
    pub fn can_manage_course(&self, course_id: i64) -> bool {
        self.is_admin()
            || (self.role == UserRole::Instructor && self.owned_courses.contains(&course_id))
    }

    /// 是否可以查看某个学生的成绩册
    pub fn can_view_student(&self, student_id: i64) -> bool {
        self.is_admin() || self.user_id == student_id
    }
}
