//! 服务层测试数据

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::GradeService;
use crate::config::GradingConfig;
use crate::models::actor::Actor;
use crate::models::assignments::entities::{Assignment, AssignmentCategory};
use crate::models::courses::entities::Course;
use crate::models::grades::requests::GradeSubmissionRequest;
use crate::models::submissions::entities::{Submission, SubmissionStatus};
use crate::models::users::entities::{User, UserRole};
use crate::storage::memory_storage::MemoryStorage;

pub const ADMIN_ID: i64 = 1;
pub const INSTRUCTOR_ID: i64 = 2;
pub const OTHER_INSTRUCTOR_ID: i64 = 3;
pub const STUDENT_A: i64 = 100;
pub const STUDENT_B: i64 = 101;
pub const STUDENT_C: i64 = 102;

pub const COURSE_ID: i64 = 10;
pub const OTHER_COURSE_ID: i64 = 20;

/// CS101 作业 1，满分 100
pub const HOMEWORK_1: i64 = 1000;
/// CS101 测验 1，满分 50
pub const QUIZ_1: i64 = 1001;
/// MA201 作业，满分 20
pub const OTHER_ASSIGNMENT: i64 = 2000;

pub const SUB_A_HOMEWORK: i64 = 5000;
pub const SUB_A_QUIZ: i64 = 5001;
pub const SUB_B_HOMEWORK: i64 = 5002;
pub const SUB_A_OTHER: i64 = 5003;
pub const SUB_C_HOMEWORK: i64 = 5004;

pub struct Fixture {
    pub service: GradeService,
    pub storage: Arc<MemoryStorage>,
}

fn user(id: i64, username: &str, display_name: Option<&str>, role: UserRole) -> User {
    User {
        id,
        username: username.to_string(),
        display_name: display_name.map(str::to_string),
        role,
        created_at: Utc::now(),
    }
}

fn course(id: i64, code: &str, title: &str, instructor_id: i64, credits: f64) -> Course {
    Course {
        id,
        code: code.to_string(),
        title: title.to_string(),
        instructor_id,
        credits,
        created_at: Utc::now(),
    }
}

fn assignment(id: i64, course_id: i64, title: &str, max_points: f64) -> Assignment {
    Assignment {
        id,
        course_id,
        title: title.to_string(),
        max_points,
        category: AssignmentCategory::Homework,
        created_at: Utc::now(),
    }
}

pub fn submission(id: i64, assignment_id: i64, student_id: i64) -> Submission {
    Submission {
        id,
        assignment_id,
        student_id,
        points: None,
        feedback: None,
        comments: None,
        rubric_scores: None,
        status: SubmissionStatus::Submitted,
        grader_id: None,
        graded_at: None,
        submitted_at: Utc::now() - Duration::hours(1),
    }
}

pub fn fixture() -> Fixture {
    fixture_with_config(GradingConfig::default())
}

pub fn fixture_with_config(config: GradingConfig) -> Fixture {
    let storage = Arc::new(MemoryStorage::new());

    for u in [
        user(ADMIN_ID, "admin", Some("Admin"), UserRole::Admin),
        user(INSTRUCTOR_ID, "t-lee", Some("Dr. Lee"), UserRole::Instructor),
        user(OTHER_INSTRUCTOR_ID, "t-park", None, UserRole::Instructor),
        user(STUDENT_A, "s2024001", Some("Alice Chen"), UserRole::Student),
        user(STUDENT_B, "s2024002", Some("Bob Wang"), UserRole::Student),
        user(STUDENT_C, "s2024003", None, UserRole::Student),
    ] {
        storage.insert_user(u).unwrap();
    }

    storage
        .insert_course(course(COURSE_ID, "CS101", "Intro to CS", INSTRUCTOR_ID, 3.0))
        .unwrap();
    storage
        .insert_course(course(OTHER_COURSE_ID, "MA201", "Linear Algebra", OTHER_INSTRUCTOR_ID, 4.0))
        .unwrap();

    storage
        .insert_assignment(assignment(HOMEWORK_1, COURSE_ID, "Homework 1", 100.0))
        .unwrap();
    storage
        .insert_assignment(assignment(QUIZ_1, COURSE_ID, "Quiz 1", 50.0))
        .unwrap();
    storage
        .insert_assignment(assignment(OTHER_ASSIGNMENT, OTHER_COURSE_ID, "Problem Set 1", 20.0))
        .unwrap();

    for s in [
        submission(SUB_A_HOMEWORK, HOMEWORK_1, STUDENT_A),
        submission(SUB_A_QUIZ, QUIZ_1, STUDENT_A),
        submission(SUB_B_HOMEWORK, HOMEWORK_1, STUDENT_B),
        submission(SUB_A_OTHER, OTHER_ASSIGNMENT, STUDENT_A),
        submission(SUB_C_HOMEWORK, HOMEWORK_1, STUDENT_C),
    ] {
        storage.insert_submission(s).unwrap();
    }

    let service = GradeService::new(storage.clone(), config);
    Fixture { service, storage }
}

pub fn admin() -> Actor {
    Actor::new(ADMIN_ID, UserRole::Admin, [])
}

pub fn instructor() -> Actor {
    Actor::new(INSTRUCTOR_ID, UserRole::Instructor, [COURSE_ID])
}

pub fn other_instructor() -> Actor {
    Actor::new(OTHER_INSTRUCTOR_ID, UserRole::Instructor, [OTHER_COURSE_ID])
}

pub fn student(id: i64) -> Actor {
    Actor::new(id, UserRole::Student, [])
}

pub fn grade_req(points: f64) -> GradeSubmissionRequest {
    GradeSubmissionRequest {
        points,
        feedback: Some("ok".to_string()),
        comments: None,
        rubric_scores: None,
    }
}
