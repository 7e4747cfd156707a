use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

use crate::errors::{ErrorKind, GradebookError, Result};
use crate::middlewares::{self, RequireJWT};
use crate::models::actor::Actor;
use crate::models::grades::requests::{
    BulkGradeRequest, ExportQuery, GradeSubmissionRequest, UpdateGradeCellRequest,
};
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::GradeService;

/// 服务层错误转换为 HTTP 响应
fn error_response(err: &GradebookError) -> HttpResponse {
    let status = match err.kind() {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => {
            error!("{}", err.format_simple());
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    HttpResponse::build(status).json(ApiResponse::<()>::from_error(err))
}

fn respond<T: Serialize + TS>(result: Result<T>, message: &str) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data, message)),
        Err(e) => error_response(&e),
    }
}

fn current_actor(req: &HttpRequest) -> std::result::Result<Actor, HttpResponse> {
    RequireJWT::extract_actor(req).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "无法获取用户信息",
        ))
    })
}

// 为单个提交评分
pub async fn grade_submission(
    req: HttpRequest,
    service: web::Data<GradeService>,
    path: web::Path<i64>,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let result = service
        .grade_submission(&actor, path.into_inner(), body.into_inner())
        .await;
    Ok(respond(result, "评分成功"))
}

// 批量评分
pub async fn bulk_grade(
    req: HttpRequest,
    service: web::Data<GradeService>,
    path: web::Path<i64>,
    body: web::Json<BulkGradeRequest>,
) -> ActixResult<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let result = service
        .bulk_grade(&actor, path.into_inner(), body.into_inner())
        .await;
    Ok(respond(result, "批量评分完成"))
}

// 查询课程成绩
pub async fn list_course_grades(
    req: HttpRequest,
    service: web::Data<GradeService>,
    path: web::Path<i64>,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let result = service
        .list_course_grades(&actor, path.into_inner(), query.into_inner())
        .await;
    Ok(respond(result, "查询成功"))
}

// 学生成绩册
pub async fn get_gradebook(
    req: HttpRequest,
    service: web::Data<GradeService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let result = service.get_gradebook(&actor, path.into_inner()).await;
    Ok(respond(result, "查询成功"))
}

// 编辑成绩单元格
pub async fn update_grade_cell(
    req: HttpRequest,
    service: web::Data<GradeService>,
    path: web::Path<(i64, i64, i64)>, // course_id, student_id, assignment_id
    body: web::Json<UpdateGradeCellRequest>,
) -> ActixResult<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let (course_id, student_id, assignment_id) = path.into_inner();
    let result = service
        .update_grade_cell(
            &actor,
            course_id,
            student_id,
            assignment_id,
            body.into_inner(),
        )
        .await;
    Ok(respond(result, "成绩已更新"))
}

// 课程成绩统计
pub async fn course_statistics(
    req: HttpRequest,
    service: web::Data<GradeService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let result = service.course_statistics(&actor, path.into_inner()).await;
    Ok(respond(result, "查询成功"))
}

// 导出课程成绩
pub async fn export_course_grades(
    req: HttpRequest,
    service: web::Data<GradeService>,
    path: web::Path<i64>,
    query: web::Query<ExportQuery>,
) -> ActixResult<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let columns = query.into_inner().columns.unwrap_or_default();
    match service
        .export_course_grades(&actor, path.into_inner(), columns)
        .await
    {
        Ok(export) => Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", export.filename),
            ))
            .body(export.content)),
        Err(e) => Ok(error_response(&e)),
    }
}

// 配置路由
pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .wrap(middlewares::RequireJWT)
            .route("/submissions/{id}/grade", web::post().to(grade_submission))
            .route("/assignments/{id}/bulk-grade", web::post().to(bulk_grade))
            .route("/courses/{id}/grades", web::get().to(list_course_grades))
            .route(
                "/courses/{id}/grades/statistics",
                web::get().to(course_statistics),
            )
            .route(
                "/courses/{id}/grades/export",
                web::get().to(export_course_grades),
            )
            .route(
                "/courses/{course_id}/grades/{student_id}/assignments/{assignment_id}",
                web::patch().to(update_grade_cell),
            )
            .route("/students/{id}/gradebook", web::get().to(get_gradebook)),
    );
}
