//! 课程成绩导出（CSV）

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::GradeService;
use crate::errors::{GradebookError, Result};
use crate::models::actor::Actor;
use crate::models::grades::entities::GradeRecord;
use crate::models::grades::requests::ExportColumns;
use crate::models::users::entities::User;
use crate::utils::round2;

const FIXED_HEADERS: [&str; 4] = ["studentIdentifier", "name", "overallGrade", "letterGrade"];

/// 导出结果
#[derive(Debug, Clone)]
pub struct GradeExport {
    pub filename: String,
    pub content: Vec<u8>,
}

/// 导出文件名：`grades-<课程代码>-<YYYY-MM-DD>.csv`
pub fn export_filename(course_code: &str, date: NaiveDate) -> String {
    format!("grades-{course_code}-{}.csv", date.format("%Y-%m-%d"))
}

/// 导出课程成绩
/// GET /courses/{id}/grades/export
pub async fn export_course_grades(
    service: &GradeService,
    actor: &Actor,
    course_id: i64,
    columns: ExportColumns,
) -> Result<GradeExport> {
    let course = service.managed_course(actor, course_id).await?;
    let storage = service.storage();

    let records = storage.list_grade_records_by_course(course.id).await?;
    let titles: HashMap<i64, String> = storage
        .list_assignments_by_course(course.id)
        .await?
        .into_iter()
        .map(|a| (a.id, a.title))
        .collect();

    let student_ids: Vec<i64> = records.iter().map(|r| r.student_id).collect();
    let students: HashMap<i64, User> = storage
        .list_users_by_ids(&student_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let content = render_csv(&records, &titles, &students, columns).inspect_err(|e| {
        warn!("Export of course {} rejected: {}", course.id, e);
    })?;

    info!(
        "Exported {} grade records for course {} ({:?})",
        records.len(),
        course.code,
        columns
    );

    Ok(GradeExport {
        filename: export_filename(&course.code, Utc::now().date_naive()),
        content,
    })
}

fn title_of(titles: &HashMap<i64, String>, assignment_id: i64) -> String {
    titles
        .get(&assignment_id)
        .cloned()
        .unwrap_or_else(|| format!("Assignment {assignment_id}"))
}

/// 列标题；同名作业追加 ID 区分
fn column_headers(titles: &HashMap<i64, String>, column_ids: &[i64]) -> Vec<String> {
    let names: Vec<String> = column_ids.iter().map(|id| title_of(titles, *id)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    names
        .iter()
        .zip(column_ids)
        .map(|(name, id)| match counts.get(name.as_str()) {
            Some(&n) if n > 1 => format!("{name} (#{id})"),
            _ => name.clone(),
        })
        .collect()
}

fn format_points(points: Option<f64>) -> String {
    points.map(|p| p.to_string()).unwrap_or_default()
}

fn identity_fields(record: &GradeRecord, students: &HashMap<i64, User>) -> Vec<String> {
    let (identifier, name) = match students.get(&record.student_id) {
        Some(user) => (user.username.clone(), user.name().to_string()),
        None => (record.student_id.to_string(), String::new()),
    };
    vec![
        identifier,
        name,
        record
            .overall_grade
            .map(|g| format!("{:.2}", round2(g)))
            .unwrap_or_default(),
        record
            .letter_grade
            .map(|l| l.to_string())
            .unwrap_or_default(),
    ]
}

/// 生成 CSV 内容
pub fn render_csv(
    records: &[GradeRecord],
    titles: &HashMap<i64, String>,
    students: &HashMap<i64, User>,
    columns: ExportColumns,
) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match columns {
        ExportColumns::FirstRecord => {
            let column_ids: Vec<i64> = records
                .first()
                .map(|r| r.entries.iter().map(|e| e.assignment_id).collect())
                .unwrap_or_default();
            let expected: HashSet<i64> = column_ids.iter().copied().collect();

            let misaligned = records
                .iter()
                .filter(|r| {
                    let ids: HashSet<i64> = r.entries.iter().map(|e| e.assignment_id).collect();
                    ids != expected
                })
                .count();
            if misaligned > 0 {
                return Err(GradebookError::validation(format!(
                    "{misaligned} 条成绩记录的作业与首条记录不一致，请使用 columns=union 导出"
                )));
            }

            let mut header: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
            header.extend(column_headers(titles, &column_ids));
            wtr.write_record(&header)?;

            for record in records {
                let mut row = identity_fields(record, students);
                row.extend(
                    column_ids
                        .iter()
                        .map(|id| format_points(record.entry(*id).and_then(|e| e.points))),
                );
                wtr.write_record(&row)?;
            }
        }
        ExportColumns::Union => {
            let mut column_ids: Vec<i64> = Vec::new();
            let mut seen: HashSet<i64> = HashSet::new();
            for record in records {
                for entry in &record.entries {
                    if seen.insert(entry.assignment_id) {
                        column_ids.push(entry.assignment_id);
                    }
                }
            }

            let mut header: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
            header.extend(column_headers(titles, &column_ids));
            wtr.write_record(&header)?;

            for record in records {
                let mut row = identity_fields(record, students);
                row.extend(
                    column_ids
                        .iter()
                        .map(|id| format_points(record.entry(*id).and_then(|e| e.points))),
                );
                wtr.write_record(&row)?;
            }
        }
    }

    wtr.into_inner()
        .map_err(|e| GradebookError::export(format!("CSV 生成失败: {e}")))
}
