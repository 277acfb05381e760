use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde_json::{Value, json};

use crate::response::ApiResponse;
use util::{config, state::AppState};

use super::common::{ListQuery, ListResponse, ListedRecord, StudentSummary};
use db::models::attendance_record::{Column as RecordCol, Entity as RecordEntity};
use db::models::{attendance_record, student};

const STATS_CACHE_KEY: &str = "attendance_overview";

/// GET /api/attendance
///
/// Paginated ledger listing joined with student display fields.
///
/// **Query**:
/// - `from` / `to` *(optional, `YYYY-MM-DD`, inclusive)*
/// - `student_id`, `exam_id`, `course` *(optional filters)*
/// - `page` *(default 1)*, `per_page` *(default 20, max 100)*
pub async fn list_records(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<ListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100) as u64;

    let mut sel = RecordEntity::find().find_also_related(student::Entity);
    if let Some(from) = q.from.as_ref().filter(|s| !s.trim().is_empty()) {
        sel = sel.filter(RecordCol::AttendanceDate.gte(from.trim()));
    }
    if let Some(to) = q.to.as_ref().filter(|s| !s.trim().is_empty()) {
        sel = sel.filter(RecordCol::AttendanceDate.lte(to.trim()));
    }
    if let Some(id) = q.student_id {
        sel = sel.filter(RecordCol::StudentId.eq(id));
    }
    if let Some(id) = q.exam_id {
        sel = sel.filter(RecordCol::ExamId.eq(id));
    }
    if let Some(course) = q.course.as_ref().filter(|s| !s.trim().is_empty()) {
        sel = sel.filter(student::Column::Course.eq(course.trim()));
    }
    sel = sel
        .order_by_desc(RecordCol::AttendanceDate)
        .order_by_desc(RecordCol::UpdatedAt);

    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    let resp = ListResponse {
        records: rows
            .into_iter()
            .map(|(record, student)| ListedRecord {
                record: record.into(),
                student: student.map(StudentSummary::from),
            })
            .collect(),
        page: page as i32,
        per_page: per_page as i32,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Attendance records retrieved")),
    )
}

/// GET /api/attendance/stats
///
/// Summary counts and a 7-day trend, served through the TTL stats cache.
/// The cache is dropped whenever a scan writes the ledger, so the figures
/// are at most one TTL stale.
pub async fn get_stats(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Value>>) {
    if let Some(cached) = state.stats_cache().get(STATS_CACHE_KEY).await {
        return (
            StatusCode::OK,
            Json(ApiResponse::success(cached, "Attendance stats retrieved")),
        );
    }

    let db = state.db();
    let today = Utc::now()
        .with_timezone(&config::civil_timezone())
        .date_naive();
    let week_start = today - Duration::days(6);

    let today_key = today.format("%Y-%m-%d").to_string();
    let today_count = match attendance_record::Model::count_for_date(db, &today_key).await {
        Ok(n) => n,
        Err(e) => return stats_error(e),
    };
    let week_count = match attendance_record::Model::count_between(
        db,
        &week_start.format("%Y-%m-%d").to_string(),
        &today_key,
    )
    .await
    {
        Ok(n) => n,
        Err(e) => return stats_error(e),
    };
    let total_count = match attendance_record::Model::count_all(db).await {
        Ok(n) => n,
        Err(e) => return stats_error(e),
    };

    let mut daily = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let day = today - Duration::days(offset);
        let key = day.format("%Y-%m-%d").to_string();
        let count = match attendance_record::Model::count_for_date(db, &key).await {
            Ok(n) => n,
            Err(e) => return stats_error(e),
        };
        daily.push(json!({ "date": key, "count": count }));
    }

    let mut top = Vec::new();
    match attendance_record::Model::top_students(db, 5).await {
        Ok(pairs) => {
            for (student_id, scan_count) in pairs {
                let name = student::Model::find_by_id(db, student_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|s| s.name);
                top.push(json!({
                    "student_id": student_id,
                    "name": name,
                    "scan_count": scan_count,
                }));
            }
        }
        Err(e) => return stats_error(e),
    }

    let stats = json!({
        "today": today_count,
        "this_week": week_count,
        "total": total_count,
        "daily_trend": daily,
        "top_students": top,
    });
    state.stats_cache().put(STATS_CACHE_KEY, stats.clone()).await;

    (
        StatusCode::OK,
        Json(ApiResponse::success(stats, "Attendance stats retrieved")),
    )
}

fn stats_error(e: sea_orm::DbErr) -> (StatusCode, Json<ApiResponse<Value>>) {
    tracing::error!(error = %e, "failed to compute attendance stats");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("Failed to compute attendance stats")),
    )
}
