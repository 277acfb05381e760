use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use crate::response::ApiResponse;
use util::{config, state::AppState};

use super::common::{ExamResponse, ListQuery, ListResponse};
use db::models::exam::{self, Column as ExamCol, Entity as ExamEntity, ExamStatus};
use db::models::{exam_enrollment, exam_invigilator};

/// GET /api/exams
///
/// Lists active exams.
///
/// **Query**:
/// - `q` *(optional)*: fuzzy match on name or code
/// - `status`, `course` *(optional filters)*
/// - `page` *(default 1)*, `per_page` *(default 20, max 100)*
pub async fn list_exams(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<ListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100) as u64;

    let mut sel = ExamEntity::find().filter(ExamCol::IsActive.eq(true));
    if let Some(s) = q.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let s = s.trim();
        sel = sel.filter(
            Condition::any()
                .add(ExamCol::ExamName.contains(s))
                .add(ExamCol::ExamCode.contains(&s.to_uppercase())),
        );
    }
    if let Some(status) = q.status {
        sel = sel.filter(ExamCol::Status.eq(status));
    }
    if let Some(course) = q.course.as_ref().filter(|s| !s.trim().is_empty()) {
        sel = sel.filter(ExamCol::Course.eq(course.trim()));
    }
    sel = sel
        .order_by_asc(ExamCol::ExamDate)
        .order_by_asc(ExamCol::StartTime);

    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    let resp = ListResponse {
        exams: rows.into_iter().map(ExamResponse::from).collect(),
        page: page as i32,
        per_page: per_page as i32,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Exams retrieved")),
    )
}

/// GET /api/exams/upcoming
///
/// Active Scheduled/InProgress exams from today onward, soonest first.
pub async fn upcoming_exams(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<ExamResponse>>>) {
    let db = state.db();
    let today = Utc::now()
        .with_timezone(&config::civil_timezone())
        .date_naive();

    let rows = ExamEntity::find()
        .filter(ExamCol::IsActive.eq(true))
        .filter(ExamCol::ExamDate.gte(today))
        .filter(
            ExamCol::Status
                .eq(ExamStatus::Scheduled)
                .or(ExamCol::Status.eq(ExamStatus::InProgress)),
        )
        .order_by_asc(ExamCol::ExamDate)
        .order_by_asc(ExamCol::StartTime)
        .all(db)
        .await
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            rows.into_iter().map(ExamResponse::from).collect(),
            "Upcoming exams retrieved",
        )),
    )
}

/// GET /api/exams/{exam_id}
pub async fn get_exam(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Option<ExamResponse>>>) {
    match exam::Model::find_by_id(state.db(), exam_id).await {
        Ok(Some(row)) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(row.into()), "Exam retrieved")),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Exam not found")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch exam");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to fetch exam")),
            )
        }
    }
}

/// GET /api/exams/{exam_id}/students
pub async fn list_enrollments(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Vec<exam_enrollment::Model>>>) {
    match exam_enrollment::Model::list_for_exam(state.db(), exam_id).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(rows, "Enrollments retrieved")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to list enrollments");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list enrollments")),
            )
        }
    }
}

/// GET /api/exams/{exam_id}/invigilators
pub async fn list_invigilators(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Vec<exam_invigilator::Model>>>) {
    match exam_invigilator::Model::list_for_exam(state.db(), exam_id).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(rows, "Invigilators retrieved")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to list invigilators");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list invigilators")),
            )
        }
    }
}
