use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use crate::response::ApiResponse;
use util::state::AppState;

use super::common::{ListQuery, ListResponse, StudentResponse};
use db::models::student::{self, Column as StudentCol, Entity as StudentEntity};

/// GET /api/students
///
/// **Query**:
/// - `q` *(optional)*: fuzzy match on name or reg_no
/// - `course`, `active` *(optional filters)*
/// - `page` *(default 1)*, `per_page` *(default 20, max 100)*
pub async fn list_students(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<ListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100) as u64;

    let mut sel = StudentEntity::find();
    if let Some(s) = q.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let s = s.trim();
        sel = sel.filter(
            Condition::any()
                .add(StudentCol::Name.contains(s))
                .add(StudentCol::RegNo.contains(&s.to_uppercase())),
        );
    }
    if let Some(course) = q.course.as_ref().filter(|s| !s.trim().is_empty()) {
        sel = sel.filter(StudentCol::Course.eq(course.trim()));
    }
    if let Some(active) = q.active {
        sel = sel.filter(StudentCol::Active.eq(active));
    }
    sel = sel.order_by_asc(StudentCol::Name);

    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    let resp = ListResponse {
        students: rows.into_iter().map(StudentResponse::from).collect(),
        page: page as i32,
        per_page: per_page as i32,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Students retrieved")),
    )
}

/// GET /api/students/{student_id}
pub async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Option<StudentResponse>>>) {
    match student::Model::find_by_id(state.db(), student_id).await {
        Ok(Some(row)) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(row.into()), "Student retrieved")),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Student not found")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch student");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to fetch student")),
            )
        }
    }
}
