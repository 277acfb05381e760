use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, IntoActiveModel};

use crate::response::ApiResponse;
use util::state::AppState;

use db::models::student;

/// DELETE /api/students/{student_id}
///
/// Deactivates the student; their ledger history stays intact and the card
/// stops matching scans. **Auth**: admin.
pub async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let db = state.db();

    let student = match student::Model::find_by_id(db, student_id).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Student not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch student");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to delete student")),
            );
        }
    };

    let mut active = student.into_active_model();
    active.active = Set(false);
    active.updated_at = Set(Utc::now());

    match active.update(db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Student deactivated")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to deactivate student");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to delete student")),
            )
        }
    }
}
