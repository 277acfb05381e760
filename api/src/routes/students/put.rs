use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, IntoActiveModel};
use validator::Validate;

use crate::response::ApiResponse;
use util::state::AppState;

use super::common::{EditStudentReq, StudentResponse};
use db::models::student;

/// PUT /api/students/{student_id}
///
/// Edits descriptive fields and the active flag. **Auth**: admin.
pub async fn edit_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(body): Json<EditStudentReq>,
) -> (StatusCode, Json<ApiResponse<Option<StudentResponse>>>) {
    if let Err(e) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(e.to_string())),
        );
    }

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
                Json(ApiResponse::error("Failed to update student")),
            );
        }
    };

    let mut active = student.into_active_model();
    if let Some(v) = body.name {
        active.name = Set(v.trim().to_owned());
    }
    if let Some(v) = body.course {
        active.course = Set(v.trim().to_owned());
    }
    if let Some(v) = body.active {
        active.active = Set(v);
    }
    active.updated_at = Set(Utc::now());

    match active.update(db).await {
        Ok(row) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(row.into()), "Student updated")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to update student");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update student")),
            )
        }
    }
}
