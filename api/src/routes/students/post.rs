use axum::{Json, extract::State, http::StatusCode};
use sea_orm::SqlErr;
use validator::Validate;

use crate::response::ApiResponse;
use util::state::AppState;

use super::common::{CreateStudentReq, StudentResponse};
use db::models::student;

/// POST /api/students
///
/// Registers a student with their card. **Auth**: admin.
/// Duplicate reg_no or rfid_uid is a 409.
pub async fn create_student(
    State(state): State<AppState>,
    Json(body): Json<CreateStudentReq>,
) -> (StatusCode, Json<ApiResponse<Option<StudentResponse>>>) {
    if let Err(e) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(e.to_string())),
        );
    }

    match student::Model::create(
        state.db(),
        &body.name,
        &body.reg_no,
        &body.course,
        &body.rfid_uid,
    )
    .await
    {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(Some(row.into()), "Student created")),
        ),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "A student with this reg_no or card already exists",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to create student");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create student")),
            )
        }
    }
}
