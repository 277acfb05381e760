use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{auth::AuthUser, response::ApiResponse};
use util::state::AppState;

use db::models::{exam, exam_enrollment, exam_invigilator};

/// DELETE /api/exams/{exam_id}
///
/// Soft delete: deactivates the exam so historical attendance keeps its
/// reference. **Auth**: admin.
pub async fn delete_exam(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let db = state.db();

    match exam::Model::find_by_id(db, exam_id).await {
        Ok(Some(exam)) => match exam.soft_delete(db, claims.sub).await {
            Ok(_) => (
                StatusCode::OK,
                Json(ApiResponse::success((), "Exam deleted")),
            ),
            Err(e) => {
                tracing::error!(error = %e, "failed to delete exam");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Failed to delete exam")),
                )
            }
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Exam not found")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch exam");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to delete exam")),
            )
        }
    }
}

/// DELETE /api/exams/{exam_id}/students/{student_id}
///
/// Removes a student from the enrollment list. **Auth**: admin.
pub async fn unenroll_student(
    State(state): State<AppState>,
    Path((exam_id, student_id)): Path<(i64, i64)>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    match exam_enrollment::Model::unenroll(state.db(), exam_id, student_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Student unenrolled")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to unenroll student");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to unenroll student")),
            )
        }
    }
}

/// DELETE /api/exams/{exam_id}/invigilators/{user_id}
///
/// **Auth**: admin.
pub async fn remove_invigilator(
    State(state): State<AppState>,
    Path((exam_id, user_id)): Path<(i64, i64)>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    match exam_invigilator::Model::remove(state.db(), exam_id, user_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Invigilator removed")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to remove invigilator");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to remove invigilator")),
            )
        }
    }
}
