use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, IntoActiveModel};

use crate::{auth::AuthUser, response::ApiResponse};
use util::state::AppState;

use super::common::{EditExamReq, ExamResponse, StatusReq};
use db::models::{exam, exam_invigilator};

/// PUT /api/exams/{exam_id}
///
/// Edits exam fields. **Auth**: admin.
pub async fn edit_exam(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<EditExamReq>,
) -> (StatusCode, Json<ApiResponse<Option<ExamResponse>>>) {
    let db = state.db();

    let exam = match exam::Model::find_by_id(db, exam_id).await {
        Ok(Some(exam)) => exam,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Exam not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch exam");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update exam")),
            );
        }
    };

    let start = body.start_time.unwrap_or(exam.start_time);
    let end = body.end_time.unwrap_or(exam.end_time);
    if end <= start {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("End time must be after start time")),
        );
    }

    let mut active = exam.into_active_model();
    if let Some(v) = body.exam_name {
        active.exam_name = Set(v);
    }
    if let Some(v) = body.subject {
        active.subject = Set(v);
    }
    if let Some(v) = body.course {
        active.course = Set(v);
    }
    if let Some(v) = body.exam_date {
        active.exam_date = Set(v);
    }
    if body.start_time.is_some() {
        active.start_time = Set(start);
    }
    if body.end_time.is_some() {
        active.end_time = Set(end);
    }
    if let Some(v) = body.venue_room {
        active.venue_room = Set(Some(v));
    }
    if let Some(v) = body.venue_building {
        active.venue_building = Set(Some(v));
    }
    if let Some(v) = body.allow_late_entry {
        active.allow_late_entry = Set(v);
    }
    if let Some(v) = body.late_entry_grace_period {
        active.late_entry_grace_period = Set(v.clamp(0, 120));
    }
    if let Some(v) = body.require_exit_scan {
        active.require_exit_scan = Set(v);
    }
    if let Some(v) = body.auto_mark_absent {
        active.auto_mark_absent = Set(v);
    }
    if let Some(v) = body.absent_marking_time {
        active.absent_marking_time = Set(v.clamp(0, 240));
    }
    active.last_modified_by = Set(Some(claims.sub));
    active.updated_at = Set(Utc::now());

    match active.update(db).await {
        Ok(row) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(row.into()), "Exam updated")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to update exam");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update exam")),
            )
        }
    }
}

/// PUT /api/exams/{exam_id}/status
///
/// Lifecycle transition with role authority: admins may move to any state,
/// an assigned invigilator only Scheduled→InProgress and
/// InProgress→Completed. Everyone else is refused.
pub async fn change_status(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<StatusReq>,
) -> (StatusCode, Json<ApiResponse<Option<ExamResponse>>>) {
    let db = state.db();

    let exam = match exam::Model::find_by_id(db, exam_id).await {
        Ok(Some(exam)) => exam,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Exam not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch exam");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update exam status")),
            );
        }
    };

    let allowed = if claims.admin {
        exam.status.admin_may_transition(body.status)
    } else {
        let assigned = exam_invigilator::Model::is_assigned(db, exam_id, claims.sub)
            .await
            .unwrap_or(false);
        assigned && exam.status.invigilator_may_transition(body.status)
    };

    if !allowed {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error(format!(
                "Not permitted to move exam from {} to {}",
                exam.status, body.status
            ))),
        );
    }

    match exam.update_status(db, body.status, claims.sub).await {
        Ok(row) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(row.into()), "Exam status updated")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to update exam status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update exam status")),
            )
        }
    }
}
