use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::SqlErr;

use crate::{auth::AuthUser, response::ApiResponse};
use util::state::AppState;

use super::common::{CreateExamReq, EnrollReq, ExamResponse, EXAM_CODE_RE, InvigilatorReq};
use db::models::exam::{self, NewExam};
use db::models::{exam_enrollment, exam_invigilator, student, user};

/// POST /api/exams
///
/// Creates a scheduled exam. **Auth**: admin.
pub async fn create_exam(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<CreateExamReq>,
) -> (StatusCode, Json<ApiResponse<Option<ExamResponse>>>) {
    let db = state.db();

    let code = body.exam_code.trim().to_uppercase();
    if !EXAM_CODE_RE.is_match(&code) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "Exam code must be 3-10 characters, letters and digits, starting with a letter",
            )),
        );
    }

    let new = NewExam {
        exam_code: code,
        exam_name: body.exam_name,
        subject: body.subject,
        course: body.course,
        exam_date: body.exam_date,
        start_time: body.start_time,
        end_time: body.end_time,
        venue_room: body.venue_room,
        venue_building: body.venue_building,
        allow_late_entry: body.allow_late_entry.unwrap_or(true),
        late_entry_grace_period: body.late_entry_grace_period.unwrap_or(15).clamp(0, 120),
        require_exit_scan: body.require_exit_scan.unwrap_or(false),
        auto_mark_absent: body.auto_mark_absent.unwrap_or(true),
        absent_marking_time: body.absent_marking_time.unwrap_or(30).clamp(0, 240),
    };

    match exam::Model::create(db, new, claims.sub).await {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(Some(row.into()), "Exam created")),
        ),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "An active exam with this code already exists",
            )),
        ),
        Err(sea_orm::DbErr::Custom(msg)) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg)))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create exam");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create exam")),
            )
        }
    }
}

/// POST /api/exams/{exam_id}/students
///
/// Enrolls a student with an optional seat number. **Auth**: admin.
pub async fn enroll_student(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Json(body): Json<EnrollReq>,
) -> (StatusCode, Json<ApiResponse<Option<exam_enrollment::Model>>>) {
    let db = state.db();

    match exam::Model::find_by_id(db, exam_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Exam not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up exam");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to enroll student")),
            );
        }
    }
    match student::Model::find_by_id(db, body.student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Student not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up student");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to enroll student")),
            );
        }
    }

    match exam_enrollment::Model::enroll(db, exam_id, body.student_id, body.seat_number.as_deref())
        .await
    {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(Some(row), "Student enrolled")),
        ),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Student is already enrolled")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to enroll student");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to enroll student")),
            )
        }
    }
}

/// POST /api/exams/{exam_id}/invigilators
///
/// Assigns an invigilator. **Auth**: admin.
pub async fn add_invigilator(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Json(body): Json<InvigilatorReq>,
) -> (StatusCode, Json<ApiResponse<Option<exam_invigilator::Model>>>) {
    let db = state.db();

    match exam::Model::find_by_id(db, exam_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Exam not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up exam");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to assign invigilator")),
            );
        }
    }
    match user::Model::find_by_id(db, body.user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("User not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up user");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to assign invigilator")),
            );
        }
    }

    let role = body.role.as_deref().unwrap_or("Assistant Invigilator");
    match exam_invigilator::Model::assign(db, exam_id, body.user_id, role).await {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(Some(row), "Invigilator assigned")),
        ),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Invigilator is already assigned")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to assign invigilator");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to assign invigilator")),
            )
        }
    }
}
