use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde_json::json;

use crate::response::ApiResponse;
use crate::ws::topics::dashboard_topic;
use util::{config, state::AppState, ws};

use super::common::{ScanReq, ScanResponse, StudentSummary};
use db::scan::{self, RejectReason, ScanError, ScanEvent, ScanOutcome};

/// POST /api/attendance/scan
///
/// Device-facing scan ingestion. Unauthenticated; readers post directly.
/// The reconciler classifies the scan, this handler maps the outcome to an
/// HTTP status, notifies the dashboard topic and drops the stats cache when
/// the ledger changed.
pub async fn record_scan(
    State(state): State<AppState>,
    Json(body): Json<ScanReq>,
) -> (StatusCode, Json<ApiResponse<ScanResponse>>) {
    let event = match ScanEvent::resolve(
        &body.rfid_uid,
        body.timestamp.as_deref(),
        body.exam_code.as_deref(),
        body.entry_type,
        config::civil_timezone(),
        Utc::now(),
    ) {
        Ok(event) => event,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(e.to_string())),
            );
        }
    };

    let outcome = match scan::reconcile(state.db(), config::civil_timezone(), event).await {
        Ok(outcome) => outcome,
        Err(ScanError::Validation(msg)) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg)));
        }
        Err(ScanError::Db(e)) => {
            tracing::error!(error = %e, "scan reconciliation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to record scan")),
            );
        }
    };

    if outcome.wrote_ledger() {
        state.stats_cache().invalidate(None).await;
    }

    let topic = dashboard_topic();
    match outcome {
        ScanOutcome::UnknownCard { rfid_uid, scanned_at } => {
            ws::emit(
                state.ws(),
                &topic,
                "attendance.unknown_card",
                &json!({ "rfid_uid": rfid_uid, "scanned_at": scanned_at.to_rfc3339() }),
            )
            .await;
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Card not registered to any student")),
            )
        }
        ScanOutcome::Rejected(r) => {
            // Enrollment failures get their own event so dashboards can raise
            // an unauthorized-card alert instead of a generic rejection.
            let event = match r.reason {
                RejectReason::NotEnrolled => "attendance.unauthorized",
                _ => "attendance.rejected",
            };
            ws::emit(
                state.ws(),
                &topic,
                event,
                &json!({
                    "reason": r.reason,
                    "rfid_uid": r.rfid_uid,
                    "exam_code": r.exam_code,
                    "student_name": r.student.name.clone(),
                }),
            )
            .await;
            let status = match r.reason {
                RejectReason::ExamNotFound => StatusCode::NOT_FOUND,
                RejectReason::NotEnrolled => StatusCode::FORBIDDEN,
                RejectReason::OutsideWindow => StatusCode::UNPROCESSABLE_ENTITY,
            };
            let payload = ScanResponse {
                record: None,
                student: Some(StudentSummary::from(r.student)),
                reason: Some(r.reason),
            };
            (
                status,
                Json(ApiResponse {
                    success: false,
                    data: payload,
                    message: r.message,
                }),
            )
        }
        ScanOutcome::Created(view) => {
            ws::emit(state.ws(), &topic, "attendance.recorded", &view).await;
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(view.into(), "Attendance recorded")),
            )
        }
        ScanOutcome::Updated(view) => {
            ws::emit(state.ws(), &topic, "attendance.recorded", &view).await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(view.into(), "Attendance updated")),
            )
        }
    }
}
