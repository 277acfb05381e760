use axum::{Json, extract::State, http::StatusCode};

use crate::response::ApiResponse;
use util::state::AppState;

use super::common::{EnqueueReq, StatusReq};

/// POST /api/scanner/commands
///
/// Queues a command for a device (change mode, restart, set exam context).
/// **Auth**: admin.
pub async fn enqueue_command(
    State(state): State<AppState>,
    Json(body): Json<EnqueueReq>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let device_id = body.device_id.trim();
    if device_id.is_empty() || body.command.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("device_id and command are required")),
        );
    }

    state
        .scanner()
        .enqueue(device_id, body.command.trim(), body.mode, body.params)
        .await;

    (
        StatusCode::CREATED,
        Json(ApiResponse::success((), "Command queued")),
    )
}

/// POST /api/scanner/status
///
/// Device heartbeat with a free-form status payload. Unauthenticated.
pub async fn report_status(
    State(state): State<AppState>,
    Json(body): Json<StatusReq>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let device_id = body.device_id.trim();
    if device_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("device_id is required")),
        );
    }

    state.scanner().update_status(device_id, body.payload).await;

    (
        StatusCode::OK,
        Json(ApiResponse::success((), "Status recorded")),
    )
}
