use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::response::ApiResponse;
use util::scanner::{DeviceCommand, DeviceStatus};
use util::state::AppState;

use super::common::PollQuery;

/// GET /api/scanner/commands?device_id=...
///
/// Device poll: pops the oldest unexpired command for this device, null when
/// the queue is empty. Unauthenticated; readers poll on their own schedule.
/// Each poll also sweeps expired commands and stale device entries.
pub async fn poll_command(
    State(state): State<AppState>,
    Query(q): Query<PollQuery>,
) -> (StatusCode, Json<ApiResponse<Option<DeviceCommand>>>) {
    let registry = state.scanner();
    registry.sweep().await;
    let command = registry.poll(&q.device_id).await;
    let message = if command.is_some() {
        "Command dispatched"
    } else {
        "No pending commands"
    };
    (StatusCode::OK, Json(ApiResponse::success(command, message)))
}

/// GET /api/scanner/status
///
/// Known devices with their last-reported payload and online flag.
/// **Auth**: any logged-in user.
pub async fn list_statuses(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<DeviceStatus>>>) {
    let statuses = state.scanner().statuses().await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(statuses, "Device statuses retrieved")),
    )
}
