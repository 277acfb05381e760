use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use util::state::AppState;

mod common;
mod get;
mod post;

pub use get::{list_statuses, poll_command};
pub use post::{enqueue_command, report_status};

use crate::auth::guards::{allow_admin, allow_authenticated};

/// `/api/scanner` route group. Device-facing endpoints (poll, heartbeat) are
/// open like the scan endpoint; queueing commands and reading the fleet
/// status are operator surfaces.
pub fn scanner_routes() -> Router<AppState> {
    Router::new()
        .route("/commands", get(poll_command))
        .route(
            "/commands",
            post(enqueue_command).route_layer(from_fn(allow_admin)),
        )
        .route("/status", post(report_status))
        .route(
            "/status",
            get(list_statuses).route_layer(from_fn(allow_authenticated)),
        )
}
