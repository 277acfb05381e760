use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use util::state::AppState;

mod common;
mod get;
mod post;

pub use get::{get_stats, list_records};
pub use post::record_scan;

use crate::auth::guards::allow_authenticated;

/// `/api/attendance` route group. The scan endpoint is open (devices post
/// directly); listing and stats require a logged-in user.
pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(record_scan))
        .route(
            "/",
            get(list_records).route_layer(from_fn(allow_authenticated)),
        )
        .route(
            "/stats",
            get(get_stats).route_layer(from_fn(allow_authenticated)),
        )
}
