//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness probe (public)
//! - `/attendance` → scan ingestion (public, device-facing), listing and
//!   stats (authenticated)
//! - `/students` → student directory management (admin)
//! - `/exams` → exam CRUD, enrollment, invigilators, status lifecycle
//!   (authenticated; mutations admin except status transitions)
//! - `/scanner` → device command queue and fleet status

use crate::auth::guards::{allow_admin, allow_authenticated};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod attendance;
pub mod exams;
pub mod health;
pub mod scanner;
pub mod students;

use attendance::attendance_routes;
use exams::exams_routes;
use health::health_routes;
use scanner::scanner_routes;
use students::students_routes;

/// Builds the application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/attendance", attendance_routes())
        .nest(
            "/students",
            students_routes().route_layer(from_fn(allow_admin)),
        )
        .nest(
            "/exams",
            exams_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest("/scanner", scanner_routes())
        .with_state(app_state)
        .nest("/health", health_routes())
}
