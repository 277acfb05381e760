use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use util::state::AppState;

mod common;
mod delete;
mod get;
mod post;
mod put;

pub use delete::{delete_exam, remove_invigilator, unenroll_student};
pub use get::{get_exam, list_enrollments, list_exams, list_invigilators, upcoming_exams};
pub use post::{add_invigilator, create_exam, enroll_student};
pub use put::{change_status, edit_exam};

use crate::auth::guards::allow_admin;

/// `/api/exams` route group. The whole group requires authentication
/// (applied by the parent router); mutations except the status transition
/// are additionally admin-only. Status transitions check role authority in
/// the handler, since assigned invigilators may perform a subset.
pub fn exams_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exams))
        .route("/", post(create_exam).route_layer(from_fn(allow_admin)))
        .route("/upcoming", get(upcoming_exams))
        .route("/{exam_id}", get(get_exam))
        .route("/{exam_id}", put(edit_exam).route_layer(from_fn(allow_admin)))
        .route(
            "/{exam_id}",
            delete(delete_exam).route_layer(from_fn(allow_admin)),
        )
        .route("/{exam_id}/status", put(change_status))
        .route("/{exam_id}/students", get(list_enrollments))
        .route(
            "/{exam_id}/students",
            post(enroll_student).route_layer(from_fn(allow_admin)),
        )
        .route(
            "/{exam_id}/students/{student_id}",
            delete(unenroll_student).route_layer(from_fn(allow_admin)),
        )
        .route("/{exam_id}/invigilators", get(list_invigilators))
        .route(
            "/{exam_id}/invigilators",
            post(add_invigilator).route_layer(from_fn(allow_admin)),
        )
        .route(
            "/{exam_id}/invigilators/{user_id}",
            delete(remove_invigilator).route_layer(from_fn(allow_admin)),
        )
}
