use axum::{
    Router,
    routing::{delete, get, post, put},
};
use util::state::AppState;

mod common;
mod delete;
mod get;
mod post;
mod put;

pub use delete::delete_student;
pub use get::{get_student, list_students};
pub use post::create_student;
pub use put::edit_student;

/// `/api/students` route group. Admin-only; the guard is applied where the
/// group is nested.
pub fn students_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students))
        .route("/", post(create_student))
        .route("/{student_id}", get(get_student))
        .route("/{student_id}", put(edit_student))
        .route("/{student_id}", delete(delete_student))
}
