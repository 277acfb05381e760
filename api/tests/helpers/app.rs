use api::auth::generate_jwt;
use api::{routes::routes, ws::ws_routes};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use db::models::user;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use util::{state::AppState, ws::WebSocketManager};

/// Builds the full application router over a fresh in-memory database.
///
/// Returns the router plus the `AppState` so tests can seed rows and inspect
/// the cache/registry directly.
pub async fn make_test_app() -> (Router, AppState) {
    let db = db::test_utils::setup_test_db().await;
    let state = AppState::new(db, WebSocketManager::new());
    let app = Router::new()
        .nest("/api", routes(state.clone()))
        .nest("/ws", ws_routes(state.clone()));
    (app, state)
}

/// Seeds a user and mints a bearer token for them.
pub async fn user_with_token(
    db: &DatabaseConnection,
    username: &str,
    admin: bool,
) -> (user::Model, String) {
    let user = user::Model::create(
        db,
        username,
        &format!("{username}@test.com"),
        username,
        None,
        admin,
    )
    .await
    .expect("create user");
    let (token, _) = generate_jwt(user.id, admin);
    (user, token)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
