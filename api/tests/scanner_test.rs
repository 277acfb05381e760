mod helpers;

use axum::{body::Body, http::Request, http::StatusCode};
use serde_json::json;
use tower::ServiceExt;

use helpers::app::{authed_get, authed_json_request, json_request, make_test_app, response_json, user_with_token};

#[tokio::test]
async fn queueing_commands_is_admin_only() {
    let (app, state) = make_test_app().await;
    let (_, user_token) = user_with_token(state.db(), "plain", false).await;

    let body = json!({ "device_id": "gate-1", "command": "set_mode", "mode": "exam" });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/scanner/commands", body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/scanner/commands",
            &user_token,
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn devices_poll_commands_in_fifo_order() {
    let (app, state) = make_test_app().await;
    let (_, admin_token) = user_with_token(state.db(), "admin", true).await;

    for command in ["set_mode", "restart"] {
        let response = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/api/scanner/commands",
                &admin_token,
                json!({ "device_id": "gate-1", "command": command }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let poll = |app: axum::Router| async move {
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/scanner/commands?device_id=gate-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response_json(response).await
    };

    let first = poll(app.clone()).await;
    assert_eq!(first["data"]["command"], "set_mode");
    let second = poll(app.clone()).await;
    assert_eq!(second["data"]["command"], "restart");
    let drained = poll(app.clone()).await;
    assert!(drained["data"].is_null());

    // Another device's queue is untouched throughout.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/scanner/commands?device_id=gate-2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let other = response_json(response).await;
    assert!(other["data"].is_null());
}

#[tokio::test]
async fn heartbeats_show_up_in_the_fleet_status() {
    let (app, state) = make_test_app().await;
    let (_, token) = user_with_token(state.db(), "viewer", false).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scanner/status",
            json!({ "device_id": "gate-1", "mode": "exam", "firmware": "1.4.2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/scanner/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(authed_get("/api/scanner/status", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"][0]["device_id"], "gate-1");
    assert_eq!(body["data"][0]["online"], true);
    assert_eq!(body["data"][0]["payload"]["mode"], "exam");
}
