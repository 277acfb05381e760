mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use helpers::app::{authed_get, authed_json_request, json_request, make_test_app, response_json, user_with_token};

fn student_body(reg_no: &str, rfid_uid: &str) -> serde_json::Value {
    json!({
        "name": "Thandi Moyo",
        "reg_no": reg_no,
        "course": "BSc CS",
        "rfid_uid": rfid_uid,
    })
}

#[tokio::test]
async fn student_crud_is_admin_only() {
    let (app, state) = make_test_app().await;
    let (_, user_token) = user_with_token(state.db(), "plain", false).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/students",
            student_body("R2301234", "AB12CD34"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/students",
            &user_token,
            student_body("R2301234", "AB12CD34"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn identity_keys_are_normalized_and_unique() {
    let (app, state) = make_test_app().await;
    let (_, admin_token) = user_with_token(state.db(), "admin", true).await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/students",
            &admin_token,
            student_body("r2301234", "ab12cd34"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["reg_no"], "R2301234");
    assert_eq!(body["data"]["rfid_uid"], "AB12CD34");

    // Same card, different reg_no: still a conflict.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/students",
            &admin_token,
            student_body("R9999999", "AB12CD34"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/students",
            &admin_token,
            student_body("R2301234", "FEEDF00D"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_uid_fails_validation() {
    let (app, state) = make_test_app().await;
    let (_, admin_token) = user_with_token(state.db(), "admin", true).await;

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/students",
            &admin_token,
            student_body("R2301234", "AB"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_filters_by_search_term() {
    let (app, state) = make_test_app().await;
    let (_, admin_token) = user_with_token(state.db(), "admin", true).await;

    for (name, reg, uid) in [
        ("Thandi Moyo", "R2301234", "AB12CD34"),
        ("Sipho Dube", "R2305678", "FEEDF00D"),
    ] {
        let mut body = student_body(reg, uid);
        body["name"] = json!(name);
        let response = app
            .clone()
            .oneshot(authed_json_request("POST", "/api/students", &admin_token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(authed_get("/api/students?q=thandi", &admin_token))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["students"][0]["name"], "Thandi Moyo");
}

#[tokio::test]
async fn deactivated_student_no_longer_matches_scans() {
    let (app, state) = make_test_app().await;
    let (_, admin_token) = user_with_token(state.db(), "admin", true).await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/students",
            &admin_token,
            student_body("R2301234", "AB12CD34"),
        ))
        .await
        .unwrap();
    let student_id = response_json(response).await["data"]["id"].as_i64().unwrap();

    // General scan works while active.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            json!({ "rfid_uid": "AB12CD34", "timestamp": "2026-03-09T08:00:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "DELETE",
            &format!("/api/students/{student_id}"),
            &admin_token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The card now reads as unknown.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            json!({ "rfid_uid": "AB12CD34", "timestamp": "2026-03-10T08:00:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
