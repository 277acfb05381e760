mod helpers;

use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower::ServiceExt;

use db::models::exam::{self, NewExam};
use db::models::{exam_enrollment, student, user};
use api::ws::topics::dashboard_topic;
use helpers::app::{authed_get, json_request, make_test_app, response_json, user_with_token};

async fn seed_exam(db: &DatabaseConnection) -> (student::Model, exam::Model) {
    let admin = user::Model::create(db, "seeder", "seeder@test.com", "Seeder", None, true)
        .await
        .unwrap();
    let student = student::Model::create(db, "Thandi Moyo", "R2301234", "BSc CS", "AB12CD34")
        .await
        .unwrap();
    let exam = exam::Model::create(
        db,
        NewExam {
            exam_code: "MATH101".to_string(),
            exam_name: "Calculus I".to_string(),
            subject: "Mathematics".to_string(),
            course: "BSc CS".to_string(),
            exam_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            venue_room: Some("L201".to_string()),
            venue_building: None,
            allow_late_entry: true,
            late_entry_grace_period: 15,
            require_exit_scan: false,
            auto_mark_absent: true,
            absent_marking_time: 30,
        },
        admin.id,
    )
    .await
    .unwrap();
    exam_enrollment::Model::enroll(db, exam.id, student.id, Some("A12"))
        .await
        .unwrap();
    (student, exam)
}

fn scan_body(uid: &str, ts: &str, code: Option<&str>, entry_type: &str) -> serde_json::Value {
    let mut body = json!({
        "rfid_uid": uid,
        "timestamp": ts,
        "entry_type": entry_type,
    });
    if let Some(code) = code {
        body["exam_code"] = json!(code);
    }
    body
}

#[tokio::test]
async fn scan_missing_uid_is_a_400() {
    let (app, _state) = make_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            json!({ "rfid_uid": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_unknown_card_is_a_404() {
    let (app, state) = make_test_app().await;
    seed_exam(state.db()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("DEADBEEF", "2026-03-09T09:00:00", Some("MATH101"), "entry"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn scan_window_mapping_matches_outcomes() {
    let (app, state) = make_test_app().await;
    seed_exam(state.db()).await;

    // One second before the grace window opens.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("AB12CD34", "2026-03-09T08:44:59", Some("MATH101"), "entry"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Exactly at the boundary: first write for the tuple.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("AB12CD34", "2026-03-09T08:45:00", Some("MATH101"), "entry"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["record"]["status"], "present");
    assert_eq!(body["data"]["record"]["seat_number"], "A12");

    // Replay folds into the same row.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("AB12CD34", "2026-03-09T09:10:00", Some("MATH101"), "entry"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["record"]["status"], "late");

    // Exit after the scheduled end is accepted.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("AB12CD34", "2026-03-09T11:30:00", Some("MATH101"), "exit"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["record"]["exit_time"], "11:30:00");
    assert_eq!(body["data"]["record"]["entry_time"], "08:45:00");
}

#[tokio::test]
async fn scan_for_wrong_exam_code_and_unenrolled_student() {
    let (app, state) = make_test_app().await;
    seed_exam(state.db()).await;
    student::Model::create(state.db(), "Sipho Dube", "R2305678", "BSc CS", "FEEDF00D")
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("AB12CD34", "2026-03-09T09:00:00", Some("PHYS999"), "entry"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("FEEDF00D", "2026-03-09T09:00:00", Some("MATH101"), "entry"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response_json(response).await;
    assert_eq!(body["data"]["reason"], "not_enrolled");
}

#[tokio::test]
async fn unenrolled_rejections_broadcast_their_own_event() {
    let (app, state) = make_test_app().await;
    seed_exam(state.db()).await;
    student::Model::create(state.db(), "Sipho Dube", "R2305678", "BSc CS", "FEEDF00D")
        .await
        .unwrap();
    let mut feed = state.ws().subscribe(&dashboard_topic()).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("FEEDF00D", "2026-03-09T09:00:00", Some("MATH101"), "entry"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let envelope: serde_json::Value =
        serde_json::from_str(&feed.recv().await.unwrap()).unwrap();
    assert_eq!(envelope["event"], "attendance.unauthorized");
    assert_eq!(envelope["payload"]["reason"], "not_enrolled");
    assert_eq!(envelope["payload"]["student_name"], "Sipho Dube");

    // Window rejections keep the generic event.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("AB12CD34", "2026-03-09T08:30:00", Some("MATH101"), "entry"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let envelope: serde_json::Value =
        serde_json::from_str(&feed.recv().await.unwrap()).unwrap();
    assert_eq!(envelope["event"], "attendance.rejected");
    assert_eq!(envelope["payload"]["reason"], "outside_window");
}

#[tokio::test]
async fn listing_requires_auth_and_returns_joined_rows() {
    let (app, state) = make_test_app().await;
    seed_exam(state.db()).await;
    let (_, token) = user_with_token(state.db(), "viewer", false).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            scan_body("AB12CD34", "2026-03-09T08:50:00", Some("MATH101"), "entry"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // No token: 401.
    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/api/attendance")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(authed_get("/api/attendance?from=2026-03-09&to=2026-03-09", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["student"]["name"], "Thandi Moyo");
}

#[tokio::test]
async fn stats_cache_is_dropped_when_a_scan_writes() {
    let (app, state) = make_test_app().await;
    seed_exam(state.db()).await;
    let (_, token) = user_with_token(state.db(), "viewer", false).await;

    let response = app
        .clone()
        .oneshot(authed_get("/api/attendance/stats", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let before = response_json(response).await;
    assert_eq!(before["data"]["total"], 0);

    // No timestamp means "now", which lands on today's civil date.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/scan",
            json!({ "rfid_uid": "AB12CD34" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The write invalidated the cache, so the next read recomputes.
    let response = app
        .oneshot(authed_get("/api/attendance/stats", &token))
        .await
        .unwrap();
    let after = response_json(response).await;
    assert_eq!(after["data"]["total"], 1);
    assert_eq!(after["data"]["today"], 1);
}
