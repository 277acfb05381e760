mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use db::models::exam_invigilator;
use helpers::app::{authed_get, authed_json_request, make_test_app, response_json, user_with_token};

fn exam_body(code: &str) -> serde_json::Value {
    json!({
        "exam_code": code,
        "exam_name": "Calculus I",
        "subject": "Mathematics",
        "course": "BSc CS",
        "exam_date": "2026-03-09",
        "start_time": "09:00:00",
        "end_time": "11:00:00",
        "venue_room": "L201",
        "late_entry_grace_period": 15
    })
}

#[tokio::test]
async fn exam_creation_is_admin_only_and_codes_are_unique_among_active() {
    let (app, state) = make_test_app().await;
    let (_, admin_token) = user_with_token(state.db(), "admin", true).await;
    let (_, user_token) = user_with_token(state.db(), "plain", false).await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/exams",
            &user_token,
            exam_body("MATH101"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/exams",
            &admin_token,
            exam_body("math101"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["exam_code"], "MATH101");
    let exam_id = body["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/exams",
            &admin_token,
            exam_body("MATH101"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Soft-deleting frees the code for reuse.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "DELETE",
            &format!("/api/exams/{exam_id}"),
            &admin_token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/exams",
            &admin_token,
            exam_body("MATH101"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn bad_exam_payloads_are_rejected() {
    let (app, state) = make_test_app().await;
    let (_, admin_token) = user_with_token(state.db(), "admin", true).await;

    let mut body = exam_body("MATH101");
    body["end_time"] = json!("08:00:00");
    let response = app
        .clone()
        .oneshot(authed_json_request("POST", "/api/exams", &admin_token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/exams",
            &admin_token,
            exam_body("1!"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_transitions_respect_role_authority() {
    let (app, state) = make_test_app().await;
    let db = state.db();
    let (_, admin_token) = user_with_token(db, "admin", true).await;
    let (invigilator, invig_token) = user_with_token(db, "invig", false).await;
    let (_, outsider_token) = user_with_token(db, "outsider", false).await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/exams",
            &admin_token,
            exam_body("MATH101"),
        ))
        .await
        .unwrap();
    let exam_id = response_json(response).await["data"]["id"].as_i64().unwrap();

    exam_invigilator::Model::assign(db, exam_id, invigilator.id, "Chief Invigilator")
        .await
        .unwrap();

    // Unassigned users may not transition at all.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/exams/{exam_id}/status"),
            &outsider_token,
            json!({ "status": "In Progress" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Assigned invigilators may start the exam...
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/exams/{exam_id}/status"),
            &invig_token,
            json!({ "status": "In Progress" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // ...but may not cancel it.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/exams/{exam_id}/status"),
            &invig_token,
            json!({ "status": "Cancelled" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admins may.
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/exams/{exam_id}/status"),
            &admin_token,
            json!({ "status": "Cancelled" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn enrollment_and_invigilator_management() {
    let (app, state) = make_test_app().await;
    let db = state.db();
    let (marker, admin_token) = user_with_token(db, "admin", true).await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/exams",
            &admin_token,
            exam_body("MATH101"),
        ))
        .await
        .unwrap();
    let exam_id = response_json(response).await["data"]["id"].as_i64().unwrap();

    let student = db::models::student::Model::create(db, "Thandi Moyo", "R2301234", "BSc CS", "AB12CD34")
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            &format!("/api/exams/{exam_id}/students"),
            &admin_token,
            json!({ "student_id": student.id, "seat_number": "A12" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate enrollment conflicts.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            &format!("/api/exams/{exam_id}/students"),
            &admin_token,
            json!({ "student_id": student.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            &format!("/api/exams/{exam_id}/invigilators"),
            &admin_token,
            json!({ "user_id": marker.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/exams/{exam_id}/students"), &admin_token))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["data"][0]["seat_number"], "A12");

    let response = app
        .oneshot(authed_json_request(
            "DELETE",
            &format!("/api/exams/{exam_id}/students/{}", student.id),
            &admin_token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn assigning_an_invigilator_to_a_missing_exam_is_not_found() {
    let (app, state) = make_test_app().await;
    let db = state.db();
    let (admin, admin_token) = user_with_token(db, "admin", true).await;

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/exams/9999/invigilators",
            &admin_token,
            json!({ "user_id": admin.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Exam not found");
}

#[tokio::test]
async fn upcoming_lists_only_scannable_future_exams() {
    let (app, state) = make_test_app().await;
    let (_, admin_token) = user_with_token(state.db(), "admin", true).await;

    let mut body = exam_body("MATH101");
    body["exam_date"] = json!("2099-01-01");
    let response = app
        .clone()
        .oneshot(authed_json_request("POST", "/api/exams", &admin_token, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut past = exam_body("HIST101");
    past["exam_date"] = json!("2020-01-01");
    let response = app
        .clone()
        .oneshot(authed_json_request("POST", "/api/exams", &admin_token, past))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(authed_get("/api/exams/upcoming", &admin_token))
        .await
        .unwrap();
    let body = response_json(response).await;
    let codes: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["exam_code"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(codes, vec!["MATH101"]);
}
