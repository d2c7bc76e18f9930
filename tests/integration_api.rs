//! API Integration Tests

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware,
};
use campus_pulse::api;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::util::ServiceExt;
use uuid::Uuid;

mod common;

fn test_app(pool: PgPool) -> axum::Router {
    api::create_router()
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            campus_pulse::api::middleware::auth_middleware,
        ))
        .with_state(pool)
}

fn request(method: &str, uri: &str, user_id: Uuid, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-User-Id", user_id.to_string());

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_registration_lifecycle_e2e() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_e2e", "organizer").await;
    let student_a = common::seed_user(&pool, "student_a", "student").await;
    let student_b = common::seed_user(&pool, "student_b", "student").await;
    let student_c = common::seed_user(&pool, "student_c", "student").await;

    // 1. Organizer creates a capacity-2 event
    let req = request(
        "POST",
        "/events",
        organizer,
        Some(json!({
            "title": "Intro to Databases",
            "description": "Hands-on workshop",
            "category": "workshop",
            "venue": "Lab 3",
            "start_date": "2026-09-20T10:00:00Z",
            "end_date": "2026-09-20T14:00:00Z",
            "capacity": 2
        })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Event creation failed");
    let event = json_body(response).await;
    let event_id: Uuid = event["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(event["registered_count"], 0);

    // 2. Students A and B register successfully
    let req = request("POST", &format!("/registrations/{}", event_id), student_a, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Registration A failed");
    let reg_a = json_body(response).await;
    let reg_a_id: Uuid = reg_a["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(reg_a["credential"].as_str().unwrap().len(), 64);
    assert!(!reg_a["credential_image"].as_str().unwrap().is_empty());

    let req = request("POST", &format!("/registrations/{}", event_id), student_b, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Registration B failed");

    // 3. Student C is rejected: the event is full
    let req = request("POST", &format!("/registrations/{}", event_id), student_c, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error = json_body(response).await;
    assert_eq!(error["error_code"], "capacity_exceeded");

    // 4. Organizer checks student A in; a second check-in is a no-op
    let req = request(
        "POST",
        &format!("/registrations/checkin/{}", reg_a_id),
        organizer,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = json_body(response).await;
    assert_eq!(first["status"], "ok");
    let checked_in_at = first["checked_in_at"].as_str().unwrap().to_string();

    let req = request(
        "POST",
        &format!("/registrations/checkin/{}", reg_a_id),
        organizer,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = json_body(response).await;
    assert_eq!(second["status"], "already_checked_in");
    assert_eq!(second["checked_in_at"].as_str().unwrap(), checked_in_at);

    // 5. Analytics reflect 2 registrations, 1 attendee
    let req = request("GET", &format!("/analytics/event/{}", event_id), organizer, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let analytics = json_body(response).await;
    assert_eq!(analytics["total_registrations"], 2);
    assert_eq!(analytics["checked_in"], 1);
    assert_eq!(analytics["attendance_rate"], 50.0);

    // 6. Student A (attended) leaves feedback; a duplicate is rejected
    let req = request(
        "POST",
        "/feedbacks",
        student_a,
        Some(json!({"event_id": event_id, "rating": 5, "comment": "Great session"})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let req = request(
        "POST",
        "/feedbacks",
        student_a,
        Some(json!({"event_id": event_id, "rating": 4, "comment": "Changed my mind"})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error = json_body(response).await;
    assert_eq!(error["error_code"], "feedback_already_submitted");

    // 7. Student B never checked in, so feedback is refused
    let req = request(
        "POST",
        "/feedbacks",
        student_b,
        Some(json!({"event_id": event_id, "rating": 3, "comment": ""})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let error = json_body(response).await;
    assert_eq!(error["error_code"], "feedback_not_allowed");

    // 8. Analytics now include the single rating
    let req = request("GET", &format!("/analytics/event/{}", event_id), organizer, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let analytics = json_body(response).await;
    assert_eq!(analytics["feedback_count"], 1);
    assert_eq!(analytics["average_rating"], 5.0);
}

#[tokio::test]
async fn test_only_students_can_register() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_roles", "organizer").await;
    let event_id = common::seed_event(&pool, organizer, 10).await;

    let req = request("POST", &format!("/registrations/{}", event_id), organizer, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_students_cannot_manage_events() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_gates", "organizer").await;
    let student = common::seed_user(&pool, "student_gates", "student").await;
    let event_id = common::seed_event(&pool, organizer, 10).await;

    let req = request(
        "POST",
        "/events",
        student,
        Some(json!({
            "title": "Rogue Event",
            "category": "other",
            "start_date": "2026-10-01T10:00:00Z",
            "end_date": "2026-10-01T12:00:00Z",
            "capacity": 5
        })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let req = request("GET", "/events/organizer/my-events", student, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let req = request("GET", &format!("/registrations/event/{}", event_id), student, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_closed_event_rejected() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_closed", "organizer").await;
    let student = common::seed_user(&pool, "student_closed", "student").await;
    let event_id = common::seed_event(&pool, organizer, 10).await;

    sqlx::query("UPDATE events SET status = 'completed' WHERE id = $1")
        .bind(event_id)
        .execute(&pool)
        .await
        .unwrap();

    let req = request("POST", &format!("/registrations/{}", event_id), student, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error = json_body(response).await;
    assert_eq!(error["error_code"], "event_not_open");
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_dup", "organizer").await;
    let student = common::seed_user(&pool, "student_dup", "student").await;
    let event_id = common::seed_event(&pool, organizer, 10).await;

    let req = request("POST", &format!("/registrations/{}", event_id), student, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let req = request("POST", &format!("/registrations/{}", event_id), student, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error = json_body(response).await;
    assert_eq!(error["error_code"], "already_registered");

    // Capacity was consumed exactly once
    let count: i32 = sqlx::query_scalar("SELECT registered_count FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_checkin_by_credential() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_cred", "organizer").await;
    let student = common::seed_user(&pool, "student_cred", "student").await;
    let event_id = common::seed_event(&pool, organizer, 10).await;

    let req = request("POST", &format!("/registrations/{}", event_id), student, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let registration = json_body(response).await;
    let image = registration["credential_image"].as_str().unwrap().to_string();

    // The scanned payload resolves to the registration and checks it in
    let req = request(
        "POST",
        "/registrations/checkin",
        organizer,
        Some(json!({"credential": image})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["status"], "ok");

    // A fabricated token is indistinguishable from a missing one
    let req = request(
        "POST",
        "/registrations/checkin",
        organizer,
        Some(json!({"credential": "0".repeat(64)})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = json_body(response).await;
    assert_eq!(error["error_code"], "invalid_credential");
}

#[tokio::test]
async fn test_event_analytics_with_no_registrations() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_empty", "organizer").await;
    let event_id = common::seed_event(&pool, organizer, 10).await;

    let req = request("GET", &format!("/analytics/event/{}", event_id), organizer, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let analytics = json_body(response).await;
    assert_eq!(analytics["total_registrations"], 0);
    assert_eq!(analytics["attendance_rate"], 0.0);
    assert_eq!(analytics["average_rating"], 0.0);
}

#[tokio::test]
async fn test_dashboard_requires_admin() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_dash", "organizer").await;
    let admin = common::seed_user(&pool, "admin_dash", "admin").await;
    common::seed_event(&pool, organizer, 5).await;

    let req = request("GET", "/analytics/dashboard", organizer, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let req = request("GET", "/analytics/dashboard", admin, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = json_body(response).await;
    assert_eq!(dashboard["total_users"], 2);
    assert_eq!(dashboard["organizers"], 1);
    assert_eq!(dashboard["total_events"], 1);
    assert_eq!(dashboard["events_by_category"]["workshop"], 1);
}

#[tokio::test]
async fn test_event_access_restricted_to_owner() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let owner = common::seed_user(&pool, "organizer_owner", "organizer").await;
    let other = common::seed_user(&pool, "organizer_other", "organizer").await;
    let admin = common::seed_user(&pool, "admin_owner", "admin").await;
    let event_id = common::seed_event(&pool, owner, 5).await;

    let uri = format!("/registrations/event/{}", event_id);

    let req = request("GET", &uri, other, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let req = request("GET", &uri, owner, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = request("GET", &uri, admin, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let student = common::seed_user(&pool, "student_404", "student").await;

    let req = request("GET", &format!("/events/{}", Uuid::new_v4()), student, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = json_body(response).await;
    assert_eq!(error["error_code"], "event_not_found");
}

#[tokio::test]
async fn test_missing_identity_header_rejected() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let req = Request::builder()
        .method("GET")
        .uri("/events")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri("/events")
        .header("X-User-Id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_list_filters() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool.clone());

    let organizer = common::seed_user(&pool, "organizer_filter", "organizer").await;
    let event_id = common::seed_event(&pool, organizer, 5).await;

    let req = request("GET", "/events?category=workshop", organizer, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events = json_body(response).await;
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["id"].as_str().unwrap(), event_id.to_string());

    let req = request("GET", "/events?category=sports", organizer, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let events = json_body(response).await;
    assert!(events.as_array().unwrap().is_empty());
}
