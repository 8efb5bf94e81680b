//! Request validation at the HTTP boundary
//!
//! None of these requests reach the database, so the servers run over a
//! pool that never connects.

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::{json, Value};

fn assert_bad_request(response: &axum_test::TestResponse) {
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "BAD_REQUEST");
    assert_eq!(body["reason"], "Incorrectly made request.");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_blank_category_name_is_rejected() {
    let server = main_server_without_database();

    let response = server.post("/admin/categories").json(&json!({ "name": "   " })).await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let server = main_server_without_database();

    let response = server
        .post("/admin/users")
        .text("{\"name\": ")
        .content_type("application/json")
        .await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_non_numeric_path_id_is_rejected() {
    let server = main_server_without_database();

    let response = server.get("/categories/abc").await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_zero_page_size_is_rejected() {
    let server = main_server_without_database();

    let response = server.get("/categories").add_query_param("size", 0).await;
    assert_bad_request(&response);

    let response = server.get("/admin/users").add_query_param("from", -1).await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_unknown_sort_is_rejected() {
    let server = main_server_without_database();

    let response = server.get("/events").add_query_param("sort", "POPULARITY").await;
    let body = response.json::<Value>();
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("POPULARITY"));
}

#[tokio::test]
async fn test_inverted_public_range_is_rejected() {
    let server = main_server_without_database();

    let response = server
        .get("/events")
        .add_query_param("rangeStart", "2030-01-02 00:00:00")
        .add_query_param("rangeEnd", "2030-01-01 00:00:00")
        .await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_join_without_event_id_is_rejected() {
    let server = main_server_without_database();

    let response = server.post("/users/1/requests").await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_event_with_short_annotation_is_rejected() {
    let server = main_server_without_database();

    let mut body = new_event_body(1, 0, false);
    body["annotation"] = json!("too short");

    let response = server.post("/users/1/events").json(&body).await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_unknown_moderation_decision_is_rejected() {
    let server = main_server_without_database();

    let response = server
        .patch("/admin/comments/1")
        .json(&json!({ "status": "DELETED" }))
        .await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_main_health_reports_unreachable_database() {
    let server = main_server_without_database();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body = response.json::<Value>();
    assert_eq!(body["status"], "DOWN");
    assert_eq!(body["database"], false);
}

#[tokio::test]
async fn test_stats_requires_start_and_end() {
    let server = stats_server_without_database();

    let response = server.get("/stats").add_query_param("end", "2035-01-01 00:00:00").await;
    assert_bad_request(&response);
    assert!(response.json::<Value>()["message"].as_str().unwrap_or_default().contains("start"));

    let response = server.get("/stats").add_query_param("start", "2020-01-01 00:00:00").await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_stats_rejects_start_after_end() {
    let server = stats_server_without_database();

    let response = server
        .get("/stats")
        .add_query_param("start", "2035-01-01 00:00:00")
        .add_query_param("end", "2020-01-01 00:00:00")
        .await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_stats_rejects_unparseable_timestamp() {
    let server = stats_server_without_database();

    let response = server
        .get("/stats")
        .add_query_param("start", "yesterday")
        .add_query_param("end", "2035-01-01 00:00:00")
        .await;
    assert_bad_request(&response);
}

#[tokio::test]
async fn test_hit_with_invalid_ip_is_rejected() {
    let server = stats_server_without_database();

    let response = server
        .post("/hit")
        .json(&json!({
            "app": "ewm-main-service",
            "uri": "/events/1",
            "ip": "not-an-ip",
            "timestamp": "2022-09-06 11:00:23"
        }))
        .await;
    assert_bad_request(&response);
}
