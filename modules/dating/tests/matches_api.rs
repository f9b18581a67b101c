mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, get_request, json_request, spawn_app};

fn pair(user: &str, other: &str) -> serde_json::Value {
    json!({ "userId": user, "otherUserId": other })
}

#[tokio::test]
async fn pairing_is_created_once() {
    let app = spawn_app().await;

    let response = app
        .send(json_request("POST", "/matches", Some("u1"), &pair("u1", "u2")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["user"], "u1");
    assert_eq!(created["otherUser"], "u2");
    assert!(created["id"].as_str().is_some());
    assert!(created["createdAt"].as_str().is_some());

    let response = app
        .send(json_request("POST", "/matches", Some("u1"), &pair("u1", "u2")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Match already exists");
    assert_eq!(body["code"], "DATING_MATCH_ALREADY_EXISTS");
}

#[tokio::test]
async fn reversed_pair_counts_as_duplicate() {
    let app = spawn_app().await;

    let response = app
        .send(json_request("POST", "/matches", Some("u1"), &pair("u1", "u2")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(json_request("POST", "/matches", Some("u2"), &pair("u2", "u1")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Match already exists");
}

#[tokio::test]
async fn listing_covers_either_side_only() {
    let app = spawn_app().await;

    for (user, other) in [("u1", "u2"), ("u3", "u1"), ("u2", "u3")] {
        let response = app
            .send(json_request("POST", "/matches", Some(user), &pair(user, other)))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.send(get_request("/matches", Some("u1"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    for m in listed {
        assert!(m["user"] == "u1" || m["otherUser"] == "u1");
    }

    let response = app.send(get_request("/matches", Some("u4"))).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn missing_other_user_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .send(json_request(
            "POST",
            "/matches",
            Some("u1"),
            &json!({ "userId": "u1" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "\"otherUserId\" is required");
    assert_eq!(body["errors"][0]["pointer"], "/otherUserId");
}

#[tokio::test]
async fn pairing_with_oneself_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .send(json_request("POST", "/matches", Some("u1"), &pair("u1", "u1")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["errors"][0]["pointer"],
        "/otherUserId"
    );

    let response = app.send(get_request("/matches", Some("u1"))).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn non_json_body_is_a_bad_request() {
    let app = spawn_app().await;

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/matches")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", common::token_for("u1")))
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.send(req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "DATING_MALFORMED_BODY");
}

#[tokio::test]
async fn matches_require_a_session() {
    let app = spawn_app().await;

    let response = app.send(get_request("/matches", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request("POST", "/matches", None, &pair("u1", "u2")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["detail"],
        "Authentication required"
    );
}

#[tokio::test]
async fn problem_bodies_carry_the_request_id() {
    let app = spawn_app().await;

    let req = axum::http::Request::builder()
        .uri("/matches")
        .header("x-request-id", "rid-77")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(req).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-request-id"], "rid-77");
    assert_eq!(body_json(response).await["trace_id"], "rid-77");

    let response = app
        .send(json_request("POST", "/matches", Some("u1"), &pair("u1", "u1")))
        .await;
    let generated = response.headers()["x-request-id"]
        .to_str()
        .unwrap()
        .to_owned();
    assert_eq!(body_json(response).await["trace_id"], generated.as_str());
}
