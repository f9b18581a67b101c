use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use tower::util::ServiceExt; // for `oneshot`

use api_ingress::{ApiIngress, ApiIngressConfig};

fn test_app() -> Router {
    let routes = Router::new()
        .route("/test", get(|| async { "ok" }))
        .route("/boom", get(boom));
    ApiIngress::new(ApiIngressConfig::default()).build_router(routes)
}

async fn boom() -> &'static str {
    panic!("handler exploded")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn generates_request_id_when_missing() {
    let response = test_app()
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert!(request_id.is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn preserves_incoming_request_id() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/test")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(request_id, Some("abc-123"));
}

#[tokio::test]
async fn unknown_route_is_a_problem_with_request_id() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/nowhere")
                .header("x-request-id", "missing-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let json = json_body(response).await;
    assert_eq!(json["status"], 404);
    assert_eq!(json["instance"], "/nowhere");
    assert_eq!(json["trace_id"], "missing-42");
}

#[tokio::test]
async fn panics_become_generic_500() {
    let response = test_app()
        .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().contains_key("x-request-id"));
    let json = json_body(response).await;
    assert_eq!(json["detail"], "Something went wrong!");
    assert!(!json.to_string().contains("handler exploded"));
}

#[tokio::test]
async fn generated_request_id_is_echoed_in_problem_body() {
    let response = test_app()
        .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let header = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("generated x-request-id");
    let json = json_body(response).await;
    assert_eq!(json["trace_id"], header.as_str());
}
