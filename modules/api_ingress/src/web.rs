use std::any::Any;

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use modkit::{not_found, Problem, ProblemResponse};
use serde_json::{json, Value};

use crate::request_id::XRequestId;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Unrouted paths get a 404 problem carrying the request id.
pub async fn route_not_found(req: Request) -> ProblemResponse {
    let path = req.uri().path();
    let mut problem = not_found(format!("No route for {path}")).0.with_instance(path);
    if let Some(XRequestId(id)) = req.extensions().get::<XRequestId>() {
        problem = problem.with_trace_id(id.clone());
    }
    problem.into()
}

/// Converts a handler panic into the generic 500 problem.
pub fn panic_to_problem(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "handler panicked");

    ProblemResponse(
        Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Something went wrong!",
        )
        .with_code("INTERNAL"),
    )
    .into_response()
}
