use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use utoipa::OpenApi;

use crate::api::rest::handlers;
use crate::api::rest::openapi::ApiDoc;
use crate::api::rest::rate_limit::{self, RateLimiter};
use crate::domain::service::Service;

/// Room for the text fields and multipart framing around the picture.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    chat_limiter: RateLimiter,
    max_upload_bytes: usize,
) -> Router {
    let chat = Router::new()
        .route("/chat", post(handlers::send_message))
        .route_layer(from_fn_with_state(chat_limiter, rate_limit::enforce));

    router
        .route("/", get(handlers::welcome))
        .route(
            "/profile",
            get(handlers::get_profile)
                .put(handlers::update_profile)
                .layer(DefaultBodyLimit::max(
                    max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES),
                )),
        )
        .route("/search", get(handlers::search))
        .route(
            "/matches",
            get(handlers::list_matches).post(handlers::create_match),
        )
        .route("/settings", post(handlers::settings))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(chat)
        .layer(Extension(service))
}
