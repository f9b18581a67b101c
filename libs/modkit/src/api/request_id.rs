//! Request id of the HTTP request being served.
//!
//! The ingress puts the `x-request-id` value in task-local scope around the
//! whole handler chain, so error mappers can stamp it on problem bodies
//! without threading it through every call. Task-locals are not inherited by
//! spawned tasks; wrap such work in [`scope_request_id`] again.

use std::future::Future;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// The current request id, if one is in scope.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}

/// Runs `fut` with `id` as the current request id.
pub async fn scope_request_id<F>(id: String, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(id, fut).await
}
