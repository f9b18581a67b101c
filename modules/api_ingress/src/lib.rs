//! HTTP host: wraps module routes with the shared middleware stack and serves them.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::http::{header, HeaderName, HeaderValue};
use axum::{middleware::from_fn, routing::get, Router};
use modkit::{Module, ModuleCtx};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
pub mod trace;
mod web;

pub use config::ApiIngressConfig;

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

#[async_trait]
impl Module for ApiIngress {
    fn name(&self) -> &'static str {
        "api_ingress"
    }

    async fn init(&self, ctx: &ModuleCtx) -> Result<()> {
        let cfg: ApiIngressConfig = ctx.module_config()?;
        tracing::debug!(
            cors_enabled = cfg.cors_enabled,
            request_timeout_secs = cfg.request_timeout_secs,
            body_limit_bytes = cfg.body_limit_bytes,
            "api_ingress configured"
        );
        self.config.store(cfg.into());
        Ok(())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Adds `/health`, the 404 fallback and the middleware stack to the module routes.
    pub fn build_router(&self, routes: Router) -> Router {
        let config = self.config.load();

        let mut router = routes
            .route("/health", get(web::health_check))
            .fallback(web::route_not_found);

        // Layers run outermost-last; read bottom-up for request order:
        // SecurityHeaders -> SetRequestId -> PropagateRequestId -> push_req_id_to_extensions
        // -> Trace -> CatchPanic -> Timeout -> CORS -> BodyLimit
        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        if config.request_timeout_secs > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )));
        }

        router = router.layer(CatchPanicLayer::custom(web::panic_to_problem));
        router = router.layer(trace::trace_layer());
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));

        // Set wraps Propagate
        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        with_security_headers(router)
    }

    /// Binds `addr` and serves until `shutdown` resolves; in-flight requests drain first.
    pub async fn serve<F>(&self, router: Router, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let local = listener.local_addr()?;
        tracing::info!(%local, "HTTP server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn with_security_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit::ModuleCtxBuilder;

    #[tokio::test]
    async fn init_without_section_keeps_defaults() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            cors_enabled: true,
            request_timeout_secs: 5,
            body_limit_bytes: 1,
        });
        let ctx = ModuleCtxBuilder::new("/tmp/amora")
            .build()
            .for_module("api_ingress");
        ingress.init(&ctx).await.unwrap();

        let cfg = ingress.config();
        assert!(!cfg.cors_enabled);
        assert_eq!(cfg.request_timeout_secs, 30);
    }
}
