//! Fixed-window request ceiling per client address.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use modkit::too_many_requests;
use tracing::warn;

use crate::config::RateLimitConfig;

/// Expired counters are swept once this many clients are tracked,
/// at most once per window.
const SWEEP_THRESHOLD: usize = 10_000;

static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

struct Inner {
    window: Duration,
    max_requests: u32,
    hits: DashMap<String, Window>,
    created: Instant,
    /// Millis since `created` of the last sweep.
    last_sweep_ms: AtomicU64,
}

/// Cheap to clone; clones share counters.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                window,
                max_requests,
                hits: DashMap::new(),
                created: Instant::now(),
                last_sweep_ms: AtomicU64::new(0),
            }),
        }
    }

    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self::new(Duration::from_secs(cfg.window_secs), cfg.max_requests)
    }

    pub fn max_requests(&self) -> u32 {
        self.inner.max_requests
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        if self.inner.hits.len() >= SWEEP_THRESHOLD && self.claim_sweep(now) {
            self.sweep(now);
        }

        let window = self.inner.window;
        let mut entry = self.inner.hits.entry(key.to_owned()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.inner.max_requests {
            let elapsed = now.duration_since(entry.started);
            return Decision::Limited {
                retry_after: window.saturating_sub(elapsed),
            };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.inner.max_requests - entry.count,
        }
    }

    /// True for the one caller that should sweep; others see a recent sweep.
    fn claim_sweep(&self, now: Instant) -> bool {
        let now_ms = millis(now.saturating_duration_since(self.inner.created));
        let last = self.inner.last_sweep_ms.load(Ordering::Relaxed);
        if now_ms.saturating_sub(last) < millis(self.inner.window) {
            return false;
        }
        self.inner
            .last_sweep_ms
            .compare_exchange(last, now_ms, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    fn sweep(&self, now: Instant) {
        let window = self.inner.window;
        self.inner
            .hits
            .retain(|_, w| now.duration_since(w.started) < window);
    }
}

/// Socket peer address; `X-Forwarded-For` only when no peer is known.
fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown".to_owned())
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn ceil_secs(d: Duration) -> u64 {
    (d.as_secs() + u64::from(d.subsec_nanos() > 0)).max(1)
}

/// Middleware for `from_fn_with_state`: 429 with `retry-after` once the ceiling is hit.
pub async fn enforce(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    let key = client_key(&req);
    match limiter.check(&key) {
        Decision::Allowed { remaining } => {
            let mut res = next.run(req).await;
            let headers = res.headers_mut();
            headers.insert(X_RATELIMIT_LIMIT.clone(), limiter.max_requests().into());
            headers.insert(X_RATELIMIT_REMAINING.clone(), remaining.into());
            res
        }
        Decision::Limited { retry_after } => {
            let secs = ceil_secs(retry_after);
            warn!(client = %key, retry_after_secs = secs, "Rate limit exceeded");
            let problem = too_many_requests("Too many requests, please try again later.")
                .0
                .with_instance(req.uri().path());
            let mut res = modkit::ProblemResponse(problem).into_response();
            let headers = res.headers_mut();
            headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
            headers.insert(X_RATELIMIT_LIMIT.clone(), limiter.max_requests().into());
            headers.insert(X_RATELIMIT_REMAINING.clone(), HeaderValue::from(0u32));
            res
        }
    }
}
