use serde::{Deserialize, Serialize};

/// HTTP host settings, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    pub cors_enabled: bool,
    /// Per-request handler deadline; 0 disables the timeout layer.
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            cors_enabled: false,
            request_timeout_secs: 30,
            body_limit_bytes: 16 * 1024 * 1024,
        }
    }
}
