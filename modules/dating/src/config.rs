use serde::{Deserialize, Serialize};

/// Configuration for the dating module (`modules.dating`).
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DatingConfig {
    /// HS256 signing secret. Empty means a random per-process secret.
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub bcrypt_cost: u32,
    pub min_age_years: u32,
    /// Relative paths resolve against `server.home_dir`.
    pub uploads_dir: String,
    pub max_upload_bytes: usize,
    pub max_name_length: usize,
    pub max_bio_length: usize,
    pub chat_rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

impl Default for DatingConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 7 * 24 * 60 * 60,
            bcrypt_cost: 10,
            min_age_years: 18,
            uploads_dir: "uploads".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            max_name_length: 100,
            max_bio_length: 2000,
            chat_rate_limit: RateLimitConfig::default(),
        }
    }
}

impl std::fmt::Debug for DatingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatingConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("min_age_years", &self.min_age_years)
            .field("uploads_dir", &self.uploads_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_name_length", &self.max_name_length)
            .field("max_bio_length", &self.max_bio_length)
            .field("chat_rate_limit", &self.chat_rate_limit)
            .finish()
    }
}
