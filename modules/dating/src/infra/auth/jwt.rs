use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::contract::SessionToken;
use crate::domain::ports::SessionIssuer;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    iat: i64,
    exp: i64,
}

/// HS256 session tokens carrying the member id.
pub struct JwtSessions {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtSessions {
    pub fn new(secret: &[u8], ttl: Duration) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }
}

impl SessionIssuer for JwtSessions {
    fn issue(&self, user_id: &str) -> anyhow::Result<SessionToken> {
        let iat = Utc::now().timestamp();
        let ttl_secs = i64::try_from(self.ttl.as_secs()).context("session ttl too large")?;
        let claims = Claims {
            id: user_id.to_owned(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        };
        let value = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("sign session token")?;
        Ok(SessionToken {
            value,
            max_age_secs: self.ttl.as_secs(),
        })
    }

    fn verify(&self, token: &str) -> anyhow::Result<String> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .context("invalid session token")?;
        Ok(data.claims.id)
    }
}
