use anyhow::Context;
use async_trait::async_trait;

use crate::domain::ports::PasswordHasher;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// bcrypt with a configurable cost. Hashing runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> anyhow::Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            anyhow::bail!("bcrypt cost {cost} out of range {MIN_COST}..={MAX_COST}");
        }
        Ok(Self { cost })
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let plain = plain.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .context("hashing task aborted")?
            .context("bcrypt hash failed")
    }

    async fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let plain = plain.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
            .await
            .context("verify task aborted")?
            .context("bcrypt verify failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_is_salted_and_verifies() {
        let hasher = BcryptHasher::new(MIN_COST).unwrap();
        let a = hasher.hash("s3cret").await.unwrap();
        let b = hasher.hash("s3cret").await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$2b$04$"));
        assert!(hasher.verify("s3cret", &a).await.unwrap());
        assert!(!hasher.verify("wrong", &a).await.unwrap());
    }

    #[test]
    fn cost_out_of_range_is_rejected() {
        assert!(BcryptHasher::new(3).is_err());
        assert!(BcryptHasher::new(32).is_err());
        assert!(BcryptHasher::new(10).is_ok());
    }
}
