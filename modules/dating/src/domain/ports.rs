//! Outbound ports for credential handling and file storage.

use async_trait::async_trait;

use crate::contract::{AvatarUpload, SessionToken};

/// One-way salted password hashing. Implementations may block; callers await.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plain: &str) -> anyhow::Result<String>;
    async fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool>;
}

/// Signed session tokens bound to a member id.
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, user_id: &str) -> anyhow::Result<SessionToken>;
    /// Returns the member id carried by a valid, unexpired token.
    fn verify(&self, token: &str) -> anyhow::Result<String>;
}

/// Storage for uploaded profile pictures.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Persists the upload and returns its generated file name.
    async fn store(&self, upload: &AvatarUpload) -> anyhow::Result<String>;
    /// Deletes a previously stored file by the name `store` returned.
    async fn remove(&self, name: &str) -> anyhow::Result<()>;
}
