use async_trait::async_trait;

use crate::contract::{Match, User};

/// Persistence the domain needs for member profiles.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>>;
    /// Registration lives outside this module; used by seeding and tests.
    async fn insert(&self, u: User) -> anyhow::Result<()>;
    /// Update an existing user (by primary key in `u.id`).
    async fn update(&self, u: User) -> anyhow::Result<()>;
}

/// Persistence for pairings.
#[async_trait]
pub trait MatchesRepository: Send + Sync {
    /// Pairing between `a` and `b` in either side order.
    async fn find_pair(&self, a: &str, b: &str) -> anyhow::Result<Option<Match>>;
    /// Returns `false` when the normalized pair already exists.
    async fn insert_if_absent(&self, m: Match) -> anyhow::Result<bool>;
    /// Every pairing with `user_id` on either side, oldest first.
    async fn list_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Match>>;
}
