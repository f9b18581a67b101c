use async_trait::async_trait;
use axum::Router;
use sea_orm::DatabaseConnection;

use crate::context::ModuleCtx;

/// Core module: DI/wiring; do not rely on migrated schema here.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Short stable name; also the key of the module's section in the config bag.
    fn name(&self) -> &'static str;

    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()>;
}

#[async_trait]
pub trait DbModule: Send + Sync {
    /// Runs AFTER init, BEFORE REST.
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()>;
}

/// Pure wiring; must be sync. Runs AFTER DB migrations.
pub trait RestfulModule: Send + Sync {
    fn register_rest(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router>;
}
