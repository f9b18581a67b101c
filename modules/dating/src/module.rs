use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::rest::rate_limit::RateLimiter;
use crate::api::rest::routes;
use crate::config::DatingConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::auth::{BcryptHasher, JwtSessions};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::{SeaOrmMatchesRepository, SeaOrmUsersRepository};
use crate::infra::uploads::LocalAvatarStore;

/// Everything the REST layer needs, built once in `init`.
struct Wired {
    service: Arc<Service>,
    chat_limiter: RateLimiter,
    max_upload_bytes: usize,
}

/// Profiles, pairings and chat intents.
#[derive(Default)]
pub struct Dating {
    wired: ArcSwapOption<Wired>,
}


#[async_trait]
impl Module for Dating {
    fn name(&self) -> &'static str {
        "dating"
    }

    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing dating module");

        let cfg: DatingConfig = ctx.module_config()?;
        debug!(config = ?cfg, "Loaded dating config");

        let db = ctx
            .db()
            .ok_or_else(|| anyhow::anyhow!("dating module requires a database"))?;

        let secret = if cfg.jwt_secret.is_empty() {
            warn!("JWT secret is not configured; sessions will not survive a restart");
            ephemeral_secret()
        } else {
            cfg.jwt_secret.clone()
        };
        let sessions =
            JwtSessions::new(secret.as_bytes(), Duration::from_secs(cfg.token_ttl_secs))?;
        let hasher = BcryptHasher::new(cfg.bcrypt_cost)?;

        let uploads_dir = ctx.home_dir().join(Path::new(&cfg.uploads_dir));
        debug!(dir = %uploads_dir.display(), "Avatar uploads directory");

        let service = Service::new(
            Arc::new(SeaOrmUsersRepository::new(db.clone())),
            Arc::new(SeaOrmMatchesRepository::new(db)),
            Arc::new(hasher),
            Arc::new(sessions),
            Arc::new(LocalAvatarStore::new(uploads_dir)),
            ServiceConfig {
                min_age_years: cfg.min_age_years,
                max_name_length: cfg.max_name_length,
                max_bio_length: cfg.max_bio_length,
            },
        );

        self.wired.store(Some(Arc::new(Wired {
            service: Arc::new(service),
            chat_limiter: RateLimiter::from_config(&cfg.chat_rate_limit),
            max_upload_bytes: cfg.max_upload_bytes,
        })));
        Ok(())
    }
}

#[async_trait]
impl DbModule for Dating {
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running dating database migrations");
        Migrator::up(db, None).await?;
        info!("Dating database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for Dating {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering dating REST routes");

        let wired = self
            .wired
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;

        Ok(routes::register_routes(
            router,
            wired.service.clone(),
            wired.chat_limiter.clone(),
            wired.max_upload_bytes,
        ))
    }
}

/// Random per-process signing key.
fn ephemeral_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
