use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{DbModule, Module, ModuleCtxBuilder, RestfulModule};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Serves the `modules` bag of the application config to modkit.
struct ModkitConfigAdapter(HashMap<String, serde_json::Value>);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get(module_name)
    }
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Amora Server - dating app backend
#[derive(Parser)]
#[command(name = "amora-server")]
#[command(about = "Amora Server - dating app backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Amora Server starting");
    tracing::debug!(server = ?config.server, "Effective server configuration");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case("sqlite::memory:") {
        return Ok("sqlite");
    }

    let url = Url::parse(raw).map_err(|e| {
        anyhow!(
            "Invalid database DSN '{}': {}",
            runtime::redact_credentials_in_dsn(Some(raw)),
            e
        )
    })?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn connect_db(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let backend = detect_from_dsn(db_config)?;

    let mut dsn = db_config.url.trim().to_owned();
    // Absolutize sqlite DSNs to avoid cwd issues
    if dsn.starts_with("sqlite:") {
        dsn = absolutize_sqlite_dsn(&dsn, base_dir, true)?;
    }
    let in_memory = dsn == "sqlite::memory:";

    let mut opts = ConnectOptions::new(dsn.clone());
    // Every pooled connection to `sqlite::memory:` would open its own database.
    let max_conns = if in_memory {
        1
    } else {
        db_config.max_conns.unwrap_or(10)
    };
    opts.max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let safe_dsn = runtime::redact_credentials_in_dsn(Some(&dsn));
    tracing::info!(backend, dsn = %safe_dsn, "Connecting to database");
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to database at {safe_dsn}"))?;

    if backend == "sqlite" {
        if let Some(ms) = db_config.busy_timeout_ms {
            use sea_orm::ConnectionTrait;
            db.execute_unprepared(&format!("PRAGMA busy_timeout = {ms}"))
                .await
                .context("Failed to set SQLite busy timeout")?;
        }
    }

    Ok(db)
}

/// `server.timeout_sec` is the request timeout unless `api_ingress` sets its own.
fn apply_server_timeout(config: &mut AppConfig) {
    let timeout = config.server.timeout_sec;
    if timeout == 0 {
        return;
    }
    let section = config
        .modules
        .entry("api_ingress".to_string())
        .or_insert_with(|| serde_json::json!({}));
    if let Some(map) = section.as_object_mut() {
        map.entry("request_timeout_secs")
            .or_insert_with(|| serde_json::json!(timeout));
    }
}

async fn run_server(mut config: AppConfig) -> Result<()> {
    let email_configured = config.email.as_ref().is_some_and(|e| e.is_configured());
    if email_configured {
        tracing::info!("Email credentials configured");
    } else {
        tracing::info!("Email credentials not configured");
    }

    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("Database configuration is required"))?;
    let home_dir = PathBuf::from(&config.server.home_dir);
    let db = connect_db(&db_config, &home_dir).await?;

    apply_server_timeout(&mut config);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    tracing::info!("Initializing modules...");
    let base_ctx = ModuleCtxBuilder::new(home_dir)
        .with_db(db.clone())
        .with_config_provider(Arc::new(ModkitConfigAdapter(config.modules.clone())))
        .build();

    let ingress = api_ingress::ApiIngress::default();
    let dating = dating::Dating::default();

    ingress
        .init(&base_ctx.for_module(ingress.name()))
        .await
        .context("api_ingress init failed")?;
    let dating_ctx = base_ctx.for_module(dating.name());
    dating.init(&dating_ctx).await.context("dating init failed")?;
    dating.migrate(&db).await.context("dating migrations failed")?;

    let routes = dating.register_rest(&dating_ctx, axum::Router::new())?;
    let router = ingress.build_router(routes);

    ingress
        .serve(router, addr, async {
            if let Err(e) = modkit::runtime::wait_for_shutdown().await {
                tracing::error!(error = %e, "Shutdown signal handler failed");
            }
        })
        .await?;

    tracing::info!("Amora Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        let backend = detect_from_dsn(db)?;
        tracing::info!(backend, "Database configuration is valid");
    }
    format!("{}:{}", config.server.host, config.server.port)
        .parse::<SocketAddr>()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
