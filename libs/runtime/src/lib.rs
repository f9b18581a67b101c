//! Process-level plumbing shared by the server binary and modules:
//! layered configuration loading and logging initialization.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{
    redact_credentials_in_dsn, AppConfig, CliArgs, DatabaseConfig, EmailConfig, LoggingConfig,
    Section, ServerConfig,
};
