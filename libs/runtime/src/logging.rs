use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";

fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" | "" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Returns true if target == prefix or target starts with "prefix::"
fn matches_target_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

// -------- rotating file sinks --------

type SharedRotation = Arc<Mutex<FileRotate<AppendTimestamp>>>;

#[derive(Clone)]
struct RotatingFile(SharedRotation);

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut file) => file.write(buf),
            // poisoned by a panicking writer: drop the record
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Ok(()),
        }
    }
}

/// Writer handle that discards output when no file is routed for a target.
struct MaybeFile(Option<RotatingFile>);

impl Write for MaybeFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-target files, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotatingFile>,
    by_prefix: HashMap<String, RotatingFile>,
}

impl FileRouter {
    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }

    fn resolve(&self, target: &str) -> Option<RotatingFile> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_target_prefix(target, prefix))
            .map(|(_, file)| file.clone())
            .or_else(|| self.default.clone())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = MaybeFile;

    fn make_writer(&'a self) -> Self::Writer {
        MaybeFile(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        MaybeFile(self.resolve(meta.target()))
    }
}

/// Resolve a log file path against `base_dir` (home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating_file(section: &Section, base_dir: &Path) -> std::io::Result<RotatingFile> {
    let log_path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let rotation = FileRotate::new(
        &log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(section.max_backups.unwrap_or(3))),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(RotatingFile(Arc::new(Mutex::new(rotation))))
}

// -------- filter assembly --------

struct Plan {
    console: Targets,
    file: Targets,
    router: FileRouter,
}

fn plan(cfg: &LoggingConfig, base_dir: &Path) -> Plan {
    let mut console = Targets::new().with_default(LevelFilter::OFF);
    let mut file = Targets::new().with_default(LevelFilter::OFF);
    let mut router = FileRouter::default();

    for (name, section) in cfg {
        let has_file = !section.file.trim().is_empty();
        let sink = if has_file {
            match open_rotating_file(section, base_dir) {
                Ok(sink) => Some(sink),
                Err(e) => {
                    eprintln!("Failed to open log file '{}' for '{name}': {e}", section.file);
                    None
                }
            }
        } else {
            None
        };

        if name == DEFAULT_SECTION {
            console = console.with_default(parse_level(&section.console_level));
            if let Some(sink) = sink {
                file = file.with_default(parse_level(&section.file_level));
                router.default = Some(sink);
            }
        } else {
            console = console.with_target(name.clone(), parse_level(&section.console_level));
            if let Some(sink) = sink {
                file = file.with_target(name.clone(), parse_level(&section.file_level));
                router.by_prefix.insert(name.clone(), sink);
            }
        }
    }

    Plan {
        console,
        file,
        router,
    }
}

// -------- public init --------

/// Install the global subscriber.
/// - `cfg`: per-target sections; `default` applies to everything unmatched
/// - `base_dir`: relative log file paths are resolved against it (usually server.home_dir)
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = tracing_subscriber::fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let Plan {
        console,
        file,
        router,
    } = plan(cfg, base_dir);

    let console_layer = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console);

    let file_layer = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(file)
    });

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level("Warn"), LevelFilter::WARN);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level(""), LevelFilter::INFO);
        assert_eq!(parse_level("loud"), LevelFilter::INFO);
    }

    #[test]
    fn target_prefix_matching() {
        assert!(matches_target_prefix("dating", "dating"));
        assert!(matches_target_prefix("dating::domain::service", "dating"));
        assert!(!matches_target_prefix("dating_extra", "dating"));
        assert!(!matches_target_prefix("api_ingress", "dating"));
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let absolute = tmp.path().join("abs.log");
        assert_eq!(
            resolve_log_path(&absolute.to_string_lossy(), Path::new("/elsewhere")),
            absolute
        );
    }

    #[test]
    fn plan_routes_files_per_target() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("dating".into(), section("debug", "logs/dating.log", "trace"));
        cfg.insert("api_ingress".into(), section("warn", "", "info"));

        let plan = plan(&cfg, tmp.path());

        assert!(plan.router.default.is_some());
        assert!(plan.router.by_prefix.contains_key("dating"));
        assert!(!plan.router.by_prefix.contains_key("api_ingress"));
        assert!(tmp.path().join("logs").is_dir());
        assert!(plan.router.resolve("dating::api::rest").is_some());
    }

    #[test]
    fn router_without_files_drops_writes() {
        let router = FileRouter::default();
        assert!(router.is_empty());
        let mut writer = MaybeFile(router.resolve("anything"));
        assert_eq!(writer.write(b"dropped").unwrap(), 7);
    }
}
