use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

/// Resolve the server home directory.
///
/// - `None` falls back to `$HOME/<default_subdir>` (`%APPDATA%` on Windows).
/// - A leading `~` is expanded against the same base.
/// - Relative paths are made absolute against the current directory.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        None => user_base_dir()?.join(default_subdir),
        Some(raw) => expand_tilde(raw.trim())?,
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("cannot create home dir {}", absolute.display()))?;
    }
    Ok(absolute)
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return user_base_dir();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(user_base_dir()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

fn user_base_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{var} is not set; configure server.home_dir explicitly"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");
        let out = resolve_home_dir(Some(target.to_string_lossy().into_owned()), ".amora", true)
            .unwrap();
        assert_eq!(out, target);
        assert!(out.is_dir());
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let out = resolve_home_dir(Some("some/relative".into()), ".amora", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("some/relative"));
    }

    #[test]
    fn plain_path_is_not_expanded() {
        assert_eq!(expand_tilde("/srv/amora").unwrap(), PathBuf::from("/srv/amora"));
    }
}
