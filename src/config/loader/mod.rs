use crate::config::Config;
use crate::config::credentials::apply_overrides_from;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a JSON config file when `--config` is not given.
pub const CONFIG_PATH_ENV: &str = "SHOPCRAB_CONFIG";

/// Load, override and validate the configuration. Any missing credential
/// fails here, at startup, rather than on the first webhook.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = read_config(config_path)?;
    config
        .validate()
        .with_context(|| "Configuration validation failed")?;
    Ok(config)
}

/// Load and apply environment overrides without validating.
pub fn read_config(config_path: Option<&Path>) -> Result<Config> {
    read_config_with(config_path, |key| std::env::var(key).ok())
}

/// The file `read_config` would load: `config_path` if given, else a
/// non-empty `$SHOPCRAB_CONFIG`, else none (defaults).
pub fn resolve_config_path(config_path: Option<&Path>) -> Option<PathBuf> {
    resolve_config_path_with(config_path, |key| std::env::var(key).ok())
}

pub(crate) fn resolve_config_path_with<F>(config_path: Option<&Path>, lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    match config_path {
        Some(p) => Some(p.to_path_buf()),
        None => lookup(CONFIG_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from),
    }
}

pub(crate) fn read_config_with<F>(config_path: Option<&Path>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let path = resolve_config_path_with(config_path, &lookup);

    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            check_file_permissions(&path);
            info!("loaded configuration from {}", path.display());
            serde_json::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config JSON from {}", path.display()))?
        }
        None => Config::default(),
    };

    apply_overrides_from(&mut config, lookup);
    Ok(config)
}

/// Warn if the config file is readable by group or others.
#[cfg(unix)]
fn check_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(
                "config file {} has permissions {:o}; recommend 0600",
                path.display(),
                mode & 0o777
            );
        }
    }
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &Path) {}
