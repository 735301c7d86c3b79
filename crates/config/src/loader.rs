use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::ConduitConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "conduit.toml",
    "conduit.yaml",
    "conduit.yml",
    "conduit.json",
];

/// Overrides `api.base_url` after loading.
pub const ENV_API_URL: &str = "CONDUIT_API_URL";
/// Overrides `api.api_key` after loading.
pub const ENV_API_KEY: &str = "CONDUIT_API_KEY";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<ConduitConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./conduit.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/conduit/conduit.{toml,yaml,yml,json}` (user-global)
///
/// Returns `ConduitConfig::default()` if no config file is found or it fails
/// to parse.
pub fn discover_and_load() -> ConduitConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    ConduitConfig::default()
}

/// Apply `CONDUIT_API_URL` / `CONDUIT_API_KEY` from the process environment.
pub fn apply_env_overrides(config: &mut ConduitConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut ConduitConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        debug!(base_url = %url, "api base url overridden from environment");
        config.api.base_url = url;
    }
    if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        debug!("api key overridden from environment");
        config.api.api_key = Some(Secret::new(key));
    }
}

fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/conduit/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "conduit").map(|d| d.config_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("conduit.toml")
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<ConduitConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
