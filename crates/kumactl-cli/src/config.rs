use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "http://127.0.0.1:3001";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub format: Option<String>,
}

pub type ConfigFile = BTreeMap<String, ProfileConfig>;

/// `$KUMACTL_HOME`, else `~/.kumactl`.
pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("KUMACTL_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .context("Cannot determine home directory")?
            .join(".kumactl"),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

pub fn save_to(path: &Path, all: &ConfigFile) -> Result<()> {
    let content = toml::to_string_pretty(all)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let all = load_from(&config_path()?)?;
    Ok(all.get(profile).cloned().unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    let path = config_path()?;
    let mut all = load_from(&path)?;
    all.insert(profile.to_string(), config.clone());
    save_to(&path, &all)
}

/// Applies `key = value` to a profile.
pub fn set_key(config: &mut ProfileConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "url" => config.url = Some(value.to_string()),
        "username" => config.username = Some(value.to_string()),
        "format" => {
            if crate::cli::OutputFormat::parse(value).is_none() {
                anyhow::bail!("Unknown format: {value}. Valid formats: json, yaml, table");
            }
            config.format = Some(value.to_string());
        }
        other => anyhow::bail!("Unknown config key: {other}. Valid keys: url, username, format"),
    }
    Ok(())
}

pub fn resolve_url(
    cli_url: &Option<String>,
    profile: &ProfileConfig,
    stored_url: Option<&str>,
) -> String {
    // 1. --url flag / KUMA_URL env
    if let Some(url) = cli_url {
        return url.clone();
    }
    // 2. config.toml profile
    if let Some(url) = &profile.url {
        return url.clone();
    }
    // 3. Stored login for this profile
    if let Some(url) = stored_url {
        return url.to_string();
    }
    DEFAULT_URL.to_string()
}
