use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kumactl_core::Credentials;
use serde::{Deserialize, Serialize};

use crate::config::config_dir;

/// Token saved by `kumactl login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCredentials {
    pub url: String,
    pub username: Option<String>,
    pub token: String,
}

fn creds_path(profile: &str) -> Result<PathBuf> {
    Ok(config_dir()?.join(format!("credentials.{profile}.json")))
}

pub fn load_from(path: &Path) -> Result<Option<StoredCredentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let creds = serde_json::from_str(&content)
        .with_context(|| format!("Invalid credentials file {}", path.display()))?;
    Ok(Some(creds))
}

pub fn save_to(path: &Path, creds: &StoredCredentials) -> Result<()> {
    let content = serde_json::to_string_pretty(creds)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_credentials(profile: &str) -> Result<Option<StoredCredentials>> {
    load_from(&creds_path(profile)?)
}

pub fn save_credentials(profile: &str, creds: &StoredCredentials) -> Result<()> {
    save_to(&creds_path(profile)?, creds)
}

pub fn remove_credentials(profile: &str) -> Result<bool> {
    let path = creds_path(profile)?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Picks credentials for a run: `--token`, then `--username`/`--password`,
/// then the token stored for the profile.
pub fn resolve_credentials(
    token: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
    stored: Option<&StoredCredentials>,
) -> Result<Credentials> {
    if let Some(token) = token {
        return Ok(Credentials::token(token));
    }
    match (username, password) {
        (Some(username), Some(password)) => return Ok(Credentials::password(username, password)),
        (Some(_), None) => anyhow::bail!("--password is required with --username"),
        (None, Some(_)) => anyhow::bail!("--username is required with --password"),
        (None, None) => {}
    }
    match stored {
        Some(creds) => Ok(Credentials::token(creds.token.clone())),
        None => anyhow::bail!(
            "No credentials given. Pass --username and --password, --token, or run `kumactl login`"
        ),
    }
}
