//! Google OAuth client credentials (user-provided).
//!
//! Stored at:
//!   ~/.config/gridcal/credentials.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

pub fn credentials_path() -> Result<PathBuf> {
    Ok(gridcal_core::config::base_dir()?.join("credentials.toml"))
}

pub fn load() -> Result<ClientCredentials> {
    load_from(&credentials_path()?)
}

pub fn load_from(path: &Path) -> Result<ClientCredentials> {
    if !path.exists() {
        anyhow::bail!(
            "Google credentials not found.\n\n\
            Create {} with:\n\n\
            client_id = \"your-client-id.apps.googleusercontent.com\"\n\
            client_secret = \"your-client-secret\"\n\n\
            See https://console.cloud.google.com/apis/credentials for setup.",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

    let creds: ClientCredentials = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse credentials from {}", path.display()))?;

    Ok(creds)
}
