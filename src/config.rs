//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The bearer token is referenced by env-var name in the config and
//! read by `auth::EnvCredentials` when a request needs it.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use crate::types::{GameKind, GameSpec};

const DEFAULT_TOKEN_ENV: &str = "MATKA_TOKEN";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Per-game overrides, keyed by backend game name ("Half Sangam").
    #[serde(default)]
    pub games: HashMap<String, GameConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// e.g. `https://backend.example.com/api`
    pub base_url: String,
    /// Absent means requests never time out.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub token_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GameConfig {
    pub winning_ratio: u32,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        if config.backend.base_url.trim().is_empty() {
            anyhow::bail!("backend.base_url must not be empty");
        }
        for name in config.games.keys() {
            name.parse::<GameKind>()
                .map_err(|e| anyhow::anyhow!("[games] {e}"))?;
        }
        Ok(config)
    }

    /// The game screen for `kind`, with any configured ratio applied.
    pub fn game(&self, kind: GameKind) -> GameSpec {
        self.games
            .iter()
            .find(|(name, _)| name.parse::<GameKind>().ok() == Some(kind))
            .map(|(_, g)| GameSpec::with_ratio(kind, g.winning_ratio))
            .unwrap_or_else(|| GameSpec::new(kind))
    }
}
