use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::source::SourceId;

/// Environment variable consulted for the GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable consulted for the OpenWeatherMap API key.
pub const OPENWEATHER_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// Placeholder literals shipped in sample `.env` files; treated as "not
/// configured" rather than sent upstream.
const PLACEHOLDERS: &[&str] = &["seu_token_aqui", "sua_chave_aqui"];

/// Top-level configuration stored on disk.
///
/// Every field is optional; missing credentials fall back to the
/// environment via [`Config::with_env_fallback`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub github_token: Option<String>,
    pub openweather_api_key: Option<String>,

    /// Preferred reference currency for price lookups, e.g. "brl" or "usd".
    pub default_currency: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "dashboard", "dashboard-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Fill credentials missing from the file from the environment
    /// (`GITHUB_TOKEN`, `OPENWEATHERMAP_API_KEY`).
    #[must_use]
    pub fn with_env_fallback(mut self) -> Self {
        if sanitize(self.github_token.as_deref()).is_none() {
            self.github_token = env::var(GITHUB_TOKEN_ENV).ok();
        }
        if sanitize(self.openweather_api_key.as_deref()).is_none() {
            self.openweather_api_key = env::var(OPENWEATHER_KEY_ENV).ok();
        }
        self
    }

    /// Usable credential for a source, if it takes one.
    ///
    /// Empty strings and known placeholder literals count as absent.
    pub fn credential(&self, id: SourceId) -> Option<String> {
        match id {
            SourceId::Github => sanitize(self.github_token.as_deref()),
            SourceId::Weather => sanitize(self.openweather_api_key.as_deref()),
            SourceId::ViaCep | SourceId::CoinGecko => None,
        }
    }

    /// Resolve the reference currency: explicit flag > config file > "brl".
    pub fn currency(&self, flag: Option<&str>) -> String {
        flag.or(self.default_currency.as_deref()).unwrap_or("brl").to_lowercase()
    }
}

fn sanitize(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}
