//! Dashboard configuration loaded from TOML.
//!
//! Every section and field is optional; anything missing takes the built-in
//! default. `TRADEBOARD_URL` overrides the configured server address.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Interval;
use crate::locale::Locale;
use crate::request::{FormState, StrategyParams};

/// Environment variable that overrides `server.base_url`.
pub const URL_ENV: &str = "TRADEBOARD_URL";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeboardConfig {
    pub server: ServerConfig,
    pub defaults: DefaultsConfig,
    pub params: StrategyParams,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// `0` disables the client-side timeout.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub symbol: String,
    pub interval: Interval,
    pub months: u32,
    pub initial_balance: f64,
    pub candle_limit: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            symbol: crate::gateway::DEFAULT_SYMBOL.to_string(),
            interval: Interval::M1,
            months: 1,
            initial_balance: 10.0,
            candle_limit: crate::pipeline::DEFAULT_CANDLE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub locale: Locale,
    /// Log file for the TUI; `None` uses `tradeboard.log` in the config dir.
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl TradeboardConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse tradeboard config TOML")
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Load an explicitly named file (which must exist), or defaults when no
    /// path is given; then apply the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_override(std::env::var(URL_ENV).ok());
        Ok(config)
    }

    /// Load the implicit default location: a missing file means defaults,
    /// a present but broken one is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        Self::load(Some(path).filter(|p| p.exists()))
    }

    /// Replace the server URL when an override is given and non-empty.
    pub fn apply_env_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.server.base_url = url.trim().to_string();
        }
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize tradeboard config")
    }

    /// Initial dashboard form built from the configured defaults.
    pub fn initial_form(&self) -> FormState {
        FormState {
            symbol: self.defaults.symbol.clone(),
            months: self.defaults.months,
            interval: self.defaults.interval,
            initial_balance: self.defaults.initial_balance,
            params: self.params.clone(),
            ..FormState::default()
        }
    }
}
