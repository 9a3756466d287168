//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `host.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - BrokerConfig: Blynk cloud host + static auth token.
//!     - PollingConfig: How often the sensor pins are re-read.
//!     - ServerConfig: Where the dashboard listens.
//!     - ControlConfig: Optional manual-vs-auto lockout.
//!     - LoggingConfig: Log level and per-reading output.
//!     - HistoryConfig: Refresh hint for the history view.
//!
//! the auth token can also come from BLYNK_AUTH_TOKEN so it stays out of
//! the file.
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::Path;

pub const AUTH_TOKEN_ENV: &str = "BLYNK_AUTH_TOKEN";

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HostConfig {
    pub broker: BrokerConfig,
    pub polling: PollingConfig,
    pub server: ServerConfig,
    pub control: ControlConfig,
    pub logging: LoggingConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub scheme: String,
    pub auth_token: String,
}

impl BrokerConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "blynk.cloud".to_string(),
            scheme: "https".to_string(),
            auth_token: "YourBlynkAuthToken".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_seconds: 5 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:3000".to_string() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ControlConfig {
    /// refuse extend/retract while the device reports auto mode
    pub lock_manual_in_auto: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub show_sensor_data: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), show_sensor_data: true }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub refresh_seconds: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { refresh_seconds: 30 }
    }
}

impl HostConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::parse(&content)
    }

    /// Parse and validate a TOML document
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: HostConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        if config.polling.interval_seconds == 0 {
            anyhow::bail!("polling.interval_seconds must be at least 1");
        }
        if config.broker.auth_token.trim().is_empty() {
            anyhow::bail!("broker.auth_token must not be empty");
        }

        Ok(config)
    }

    /// Load with default fallback, then apply environment overrides
    pub fn load_or_default() -> Self {
        let mut config = Self::load_from_search_paths();
        if let Ok(token) = std::env::var(AUTH_TOKEN_ENV) {
            config.apply_token_override(token);
        }
        config
    }

    fn load_from_search_paths() -> Self {
        let paths = [
            std::path::PathBuf::from("config").join("host.toml"),
            std::path::PathBuf::from("..").join("config").join("host.toml"),
        ];

        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        println!("[CONFIG] Loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        println!("[CONFIG] Warning: Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        println!("[CONFIG] Warning: No config file found - using defaults");
        Self::default()
    }

    fn apply_token_override(&mut self, token: String) {
        if !token.trim().is_empty() {
            println!("[CONFIG] Auth token taken from {}", AUTH_TOKEN_ENV);
            self.broker.auth_token = token;
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("┌─────────────────────────────────────────┐");
        println!("│           HOST CONFIGURATION            │");
        println!("├─────────────────────────────────────────┤");
        println!("│ Broker: {}", self.broker.base_url());
        println!("│ Poll Interval: {}s", self.polling.interval_seconds);
        println!("│ Dashboard: {}", self.server.bind);
        println!("│ Manual Lockout: {}", self.control.lock_manual_in_auto);
        println!("│ Log Level: {}", self.logging.level);
        println!("└─────────────────────────────────────────┘");
    }
}
