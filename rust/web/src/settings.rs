//! Server settings with validation and environment overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid setting: {0}")]
    InvalidValue(String),
}

/// Application settings for the web server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    /// Bind host (name or address)
    pub host: String,
    /// Bind port; 0 lets the OS pick (used by tests)
    pub port: u16,
    /// Idle session lifetime in minutes
    pub session_ttl_minutes: u64,
    /// Emit logs as JSON instead of human-readable lines
    pub log_json: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            session_ttl_minutes: 24 * 60,
            log_json: false,
        }
    }
}

impl AppSettings {
    /// Defaults overridden by `BLUFFPOKER_HOST`, `BLUFFPOKER_PORT`,
    /// `BLUFFPOKER_SESSION_TTL_MINUTES` and `BLUFFPOKER_LOG_JSON`.
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Ok(host) = std::env::var("BLUFFPOKER_HOST") {
            settings.host = host;
        }
        if let Ok(port) = std::env::var("BLUFFPOKER_PORT") {
            settings.port = port
                .parse()
                .map_err(|_| SettingsError::InvalidValue(format!("port: {}", port)))?;
        }
        if let Ok(ttl) = std::env::var("BLUFFPOKER_SESSION_TTL_MINUTES") {
            settings.session_ttl_minutes = ttl
                .parse()
                .map_err(|_| SettingsError::InvalidValue(format!("session ttl: {}", ttl)))?;
        }
        if let Ok(json) = std::env::var("BLUFFPOKER_LOG_JSON") {
            settings.log_json = matches!(json.as_str(), "1" | "true" | "yes");
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.host.is_empty() {
            return Err(SettingsError::InvalidValue("host cannot be empty".to_string()));
        }
        if self.session_ttl_minutes == 0 {
            return Err(SettingsError::InvalidValue(
                "session_ttl_minutes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_ttl_minutes * 60)
    }
}
