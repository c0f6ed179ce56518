//! Client configuration loaded from TOML
//!
//! Every section has defaults, unknown keys are rejected, and the whole
//! file is validated once at load time.

use crate::notifications::NotificationConfig;
use chill_core::{Error, Result};
use chill_networking::http::{ClientOptions, DEFAULT_BASE_URL, DEFAULT_SESSION_COOKIE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable that overrides `session.token`
pub const TOKEN_ENV: &str = "CHILL_SESSION_TOKEN";
/// Environment variable that overrides `api.base_url`
pub const BASE_URL_ENV: &str = "CHILL_API_BASE_URL";

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

/// Session cookie settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSection {
    pub cookie_name: String,
    pub token: Option<String>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            token: None,
        }
    }
}

/// Query cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSection {
    /// Age after which cached data is refetched on focus
    pub stale_after_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { stale_after_secs: 60 }
    }
}

/// Presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
    pub locale: String,
    /// JSON translation catalog; built-in English text is used without one
    pub catalog_path: Option<PathBuf>,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            catalog_path: None,
        }
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub api: ApiSection,
    pub session: SessionSection,
    pub cache: CacheSection,
    pub notifications: NotificationConfig,
    pub display: DisplaySection,
}

impl ClientConfig {
    /// `<config dir>/ChillStay/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|p| p.join("ChillStay").join("config.toml"))
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: ClientConfig =
            toml::from_str(raw).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    /// Load from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Apply environment overrides and re-validate
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(TOKEN_ENV).ok(),
            std::env::var(BASE_URL_ENV).ok(),
        )
    }

    fn with_overrides(mut self, token: Option<String>, base_url: Option<String>) -> Result<Self> {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.session.token = Some(token);
        }
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::ConfigError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::ConfigError("api.timeout_secs must be positive".to_string()));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(Error::ConfigError("session.cookie_name must not be empty".to_string()));
        }
        if self.display.locale.trim().is_empty() {
            return Err(Error::ConfigError("display.locale must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.cache.stale_after_secs)
    }

    /// HTTP client options; requires a session token
    pub fn client_options(&self) -> Result<ClientOptions> {
        let token = self
            .session
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::NotAuthenticated)?;

        Ok(ClientOptions {
            base_url: self.api.base_url.trim().to_string(),
            cookie_name: self.session.cookie_name.clone(),
            session_token: token,
            timeout: Duration::from_secs(self.api.timeout_secs),
            locale: self.display.locale.clone(),
        })
    }
}
