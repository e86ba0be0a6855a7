//! # Sync Configuration
//!
//! Configuration management for the sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PORTAL_BASE_URL=https://portal.campus.ac.id/services/              │
//! │     PORTAL_CONNECT_TIMEOUT_SECS=60                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/portal/sync.toml (Linux)                                 │
//! │     ~/Library/Application Support/id.ac.campus.portal/sync.toml (mac)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     60 second connect/request timeouts, production base URL            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [portal]
//! base_url = "https://portal.campus.ac.id/services/"
//!
//! [transport]
//! connect_timeout_secs = 60
//! request_timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

/// Default portal service root.
const DEFAULT_BASE_URL: &str = "https://portal.campus.ac.id/services/";

/// Transport timeouts match the portal's historical client settings.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Settings Sections
// =============================================================================

/// Remote portal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSettings {
    /// Service root all endpoint paths are joined against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for PortalSettings {
    fn default() -> Self {
        PortalSettings {
            base_url: default_base_url(),
        }
    }
}

/// HTTP transport settings.
///
/// These are the only timeouts in the engine; the orchestrator adds none of
/// its own and never cancels an in-flight flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransportSettings {
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        TransportSettings {
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// =============================================================================
// Sync Config
// =============================================================================

/// Full sync engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub portal: PortalSettings,

    #[serde(default)]
    pub transport: TransportSettings,
}

impl SyncConfig {
    /// Loads configuration from the given path (or the platform default),
    /// falling back to defaults when no file exists, then applies
    /// environment overrides.
    pub fn load_or_default(path: Option<PathBuf>) -> Self {
        let path = path.or_else(default_config_path);

        let mut config = match &path {
            Some(p) if p.exists() => match Self::load(p) {
                Ok(config) => {
                    debug!(path = %p.display(), "Loaded sync config");
                    config
                }
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "Config unreadable, using defaults");
                    SyncConfig::default()
                }
            },
            _ => SyncConfig::default(),
        };

        config.apply_env_overrides();
        config
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> SyncResult<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| SyncError::ConfigSave(e.to_string()))?;
        Ok(())
    }

    /// Applies `PORTAL_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("PORTAL_BASE_URL") {
            self.portal.base_url = base_url;
        }
        if let Some(secs) = env_u64("PORTAL_CONNECT_TIMEOUT_SECS") {
            self.transport.connect_timeout_secs = secs;
        }
        if let Some(secs) = env_u64("PORTAL_REQUEST_TIMEOUT_SECS") {
            self.transport.request_timeout_secs = secs;
        }
    }

    /// Validates the configuration.
    ///
    /// ## Checks
    /// - Base URL parses and uses http(s)
    /// - Timeouts are non-zero
    pub fn validate(&self) -> SyncResult<()> {
        let url = Url::parse(&self.portal.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SyncError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        if self.transport.connect_timeout_secs == 0 || self.transport.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "transport timeouts must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Platform config file location (`<config dir>/sync.toml`).
fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("id.ac", "campus", "portal")
        .map(|dirs| dirs.config_dir().join("sync.toml"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transport.connect_timeout_secs, 60);
        assert_eq!(config.transport.request_timeout_secs, 60);
        assert_eq!(config.portal.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
            [portal]
            base_url = "https://staging.campus.ac.id/services/"

            [transport]
            connect_timeout_secs = 10
            request_timeout_secs = 20
        "#;
        let config: SyncConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.portal.base_url,
            "https://staging.campus.ac.id/services/"
        );
        assert_eq!(config.transport.connect_timeout_secs, 10);
        assert_eq!(config.transport.request_timeout_secs, 20);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SyncConfig = toml::from_str("[portal]\n").unwrap();
        assert_eq!(config.portal.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.transport.request_timeout_secs, 60);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = SyncConfig::default();
        config.portal.base_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = SyncConfig::default();
        config.portal.base_url = "ftp://portal.campus.ac.id/".to_string();
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = SyncConfig::default();
        config.transport.request_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidConfig(_))
        ));
    }
}
