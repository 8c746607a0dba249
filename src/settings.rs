//! TOML settings for the `shareurl` binary
//!
//! Every key is optional; a missing key falls back to its default.
//!
//! ```toml
//! core_type = "sing-box"
//! tag = "proxy"
//! user_agent = "clash.meta"
//! timeout_ms = 5000
//! log_level = "debug"
//! dns = "223.5.5.5:53"
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::models::CoreType;
use crate::network::{HttpOptions, DEFAULT_TIMEOUT_MS};

fn default_core_type() -> CoreType {
    CoreType::Xray
}

fn default_tag() -> String {
    "proxy".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_info_log_level() -> String {
    "info".to_string()
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Core used when a command does not name one.
    #[serde(default = "default_core_type")]
    pub core_type: CoreType,
    /// Outbound tag, and the prefix of subscription tags.
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_info_log_level")]
    pub log_level: String,
    /// Nameserver for subscription downloads.
    #[serde(default)]
    pub dns: Option<SocketAddr>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            core_type: default_core_type(),
            tag: default_tag(),
            user_agent: None,
            timeout_ms: default_timeout_ms(),
            log_level: default_info_log_level(),
            dns: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            user_agent: self.user_agent.clone(),
            dns: self.dns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_overrides() {
        let settings = Settings::from_toml_str(
            "core_type = \"clash.meta\"\ntag = \"out\"\nuser_agent = \"ua\"\ntimeout_ms = 500\n",
        )
        .unwrap();
        assert_eq!(settings.core_type, CoreType::Mihomo);
        assert_eq!(settings.tag, "out");
        assert_eq!(settings.log_level, "info");
        let options = settings.http_options();
        assert_eq!(options.timeout, Duration::from_millis(500));
        assert_eq!(options.user_agent.as_deref(), Some("ua"));
        assert_eq!(options.dns, None);
    }

    #[test]
    fn test_settings_nameserver() {
        let settings = Settings::from_toml_str("dns = \"223.5.5.5:53\"").unwrap();
        let expected: SocketAddr = "223.5.5.5:53".parse().unwrap();
        assert_eq!(settings.http_options().dns, Some(expected));
        assert!(Settings::from_toml_str("dns = \"not an address\"").is_err());
    }

    #[test]
    fn test_settings_rejects_unknown_core() {
        let err = Settings::from_toml_str("core_type = \"quantumult\"").unwrap_err();
        assert!(err.to_string().contains("unknown core type"));
    }
}
