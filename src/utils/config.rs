// Tue Jan 13 2026 - Alex

use crate::engine::transport::TransportSpec;
use crate::hosts::discovery::DiscoverySpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "PSSH_CONFIG";
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub default_hosts: Vec<String>,
    pub transport: TransportSpec,
    pub discovery: DiscoverySpec,
    pub color: bool,
    pub keep_ssh_warnings: bool,
    pub connect_timeout_secs: u64,
    pub profile: String,
    pub profiles: BTreeMap<String, ProfileConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub timeout_secs: u64,
    pub slow_after_ticks: u64,
    pub status_every_ticks: u64,
}

impl ProfileConfig {
    pub fn standard() -> Self {
        Self {
            timeout_secs: 120,
            slow_after_ticks: 60,
            status_every_ticks: 5,
        }
    }

    pub fn long() -> Self {
        Self {
            timeout_secs: 240,
            ..Self::standard()
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            default_hosts: Vec::new(),
            transport: TransportSpec::default(),
            discovery: DiscoverySpec::default(),
            color: true,
            keep_ssh_warnings: false,
            connect_timeout_secs: 10,
            profile: DEFAULT_PROFILE.to_string(),
            profiles: BTreeMap::new(),
        }
    }
}

impl ConfigFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(e.to_string()))?;

        let ext = path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext.to_lowercase().as_str() {
            "json" => Self::from_json(&contents),
            _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// An explicit path must exist; otherwise `$PSSH_CONFIG` is tried and
    /// silently skipped when it points nowhere.
    pub fn locate(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from) {
            Some(path) if path.exists() => {
                log::debug!("loading configuration from {}", path.display());
                Self::load(path)
            }
            Some(path) => {
                log::debug!("{} points at missing file {}, using defaults", CONFIG_ENV_VAR, path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// File-defined profiles shadow the built-in `default` and `long` ones.
    pub fn profile(&self, name: &str) -> Option<ProfileConfig> {
        if let Some(profile) = self.profiles.get(name) {
            return Some(*profile);
        }

        match name {
            DEFAULT_PROFILE => Some(ProfileConfig::standard()),
            "long" => Some(ProfileConfig::long()),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let config = ConfigFile::default();
        assert_eq!(config.profile("default"), Some(ProfileConfig::standard()));
        assert_eq!(config.profile("long").map(|p| p.timeout_secs), Some(240));
        assert_eq!(config.profile("staging"), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "default_hosts": ["ops-dev001", "ops-dev005"],
            "discovery": { "program": "search-ec2-tags.py", "args": ["--regions=us-east-1"] },
            "profiles": { "long": { "timeout_secs": 300 } }
        }"#;
        let config = ConfigFile::from_json(json).unwrap();

        assert_eq!(config.default_hosts, vec!["ops-dev001", "ops-dev005"]);
        assert_eq!(config.discovery.args, vec!["--regions=us-east-1"]);
        assert_eq!(config.transport.program, "ssh");
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(config.color);

        let long = config.profile("long").unwrap();
        assert_eq!(long.timeout_secs, 300);
        assert_eq!(long.slow_after_ticks, 60);
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let err = ConfigFile::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let err = ConfigFile::locate(Some(Path::new("/nonexistent/pssh.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
