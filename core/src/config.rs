//! Client configuration.
//!
//! The base URL and operating mode are passed in at construction time rather
//! than read from process-wide state. `from_env` is a convenience for binaries
//! and tests that want the environment to decide.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BASE_URL_VAR: &str = "MICRO_URL_BASE_URL";
pub const MODE_VAR: &str = "MICRO_URL_MODE";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown mode {0:?}, expected \"development\" or \"production\"")]
    UnknownMode(String),
}

/// Operating mode. Failures are logged only outside production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn logs_failures(self) -> bool {
        self != Mode::Production
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub mode: Mode,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, mode: Mode) -> Self {
        Self {
            base_url: base_url.into(),
            mode,
        }
    }

    /// Read `MICRO_URL_BASE_URL` and `MICRO_URL_MODE`, falling back to the
    /// local development backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mode = match lookup(MODE_VAR) {
            Some(raw) => raw.parse()?,
            None => Mode::default(),
        };
        Ok(Self { base_url, mode })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Mode::Development)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_local_development() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(config.mode.logs_failures());
    }

    #[test]
    fn reads_both_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://micro.example"),
            (MODE_VAR, "Production"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://micro.example");
        assert_eq!(config.mode, Mode::Production);
        assert!(!config.mode.logs_failures());
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = ClientConfig::from_lookup(lookup(&[(MODE_VAR, "staging")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownMode("staging".to_string()));
    }

    #[test]
    fn deserializes_recognized_options() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"baseUrl":"http://x","mode":"production"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("http://x", Mode::Production));
        let config: ClientConfig = serde_json::from_str(r#"{"baseUrl":"http://x"}"#).unwrap();
        assert_eq!(config.mode, Mode::Development);
    }
}
