//! Environment-driven configuration.
//!
//! Provider API keys are optional: a missing key disables that provider's
//! step in the cascade without failing the overall request.

use std::net::SocketAddr;

use moodlift_core::error::{MoodliftError, Result};

const DEFAULT_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CAPTURE_CMD: &str = "fswebcam --no-banner -r 640x480 --jpeg 85 {output}";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub giphy_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub addr: SocketAddr,
    pub capture_command: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an injectable variable lookup, so tests avoid
    /// mutating process-global environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let addr_raw = lookup("MOODLIFT_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr_raw
            .parse()
            .map_err(|err| MoodliftError::config(format!("invalid MOODLIFT_ADDR '{addr_raw}': {err}")))?;

        Ok(Self {
            gemini_api_key: non_empty(lookup("GEMINI_API_KEY")),
            giphy_api_key: non_empty(lookup("GIPHY_API_KEY")),
            gemini_model: non_empty(lookup("GEMINI_MODEL")),
            addr,
            capture_command: lookup("MOODLIFT_CAPTURE_CMD")
                .unwrap_or_else(|| DEFAULT_CAPTURE_CMD.to_string()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(config.giphy_api_key.is_none());
        assert_eq!(config.addr.port(), 8000);
        assert!(config.capture_command.contains("{output}"));
    }

    #[test]
    fn test_empty_key_counts_as_absent() {
        let config =
            Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  "), ("GIPHY_API_KEY", "k")]))
                .unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.giphy_api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_invalid_addr_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[("MOODLIFT_ADDR", "nonsense")])).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_addr_override() {
        let config =
            Config::from_lookup(lookup_from(&[("MOODLIFT_ADDR", "127.0.0.1:9100")])).unwrap();
        assert_eq!(config.addr.port(), 9100);
    }
}
