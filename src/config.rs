use anyhow::{Context, Result};
use std::path::PathBuf;

// ============================================================================
// Settings - Environment driven configuration
// ============================================================================
//
// Variables (an optional .env file is loaded first):
// - HTTP_HOST     bind address              (default 0.0.0.0)
// - HTTP_PORT     bind port                 (default 8080)
// - FIXTURE_PATH  JSON seed for the catalog (optional)
// - RUST_LOG      tracing filter            (default info,marketplace_orders=debug)
//
// ============================================================================

pub const DEFAULT_LOG_FILTER: &str = "info,marketplace_orders=debug";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub http_host: String,
    pub http_port: u16,
    pub fixture_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            fixture_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let http_host = lookup("HTTP_HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.http_host);

        let http_port = match lookup("HTTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("HTTP_PORT must be a port number, got {raw:?}"))?,
            None => defaults.http_port,
        };

        let fixture_path = lookup("FIXTURE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let log_filter = lookup("RUST_LOG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        Ok(Self {
            http_host,
            http_port,
            fixture_path,
            log_filter,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.http_host.clone(), self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.bind_address(), ("0.0.0.0".to_string(), 8080));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("HTTP_HOST", "127.0.0.1"),
            ("HTTP_PORT", "9001"),
            ("FIXTURE_PATH", "/tmp/seed.json"),
            ("RUST_LOG", "warn"),
        ]))
        .unwrap();

        assert_eq!(settings.http_host, "127.0.0.1");
        assert_eq!(settings.http_port, 9001);
        assert_eq!(settings.fixture_path, Some(PathBuf::from("/tmp/seed.json")));
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Settings::from_lookup(lookup_from(&[("HTTP_PORT", "not-a-port")]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HTTP_PORT"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("HTTP_HOST", "  "),
            ("FIXTURE_PATH", ""),
        ]))
        .unwrap();

        assert_eq!(settings.http_host, "0.0.0.0");
        assert_eq!(settings.fixture_path, None);
    }
}
