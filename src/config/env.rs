// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{QueryRunnerError, Result};
use crate::saved_query::DEFAULT_RETRY_DELAY;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3183";
pub const DEFAULT_FRONTEND_URL: &str = "http://frontend-internal:3090";
pub const DEFAULT_EXTERNAL_URL: &str = "http://localhost:3080";

/// Problems found in the environment: errors stop startup, warnings are logged
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Fail with the full report when any error was recorded
    pub fn into_result(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(QueryRunnerError::Config(self.report()))
        }
    }
}

/// Environment configuration - all env vars in one place
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Listen address for frontend callbacks (QUERY_RUNNER_ADDR)
    pub addr: String,
    /// Frontend internal API base URL (SRC_FRONTEND_INTERNAL)
    pub frontend_url: String,
    /// Public URL used in notification links (EXTERNAL_URL)
    pub external_url: String,
    /// Delay between initial load attempts (QUERY_RUNNER_LOAD_RETRY_SECS)
    pub load_retry_delay: Duration,
    /// Mutate the cache but never send notifications (QUERY_RUNNER_DISABLE_NOTIFICATIONS)
    pub notifications_disabled: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            external_url: DEFAULT_EXTERNAL_URL.to_string(),
            load_retry_delay: DEFAULT_RETRY_DELAY,
            notifications_disabled: false,
        }
    }
}

impl EnvConfig {
    /// Load all environment configuration (call once at startup)
    pub fn load() -> Self {
        info!("Loading environment configuration");
        let defaults = Self::default();

        let load_retry_delay = read_var("QUERY_RUNNER_LOAD_RETRY_SECS")
            .and_then(|s| match s.parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    warn!(value = %s, "Invalid QUERY_RUNNER_LOAD_RETRY_SECS, using default");
                    None
                }
            })
            .unwrap_or(defaults.load_retry_delay);

        let config = Self {
            addr: read_var("QUERY_RUNNER_ADDR").unwrap_or(defaults.addr),
            frontend_url: read_var("SRC_FRONTEND_INTERNAL").unwrap_or(defaults.frontend_url),
            external_url: read_var("EXTERNAL_URL").unwrap_or(defaults.external_url),
            load_retry_delay,
            notifications_disabled: parse_bool_env("QUERY_RUNNER_DISABLE_NOTIFICATIONS")
                .unwrap_or(false),
        };
        debug!(?config, "environment configuration loaded");
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if self.addr.parse::<SocketAddr>().is_err() {
            validation.add_error(format!("QUERY_RUNNER_ADDR '{}' is not a socket address", self.addr));
        }

        for (name, url) in [
            ("SRC_FRONTEND_INTERNAL", &self.frontend_url),
            ("EXTERNAL_URL", &self.external_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                validation.add_error(format!("{} '{}' must be an http(s) URL", name, url));
            }
        }

        if self.external_url == DEFAULT_EXTERNAL_URL {
            validation.add_warning("EXTERNAL_URL not set; notification links will point at localhost.");
        }

        if self.load_retry_delay.is_zero() {
            validation.add_warning("QUERY_RUNNER_LOAD_RETRY_SECS is 0; startup will poll the frontend without pause.");
        }

        if self.notifications_disabled {
            validation.add_warning("Notifications are disabled; subscribers will not be told about changes.");
        }

        validation
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parse_bool_env(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?.to_lowercase();
    match value.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let validation = EnvConfig::default().validate();
        assert!(validation.is_valid());
        // Default external URL is flagged
        assert_eq!(validation.warnings.len(), 1);
    }

    #[test]
    fn test_bad_values_are_errors() {
        let config = EnvConfig {
            addr: "not-an-addr".to_string(),
            frontend_url: "frontend:3090".to_string(),
            ..Default::default()
        };
        let validation = config.validate();
        assert!(!validation.is_valid());
        assert_eq!(validation.errors.len(), 2);
        assert!(validation.report().starts_with("Errors:"));
    }

    #[test]
    fn test_report_ok() {
        assert_eq!(ConfigValidation::new().report(), "Configuration OK");
    }

    #[test]
    fn test_disabled_notifications_still_valid() {
        let config = EnvConfig {
            external_url: "https://sourcegraph.example.com".to_string(),
            load_retry_delay: Duration::ZERO,
            notifications_disabled: true,
            ..Default::default()
        };
        let validation = config.validate().into_result().unwrap();
        assert_eq!(validation.warnings.len(), 2);
        assert_eq!(
            validation.report(),
            "Warnings:\n  - QUERY_RUNNER_LOAD_RETRY_SECS is 0; startup will poll the frontend without pause.\n  - Notifications are disabled; subscribers will not be told about changes."
        );
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let config = EnvConfig {
            external_url: "localhost:3080".to_string(),
            ..Default::default()
        };
        let err = config.validate().into_result().unwrap_err();
        assert!(matches!(err, QueryRunnerError::Config(_)));
        let message = err.to_string();
        assert!(message.starts_with("configuration error: Errors:"));
        assert!(message.contains("EXTERNAL_URL 'localhost:3080' must be an http(s) URL"));
    }
}
