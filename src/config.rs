//! Configuration module

use std::env;
use std::net::{IpAddr, SocketAddr};

use anyhow::Context;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Verbose logging
    pub debug: bool,

    /// Path to the detector weights file
    pub model_path: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            debug: false,
            model_path: "artifacts/review_model.json".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),

            port: lookup("API_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            debug: lookup("API_DEBUG")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.debug),

            model_path: lookup("MODEL_PATH").unwrap_or(defaults.model_path),

            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid API_HOST: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Default tracing filter when RUST_LOG is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "reviewguard_api=debug,tower_http=debug"
        } else {
            "reviewguard_api=info,tower_http=info"
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
