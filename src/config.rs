// Environment-driven configuration
//
// Values come from the process environment, after loading `.env` if one is
// present. Missing values fall back to defaults; unparsable values are errors.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::agents::ManagerConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mailbox_capacity: usize,
    pub event_buffer: usize,
    pub shutdown_grace: Duration,
    pub capability_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let manager = ManagerConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            mailbox_capacity: manager.mailbox_capacity,
            event_buffer: manager.event_buffer,
            shutdown_grace: manager.shutdown_grace,
            capability_root: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| {
                warn!("HOST not set, using default");
                defaults.host.clone()
            }),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            mailbox_capacity: parse_or(&lookup, "AGENT_MAILBOX_CAPACITY", defaults.mailbox_capacity)?,
            event_buffer: parse_or(&lookup, "AGENT_EVENT_BUFFER", defaults.event_buffer)?,
            shutdown_grace: Duration::from_millis(parse_or(
                &lookup,
                "AGENT_SHUTDOWN_GRACE_MS",
                defaults.shutdown_grace.as_millis() as u64,
            )?),
            capability_root: lookup("CAPABILITY_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| {
                    warn!("CAPABILITY_ROOT not set, using current directory");
                    defaults.capability_root.clone()
                }),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            mailbox_capacity: self.mailbox_capacity,
            event_buffer: self.event_buffer,
            shutdown_grace: self.shutdown_grace,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => {
            warn!("{} not set, using default {}", key, default);
            Ok(default)
        }
    }
}
