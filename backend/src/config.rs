//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set from the command line, a configuration file or a
//! `RECIPES_*` environment variable.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_VOTE_RETRY_ATTEMPTS;
use crate::outbound::persistence::DEFAULT_MAX_CONNECTIONS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The configured listen address is not a socket address.
    #[error("invalid bind address '{value}': {reason}")]
    InvalidBindAddr {
        /// Address as configured.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPES")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Attempts made for a vote toggle before reporting a conflict.
    pub vote_retry_attempts: Option<u32>,
}

impl AppSettings {
    /// Parsed listen address, `0.0.0.0:8080` by default.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                reason: err.to_string(),
            }
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size, ten connections by default.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Vote toggle attempts, three by default.
    pub fn vote_retry_attempts(&self) -> u32 {
        self.vote_retry_attempts.unwrap_or(DEFAULT_VOTE_RETRY_ATTEMPTS)
    }
}
