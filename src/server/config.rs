//! Server configuration from environment variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DEPLOYCONFIG_PORT` | `8080` |
//! | `DEPLOYCONFIG_TLS` | disabled (`true` or `1` enables) |
//! | `DEPLOYCONFIG_TLS_PORT` | `8443` |
//! | `DEPLOYCONFIG_TLS_CERT` | `/certs/tls.crt` |
//! | `DEPLOYCONFIG_TLS_KEY` | `/certs/tls.key` |

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_HTTPS_PORT: u16 = 8443;
pub const DEFAULT_TLS_CERT_PATH: &str = "/certs/tls.crt";
pub const DEFAULT_TLS_KEY_PATH: &str = "/certs/tls.key";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub port: u16,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port for plain HTTP
    pub port: u16,
    /// HTTPS settings; `None` serves HTTP only
    pub tls: Option<TlsSettings>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            tls: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_port(&lookup, "DEPLOYCONFIG_PORT", DEFAULT_HTTP_PORT)?;

        let tls_enabled = lookup("DEPLOYCONFIG_TLS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let tls = if tls_enabled {
            Some(TlsSettings {
                port: parse_port(&lookup, "DEPLOYCONFIG_TLS_PORT", DEFAULT_HTTPS_PORT)?,
                cert_path: lookup("DEPLOYCONFIG_TLS_CERT")
                    .unwrap_or_else(|| DEFAULT_TLS_CERT_PATH.to_string())
                    .into(),
                key_path: lookup("DEPLOYCONFIG_TLS_KEY")
                    .unwrap_or_else(|| DEFAULT_TLS_KEY_PATH.to_string())
                    .into(),
            })
        } else {
            None
        };

        Ok(Self { port, tls })
    }
}

fn parse_port<F>(lookup: &F, name: &'static str, default: u16) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort { name, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
