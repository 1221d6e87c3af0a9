// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into an immutable [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | Shared HMAC secret for bearer tokens | Required |
//! | `JWT_SECRET_ENCODING` | `text` or `base64` | `text` |
//! | `JWT_EXPIRATION_SECS` | Token lifetime in seconds | `86400` |
//! | `PUBLIC_PATHS` | Comma separated public path patterns | see [`DEFAULT_PUBLIC_PATHS`] |
//! | `DATA_DIR` | Directory holding the redb database | in-memory store |
//! | `TLS_CERT_PATH` | PEM certificate chain | plain HTTP |
//! | `TLS_KEY_PATH` | PEM private key | plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_SECRET_ENCODING_ENV: &str = "JWT_SECRET_ENCODING";
pub const JWT_EXPIRATION_ENV: &str = "JWT_EXPIRATION_SECS";
pub const PUBLIC_PATHS_ENV: &str = "PUBLIC_PATHS";

/// Environment variable name for the database directory.
///
/// When unset the service keeps users and logs in memory and loses them on
/// restart.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Token lifetime when `JWT_EXPIRATION_SECS` is not set (24 hours).
pub const DEFAULT_TOKEN_EXPIRATION: Duration = Duration::from_secs(86_400);

/// Paths reachable without a bearer token.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/",
    "/swagger-resources/**",
    "/swagger-ui.html",
    "/v2/api-docs",
    "/webjars/**",
];

/// File name of the redb database inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "admin.redb";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// How the configured secret string becomes HMAC key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretEncoding {
    /// UTF-8 bytes of the string.
    #[default]
    Text,
    /// Standard base64 decoding of the string.
    Base64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Settings consumed by the token codec.
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub encoding: SecretEncoding,
    pub expiration: Duration,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("encoding", &self.encoding)
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Process-wide configuration. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt: JwtSettings,
    pub public_paths: Vec<String>,
    pub data_dir: Option<PathBuf>,
    pub tls: Option<TlsSettings>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Load configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host: IpAddr = match get(HOST_ENV) {
            Some(raw) => raw.parse().map_err(|e| invalid(HOST_ENV, e))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port: u16 = match get(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|e| invalid(PORT_ENV, e))?,
            None => 8080,
        };

        let secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        let encoding = match get(JWT_SECRET_ENCODING_ENV).as_deref() {
            None => SecretEncoding::Text,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "text" => SecretEncoding::Text,
                "base64" => SecretEncoding::Base64,
                other => {
                    return Err(invalid(
                        JWT_SECRET_ENCODING_ENV,
                        format!("expected 'text' or 'base64', got '{other}'"),
                    ))
                }
            },
        };
        let expiration = match get(JWT_EXPIRATION_ENV) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|e| invalid(JWT_EXPIRATION_ENV, e))?;
                if secs == 0 {
                    return Err(invalid(JWT_EXPIRATION_ENV, "must be greater than zero"));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TOKEN_EXPIRATION,
        };

        let public_paths = match get(PUBLIC_PATHS_ENV) {
            Some(raw) => parse_public_paths(&raw)?,
            None => DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsSettings {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None => LogFormat::Pretty,
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) if raw.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(invalid(
                    LOG_FORMAT_ENV,
                    format!("expected 'json' or 'pretty', got '{other}'"),
                ))
            }
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            jwt: JwtSettings {
                secret,
                encoding,
                expiration,
            },
            public_paths,
            data_dir: get(DATA_DIR_ENV).map(PathBuf::from),
            tls,
            log_format,
        })
    }

    /// Path of the redb database, if persistence is configured.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(DATABASE_FILE))
    }
}

fn parse_public_paths(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut paths = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !entry.starts_with('/') {
            return Err(invalid(
                PUBLIC_PATHS_ENV,
                format!("pattern '{entry}' must start with '/'"),
            ));
        }
        if let Err(e) = glob::Pattern::new(entry) {
            return Err(invalid(PUBLIC_PATHS_ENV, format!("pattern '{entry}': {e}")));
        }
        paths.push(entry.to_string());
    }
    Ok(paths)
}

fn invalid(name: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}
