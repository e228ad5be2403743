// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and is
//! immutable afterwards. The signing secret in particular is handed to the
//! token service at construction and never read from the environment again.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the database file | `./data` |
//! | `JWT_SECRET_KEY` | HMAC secret used to sign tokens | Required |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime | `900` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime | `2592000` |
//! | `BCRYPT_COST` | bcrypt work factor | `12` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Optional |
//! | `TLS_KEY_PATH` | PEM private key | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

use crate::auth::TokenConfig;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// The database file `prescriptions.redb` is created inside it.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const JWT_SECRET_ENV: &str = "JWT_SECRET_KEY";
pub const ACCESS_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DATABASE_FILE: &str = "prescriptions.redb";

/// 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
/// 30 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Minimum accepted signing secret length in bytes.
const MIN_SECRET_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// TLS certificate/key pair in PEM format.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub tokens: TokenConfig,
    pub bcrypt_cost: u32,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => parse_number::<u16>(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let data_dir = PathBuf::from(
            lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let access_ttl = ttl(&lookup, ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl = ttl(&lookup, REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL_SECS)?;
        if refresh_ttl <= access_ttl {
            return Err(ConfigError::Invalid {
                name: REFRESH_TTL_ENV,
                reason: "must be longer than the access token lifetime".to_string(),
            });
        }

        let bcrypt_cost = match lookup(BCRYPT_COST_ENV) {
            Some(raw) => {
                let cost = parse_number::<u32>(BCRYPT_COST_ENV, &raw)?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::Invalid {
                        name: BCRYPT_COST_ENV,
                        reason: "must be between 4 and 31".to_string(),
                    });
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        let tls = match (lookup(TLS_CERT_ENV), lookup(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_ENV)),
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            bind_addr,
            data_dir,
            tokens: TokenConfig {
                secret,
                access_ttl,
                refresh_ttl,
            },
            bcrypt_cost,
            tls,
            log_format,
        })
    }

    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn ttl<F>(lookup: &F, name: &'static str, default_secs: i64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match lookup(name) {
        Some(raw) => parse_number::<i64>(name, &raw)?,
        None => default_secs,
    };
    if secs <= 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be a positive number of seconds".to_string(),
        });
    }
    Ok(Duration::seconds(secs))
}
