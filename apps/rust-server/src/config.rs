// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the [`Config`] loaded from them
//! once at startup. Invalid values fail startup with a descriptive error.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LEDGER_RPC_URL` | rippled JSON-RPC endpoint | public testnet |
//! | `FAUCET_URL` | Testnet faucet endpoint | public testnet faucet |
//! | `STORE_BACKEND` | Participant store (`json` or `redb`) | `json` |
//! | `DATA_DIR` | Directory holding the participant store | `./data` |
//! | `TRUST_LINE_LIMIT` | Limit holders extend on new trust lines | `1000000` |
//! | `ACTIVATION_RETRIES` | Account activation polls | `15` |
//! | `ACTIVATION_INTERVAL_MS` | Delay between activation polls | `1000` |
//! | `CONFIRMATION_TIMEOUT_SECS` | Wall-clock limit per transaction | `60` |
//! | `REGISTRATION_FAILURE_POLICY` | `abort`, `keep-partial` or `best-effort` | `abort` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::codec::encode_issued_value;
use crate::blockchain::{ConfirmationPolicy, NetworkConfig, XRPL_TESTNET_FAUCET, XRPL_TESTNET_RPC};
use crate::workflow::{ActivationPolicy, FailurePolicy, WorkflowSettings, DEFAULT_TRUST_LINE_LIMIT};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LEDGER_RPC_URL_ENV: &str = "LEDGER_RPC_URL";
pub const FAUCET_URL_ENV: &str = "FAUCET_URL";

/// Environment variable selecting the participant store backend.
///
/// # Values
/// - `json`: single JSON document (`xrpl-poc.json`)
/// - `redb`: embedded relational rows (`participants.redb`)
pub const STORE_BACKEND_ENV: &str = "STORE_BACKEND";

/// Environment variable name for the data directory path.
///
/// # Default
/// `./data`, relative to the working directory
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const TRUST_LINE_LIMIT_ENV: &str = "TRUST_LINE_LIMIT";
pub const ACTIVATION_RETRIES_ENV: &str = "ACTIVATION_RETRIES";
pub const ACTIVATION_INTERVAL_MS_ENV: &str = "ACTIVATION_INTERVAL_MS";
pub const CONFIRMATION_TIMEOUT_SECS_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const REGISTRATION_FAILURE_POLICY_ENV: &str = "REGISTRATION_FAILURE_POLICY";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Participant store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Json,
    Redb,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(StoreBackend::Json),
            "redb" | "relational" => Ok(StoreBackend::Redb),
            other => Err(format!("unknown store backend `{other}` (expected json or redb)")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{other}` (expected json or pretty)")),
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {variable}: {message}")]
pub struct ConfigError {
    pub variable: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(variable: &'static str, message: impl Into<String>) -> Self {
        Self {
            variable,
            message: message.into(),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub network: NetworkConfig,
    pub store_backend: StoreBackend,
    pub data_dir: PathBuf,
    pub workflow: WorkflowSettings,
    pub confirmation: ConfirmationPolicy,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset and blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| ConfigError::new(HOST_ENV, format!("`{host}:{port}`: {e}")))?;

        let mut network = NetworkConfig::testnet();
        network.rpc_url = url_or(get(LEDGER_RPC_URL_ENV), LEDGER_RPC_URL_ENV, XRPL_TESTNET_RPC)?;
        network.faucet_url = url_or(get(FAUCET_URL_ENV), FAUCET_URL_ENV, XRPL_TESTNET_FAUCET)?;

        let store_backend = parse_or(get(STORE_BACKEND_ENV), STORE_BACKEND_ENV, StoreBackend::default())?;
        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        let trust_line_limit =
            get(TRUST_LINE_LIMIT_ENV).unwrap_or_else(|| DEFAULT_TRUST_LINE_LIMIT.to_string());
        encode_issued_value(&trust_line_limit)
            .map_err(|e| ConfigError::new(TRUST_LINE_LIMIT_ENV, e.to_string()))?;
        if trust_line_limit.starts_with('-') {
            return Err(ConfigError::new(TRUST_LINE_LIMIT_ENV, "must not be negative"));
        }

        let defaults = ActivationPolicy::default();
        let retries: u32 = parse_or(get(ACTIVATION_RETRIES_ENV), ACTIVATION_RETRIES_ENV, defaults.retries)?;
        if retries == 0 {
            return Err(ConfigError::new(ACTIVATION_RETRIES_ENV, "must be at least 1"));
        }
        let interval_ms: u64 = parse_or(
            get(ACTIVATION_INTERVAL_MS_ENV),
            ACTIVATION_INTERVAL_MS_ENV,
            defaults.interval.as_millis() as u64,
        )?;

        let mut confirmation = ConfirmationPolicy::default();
        let timeout_secs: u64 = parse_or(
            get(CONFIRMATION_TIMEOUT_SECS_ENV),
            CONFIRMATION_TIMEOUT_SECS_ENV,
            confirmation.timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::new(CONFIRMATION_TIMEOUT_SECS_ENV, "must be at least 1"));
        }
        confirmation.timeout = Duration::from_secs(timeout_secs);

        let failure_policy = parse_or(
            get(REGISTRATION_FAILURE_POLICY_ENV),
            REGISTRATION_FAILURE_POLICY_ENV,
            FailurePolicy::default(),
        )?;
        let log_format = parse_or(get(LOG_FORMAT_ENV), LOG_FORMAT_ENV, LogFormat::default())?;

        Ok(Self {
            bind_addr,
            network,
            store_backend,
            data_dir,
            workflow: WorkflowSettings {
                trust_line_limit,
                activation: ActivationPolicy {
                    retries,
                    interval: Duration::from_millis(interval_ms),
                },
                failure_policy,
            },
            confirmation,
            log_format,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            network: NetworkConfig::testnet(),
            store_backend: StoreBackend::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            workflow: WorkflowSettings::default(),
            confirmation: ConfirmationPolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

fn parse_or<T>(value: Option<String>, variable: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::new(variable, format!("`{raw}`: {e}"))),
        None => Ok(default),
    }
}

fn url_or(value: Option<String>, variable: &'static str, default: &str) -> Result<String, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    let parsed = url::Url::parse(&raw).map_err(|e| ConfigError::new(variable, format!("`{raw}`: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw),
        scheme => Err(ConfigError::new(variable, format!("unsupported scheme `{scheme}`"))),
    }
}
