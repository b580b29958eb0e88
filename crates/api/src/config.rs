//! Environment-driven service configuration.
//!
//! | Variable                | Default        |
//! |-------------------------|----------------|
//! | `HOMEPAGE_BIND_ADDR`    | `0.0.0.0:8080` |
//! | `HOMEPAGE_ENVIRONMENT`  | `production`   |
//! | `JWT_SECRET`            | dev secret     |
//! | `DATABASE_URL`          | unset (in-memory store) |
//! | `HOMEPAGE_LOG_FORMAT`   | `json`         |
//! | `HOMEPAGE_LOG_LEVEL`    | `info`         |
//! | `RUNNING_IN_CONTAINER`  | `false`        |

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use homepage_observability::{LogFormat, LogSettings};

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl fmt::Display) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Hosting environment. Development relaxes authentication on the callback routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "Development",
            Environment::Production => "Production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub jwt_secret: String,
    /// `true` when `JWT_SECRET` was unset and the dev secret is in use.
    pub jwt_secret_defaulted: bool,
    pub database_url: Option<String>,
    pub log_format: LogFormat,
    pub log_level: String,
    pub dockerized: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            environment: Environment::default(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_secret_defaulted: true,
            database_url: None,
            log_format: LogFormat::Json,
            log_level: "info".to_string(),
            dockerized: false,
        }
    }
}

impl ApiConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = ApiConfig::default();

        if let Some(addr) = get("HOMEPAGE_BIND_ADDR") {
            config.bind_addr = addr
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("HOMEPAGE_BIND_ADDR", &addr, e))?;
        }
        if let Some(env) = get("HOMEPAGE_ENVIRONMENT") {
            config.environment = env
                .parse()
                .map_err(|e| ConfigError::invalid("HOMEPAGE_ENVIRONMENT", &env, e))?;
        }
        if let Some(secret) = get("JWT_SECRET") {
            config.jwt_secret = secret;
            config.jwt_secret_defaulted = false;
        }
        config.database_url = get("DATABASE_URL");
        if let Some(format) = get("HOMEPAGE_LOG_FORMAT") {
            config.log_format = format
                .parse()
                .map_err(|e| ConfigError::invalid("HOMEPAGE_LOG_FORMAT", &format, e))?;
        }
        if let Some(level) = get("HOMEPAGE_LOG_LEVEL") {
            config.log_level = level.trim().to_string();
        }
        if let Some(flag) = get("RUNNING_IN_CONTAINER") {
            config.dockerized = parse_flag(&flag)
                .ok_or_else(|| ConfigError::invalid("RUNNING_IN_CONTAINER", &flag, "expected true or false"))?;
        }

        Ok(config)
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            format: self.log_format,
            default_directive: self.log_level.clone(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
