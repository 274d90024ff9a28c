use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use broker_core::AppError;

/// Minimum accepted length of the API bearer token.
pub const API_TOKEN_MIN_LENGTH: usize = 16;

/// Backend holding roles, configuration and lease records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres { database_url: String },
}

#[derive(Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub api_token: String,
    pub storage_backend: StorageBackend,
    pub lease_default_ttl: Duration,
    pub lease_max_ttl: Duration,
    pub lease_sweep_interval: Duration,
    pub token_http_timeout: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_token = lookup("BROKER_API_TOKEN")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("BROKER_API_TOKEN is required".to_owned()))?;
        if api_token.len() < API_TOKEN_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "BROKER_API_TOKEN must be at least {API_TOKEN_MIN_LENGTH} characters"
            )));
        }

        let api_host = lookup("BROKER_API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or("BROKER_API_PORT", &lookup, 8200_u16)?;

        let storage_backend = match lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres {
                database_url: lookup("DATABASE_URL").ok_or_else(|| {
                    AppError::Validation(
                        "DATABASE_URL is required when STORAGE_BACKEND=postgres".to_owned(),
                    )
                })?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "STORAGE_BACKEND must be 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        let lease_default_ttl =
            Duration::from_secs(parse_or("LEASE_DEFAULT_TTL_SECONDS", &lookup, 3600_u64)?);
        let lease_max_ttl =
            Duration::from_secs(parse_or("LEASE_MAX_TTL_SECONDS", &lookup, 86_400_u64)?);
        if lease_default_ttl.is_zero() || lease_default_ttl > lease_max_ttl {
            return Err(AppError::Validation(
                "LEASE_DEFAULT_TTL_SECONDS must be positive and not exceed LEASE_MAX_TTL_SECONDS"
                    .to_owned(),
            ));
        }

        let lease_sweep_interval =
            Duration::from_millis(parse_or("LEASE_SWEEP_INTERVAL_MS", &lookup, 5000_u64)?.max(100));
        let token_http_timeout =
            Duration::from_secs(parse_or("TOKEN_HTTP_TIMEOUT_SECONDS", &lookup, 15_u64)?.max(1));

        Ok(Self {
            api_host,
            api_port,
            api_token,
            storage_backend,
            lease_default_ttl,
            lease_max_ttl,
            lease_sweep_interval,
            token_http_timeout,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let ip = IpAddr::from_str(self.api_host.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid BROKER_API_HOST '{}': {error}", self.api_host))
        })?;

        Ok(SocketAddr::from((ip, self.api_port)))
    }
}

fn parse_or<T>(name: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        None => Ok(default),
    }
}
