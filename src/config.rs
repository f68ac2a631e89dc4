//! Server configuration read from environment variables.

use thiserror::Error;

use crate::application::stock_ledger::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::infrastructure::simulated_gateway::DEFAULT_SUCCESS_RATE;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Reads:
/// - `DATABASE_URL`: PostgreSQL URL; when unset the in-memory store is used
/// - `HOST` (default `0.0.0.0`) and `PORT` (default `8080`)
/// - `LOW_STOCK_THRESHOLD` (default `5`)
/// - `PAYMENT_SUCCESS_RATE` (default `0.9`, within `0..=1`)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub low_stock_threshold: i32,
    pub payment_success_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            payment_success_rate: DEFAULT_SUCCESS_RATE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(v) => parse(&v, "PORT", "a port number")?,
            None => defaults.port,
        };
        let low_stock_threshold = match get("LOW_STOCK_THRESHOLD") {
            Some(v) => parse::<i32>(&v, "LOW_STOCK_THRESHOLD", "a non-negative integer")
                .and_then(|t| {
                    non_negative(t, &v, "LOW_STOCK_THRESHOLD", "a non-negative integer")
                })?,
            None => defaults.low_stock_threshold,
        };
        let payment_success_rate = match get("PAYMENT_SUCCESS_RATE") {
            Some(v) => {
                let rate: f64 = parse(&v, "PAYMENT_SUCCESS_RATE", "a number between 0 and 1")?;
                if !(0.0..=1.0).contains(&rate) {
                    return Err(ConfigError::Invalid {
                        name: "PAYMENT_SUCCESS_RATE",
                        expected: "a number between 0 and 1",
                        value: v,
                    });
                }
                rate
            }
            None => defaults.payment_success_rate,
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            low_stock_threshold,
            payment_success_rate,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    value: &str,
    name: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value: value.to_string(),
    })
}

fn non_negative(
    parsed: i32,
    value: &str,
    name: &'static str,
    expected: &'static str,
) -> Result<i32, ConfigError> {
    if parsed < 0 {
        return Err(ConfigError::Invalid {
            name,
            expected,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}
