//! Configuration loading and representation.

use std::env;

use thiserror::Error;

use ecert_application::{ApplicationDefaults, ExporterProfile, NavigationPolicy};
use ecert_observability::{LogFormat, TelemetryConfig};

pub const EXPORTER_TAX_ID: &str = "ECERT_EXPORTER_TAX_ID";
pub const EXPORTER_NAME: &str = "ECERT_EXPORTER_NAME";
pub const EXPORTER_ADDRESS: &str = "ECERT_EXPORTER_ADDRESS";
pub const REPLACEMENT_FEE_THB: &str = "ECERT_REPLACEMENT_FEE_THB";
pub const NAVIGATION_POLICY: &str = "ECERT_NAVIGATION_POLICY";
pub const LOG_LEVEL: &str = "ECERT_LOG_LEVEL";
pub const LOG_FORMAT: &str = "ECERT_LOG_FORMAT";

/// Top-level configuration for the application engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub defaults: ApplicationDefaults,
    pub navigation: NavigationPolicy,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative amount, got '{value}'")]
    InvalidAmount { key: &'static str, value: String },

    #[error("{key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("{key} cannot be blank")]
    Blank { key: &'static str },
}

impl AppConfig {
    /// Read `.env` when present, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallback = ExporterProfile::default();
        let text = |key: &'static str, default: String| -> Result<String, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(v) if v.trim().is_empty() => Err(ConfigError::Blank { key }),
                Some(v) => Ok(v.trim().to_string()),
            }
        };

        let exporter = ExporterProfile {
            tax_id: text(EXPORTER_TAX_ID, fallback.tax_id)?,
            name: text(EXPORTER_NAME, fallback.name)?,
            address: text(EXPORTER_ADDRESS, fallback.address)?,
        };

        let replacement_fee_thb = match lookup(REPLACEMENT_FEE_THB) {
            None => ApplicationDefaults::default().replacement_fee_thb,
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|fee| fee.is_finite() && *fee >= 0.0)
                .ok_or(ConfigError::InvalidAmount {
                    key: REPLACEMENT_FEE_THB,
                    value: raw,
                })?,
        };

        let navigation = match lookup(NAVIGATION_POLICY) {
            None => NavigationPolicy::default(),
            Some(raw) => raw.parse::<NavigationPolicy>().map_err(|message| ConfigError::InvalidValue {
                key: NAVIGATION_POLICY,
                message,
            })?,
        };

        let log_level = lookup(LOG_LEVEL).unwrap_or_else(|| "info".to_string());
        let format = match lookup(LOG_FORMAT) {
            None => LogFormat::default(),
            Some(raw) => raw.parse::<LogFormat>().map_err(|message| ConfigError::InvalidValue {
                key: LOG_FORMAT,
                message,
            })?,
        };

        Ok(Self {
            defaults: ApplicationDefaults {
                exporter,
                replacement_fee_thb,
            },
            navigation,
            telemetry: TelemetryConfig { log_level, format },
        })
    }
}
