//! # Configuration
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TALLY_*`)
//! 2. Defaults (this file)
//!
//! | Variable                     | Default | Meaning                          |
//! |------------------------------|---------|----------------------------------|
//! | `TALLY_FALLBACK_HKD_TO_MOP`  | 1.03    | MOP rate until the fetch answers |
//! | `TALLY_FALLBACK_HKD_TO_CNY`  | 0.93    | CNY rate until the fetch answers |
//! | `TALLY_SETTLEMENT_EPSILON`   | 0.01    | Full-settlement tolerance (HKD)  |
//! | `TALLY_LOG`                  | info    | Log filter (`RUST_LOG` wins)     |
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no lock is needed.

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;
use tally_core::{
    BalanceGuard, CurrencyRateTable, ReconciliationService, ValidationError, DEFAULT_HKD_TO_CNY,
    DEFAULT_HKD_TO_MOP, SETTLEMENT_EPSILON,
};

/// Default log filter when neither `RUST_LOG` nor `TALLY_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Rates used until the rate source answers (estimation only).
    pub fallback_rates: CurrencyRateTable,

    /// Clamp and full-settlement checks, with the configured epsilon.
    pub guard: BalanceGuard,

    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            fallback_rates: CurrencyRateTable::default(),
            guard: BalanceGuard::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        AppConfig::from_lookup(|var| env::var(var).ok())
    }

    /// Loads configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hkd_to_mop = decimal_var(&lookup, "TALLY_FALLBACK_HKD_TO_MOP", DEFAULT_HKD_TO_MOP)?;
        let hkd_to_cny = decimal_var(&lookup, "TALLY_FALLBACK_HKD_TO_CNY", DEFAULT_HKD_TO_CNY)?;
        let epsilon = decimal_var(&lookup, "TALLY_SETTLEMENT_EPSILON", SETTLEMENT_EPSILON)?;

        let fallback_rates = CurrencyRateTable::with_fallback(hkd_to_mop, hkd_to_cny).map_err(
            |source| ConfigError::Rejected {
                var: "TALLY_FALLBACK_HKD_TO_*".to_string(),
                source,
            },
        )?;

        let guard = BalanceGuard::new(epsilon).map_err(|source| ConfigError::Rejected {
            var: "TALLY_SETTLEMENT_EPSILON".to_string(),
            source,
        })?;

        let log_filter = lookup("TALLY_LOG")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(AppConfig {
            fallback_rates,
            guard,
            log_filter,
        })
    }

    /// A reconciliation service using the configured epsilon.
    pub fn service(&self) -> ReconciliationService {
        ReconciliationService::new(self.guard)
    }
}

fn decimal_var<F>(lookup: &F, var: &str, default: Decimal) -> Result<Decimal, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => {
            Decimal::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue(var.to_string()))
        }
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid value for {var}: {source}")]
    Rejected {
        var: String,
        #[source]
        source: ValidationError,
    },
}
