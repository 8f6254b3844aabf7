//! # Rates Module
//!
//! Holds the latest known HKD→MOP and HKD→CNY exchange rates.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Rate Table Lifecycle                                │
//! │                                                                         │
//! │   dialog opens                                                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────────┐     GET /v1/currency/list    ┌───────────────┐  │
//! │   │ Fallback         │ ───────────────────────────► │ Rate source   │  │
//! │   │ 1.03 / 0.93      │                              └───────┬───────┘  │
//! │   └────────┬─────────┘                                      │          │
//! │            │  load(Some(valid))  ◄──────────────────────────┘          │
//! │            ▼                                                            │
//! │   ┌──────────────────┐                                                  │
//! │   │ Backend          │  load(None | malformed) → unchanged              │
//! │   │ replaced whole   │  load(Some(valid))      → replaced whole         │
//! │   └──────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fallback rates keep the forms usable while the fetch is in flight. They
//! are good for estimates and hints only; see
//! [`Precondition::NoRateLoaded`](crate::reconcile::Precondition::NoRateLoaded).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Currency;
use crate::validation::{validate_rate, validate_rate_update};
use crate::{DEFAULT_HKD_TO_CNY, DEFAULT_HKD_TO_MOP};

// =============================================================================
// Rate Source Payloads
// =============================================================================

/// One rate record as served by the rate source.
///
/// Both fields are optional on the wire; a record missing either one is
/// treated as malformed by [`CurrencyRateTable::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RatePayload {
    #[serde(default)]
    #[ts(type = "string | number | null")]
    pub hkd_to_mop: Option<Decimal>,

    #[serde(default)]
    #[ts(type = "string | number | null")]
    pub hkd_to_cny: Option<Decimal>,
}

impl RatePayload {
    pub fn new(hkd_to_mop: Decimal, hkd_to_cny: Decimal) -> Self {
        RatePayload {
            hkd_to_mop: Some(hkd_to_mop),
            hkd_to_cny: Some(hkd_to_cny),
        }
    }
}

/// Envelope of the rate source response: `{ "currency": [ { ... } ] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrencyListResponse {
    #[serde(default)]
    pub currency: Vec<RatePayload>,
}

impl CurrencyListResponse {
    /// The record the dashboard uses (the first one), if any.
    pub fn first(&self) -> Option<RatePayload> {
        self.currency.first().copied()
    }
}

// =============================================================================
// Currency Rate Table
// =============================================================================

/// Where the rates in a table came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum RateOrigin {
    /// Built-in or configured defaults; estimation only.
    #[default]
    Fallback,
    /// Loaded from the rate source.
    Backend,
}

/// Current HKD→MOP and HKD→CNY rates. HKD is always the identity rate.
///
/// ## Invariants
/// - Both rates are > 0 (and within the bounds of [`validate_rate`])
/// - A refresh replaces both rates at once, never one of them
///
/// The table is `Copy`: evaluations take a snapshot, never a live reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRateTable {
    #[ts(type = "string")]
    hkd_to_mop: Decimal,
    #[ts(type = "string")]
    hkd_to_cny: Decimal,
    origin: RateOrigin,
}

impl Default for CurrencyRateTable {
    /// 1 HKD = 1.03 MOP = 0.93 CNY, marked as fallback.
    fn default() -> Self {
        CurrencyRateTable {
            hkd_to_mop: DEFAULT_HKD_TO_MOP,
            hkd_to_cny: DEFAULT_HKD_TO_CNY,
            origin: RateOrigin::Fallback,
        }
    }
}

impl CurrencyRateTable {
    /// Builds a table from authoritative rates.
    pub fn new(hkd_to_mop: Decimal, hkd_to_cny: Decimal) -> Result<Self, ValidationError> {
        validate_rate("hkdToMop", hkd_to_mop)?;
        validate_rate("hkdToCny", hkd_to_cny)?;

        Ok(CurrencyRateTable {
            hkd_to_mop,
            hkd_to_cny,
            origin: RateOrigin::Backend,
        })
    }

    /// Builds a fallback table from configured defaults.
    pub fn with_fallback(hkd_to_mop: Decimal, hkd_to_cny: Decimal) -> Result<Self, ValidationError> {
        let table = CurrencyRateTable::new(hkd_to_mop, hkd_to_cny)?;
        Ok(CurrencyRateTable {
            origin: RateOrigin::Fallback,
            ..table
        })
    }

    /// Applies a rate source response.
    ///
    /// Returns `true` when the table was replaced. An absent or malformed
    /// payload (missing or non-positive rate) leaves the table untouched and
    /// returns `false`; no error is raised.
    pub fn load(&mut self, rates: Option<RatePayload>) -> bool {
        let Some(payload) = rates else {
            return false;
        };

        match validate_rate_update(payload.hkd_to_mop, payload.hkd_to_cny) {
            Ok((hkd_to_mop, hkd_to_cny)) => {
                *self = CurrencyRateTable {
                    hkd_to_mop,
                    hkd_to_cny,
                    origin: RateOrigin::Backend,
                };
                true
            }
            Err(_) => false,
        }
    }

    #[inline]
    pub const fn hkd_to_mop(&self) -> Decimal {
        self.hkd_to_mop
    }

    #[inline]
    pub const fn hkd_to_cny(&self) -> Decimal {
        self.hkd_to_cny
    }

    #[inline]
    pub const fn origin(&self) -> RateOrigin {
        self.origin
    }

    /// True once the rates came from the rate source.
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.origin == RateOrigin::Backend
    }

    /// Multiplier that turns 1 HKD into `currency`.
    pub fn rate_for(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Hkd => Decimal::ONE,
            Currency::Mop => self.hkd_to_mop,
            Currency::Cny => self.hkd_to_cny,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
