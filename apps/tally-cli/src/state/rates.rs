//! # Rate State
//!
//! The in-memory exchange rate cache shared by every open form.
//!
//! ## Thread Safety
//! The table sits behind `Arc<RwLock<T>>`:
//! 1. Every evaluation reads a snapshot (many readers)
//! 2. A refresh swaps the whole table (single writer)
//! 3. Forms never hold the lock while evaluating
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Rate Cache Operations                                │
//! │                                                                         │
//! │  Event                    Call                    Cache Change          │
//! │  ─────                    ────                    ────────────          │
//! │                                                                         │
//! │  Startup ───────────────► RateState::new() ─────► fallback table        │
//! │                                                                         │
//! │  Fetch answered ────────► apply_response() ─────► table replaced whole  │
//! │                                                                         │
//! │  Fetch failed ──────────► refresh(None) ────────► unchanged             │
//! │                                                                         │
//! │  Evaluate ──────────────► snapshot() ───────────► (read only, Copy)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tally_core::{CurrencyListResponse, CurrencyRateTable, RatePayload};
use tracing::{info, warn};

/// Cached table plus when it was last replaced by the rate source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCache {
    pub table: CurrencyRateTable,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Shared handle to the rate cache.
#[derive(Debug, Clone)]
pub struct RateState {
    cache: Arc<RwLock<RateCache>>,
}

impl RateState {
    /// Creates a cache holding the fallback table.
    pub fn new(fallback: CurrencyRateTable) -> Self {
        RateState {
            cache: Arc::new(RwLock::new(RateCache {
                table: fallback,
                loaded_at: None,
            })),
        }
    }

    /// The current table, by value.
    pub fn snapshot(&self) -> CurrencyRateTable {
        self.read().table
    }

    /// The whole cache entry, by value.
    pub fn cache(&self) -> RateCache {
        *self.read()
    }

    /// Applies one rate record. Returns `true` when the table was replaced.
    pub fn refresh(&self, payload: Option<RatePayload>) -> bool {
        let mut cache = self.write();
        let mut table = cache.table;

        if !table.load(payload) {
            warn!(
                origin = ?cache.table.origin(),
                "Rate payload missing or malformed, keeping current rates"
            );
            return false;
        }

        *cache = RateCache {
            table,
            loaded_at: Some(Utc::now()),
        };
        info!(
            hkd_to_mop = %table.hkd_to_mop(),
            hkd_to_cny = %table.hkd_to_cny(),
            "Exchange rates loaded"
        );
        true
    }

    /// Applies a rate source response (its first record).
    pub fn apply_response(&self, response: &CurrencyListResponse) -> bool {
        self.refresh(response.first())
    }

    // Writes are a single assignment, so a poisoned lock still holds a whole table.
    fn read(&self) -> RwLockReadGuard<'_, RateCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RateCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateState {
    fn default() -> Self {
        Self::new(CurrencyRateTable::default())
    }
}
