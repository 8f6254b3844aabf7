//! # tally-core: Pure Reconciliation Logic for Tally
//!
//! This crate is the **heart** of Tally. It owns the rules for recording cash
//! receipts and delivery orders against an invoice whose outstanding balance
//! is tracked in HKD, while the operator may type amounts in HKD, MOP or CNY.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard forms                              │   │
//! │  │   Cash Receipt dialog      Delivery Order dialog                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ typed / blurred / submitted            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   rates   │  │ converter │  │  balance  │  │ reconcile │  │   │
//! │  │   │ RateTable │  │ HKD ⇄ X   │  │ clamp,    │  │ evaluate  │  │   │
//! │  │   │           │  │           │  │ settle    │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO GLOBAL STATE • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ normalized payload                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             Dashboard REST API (authoritative balances)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Currency`, `MonetaryAmount`, amount parsing and rounding
//! - [`rates`] - `CurrencyRateTable` with safe fallback defaults
//! - [`converter`] - `CurrencyConverter` (HKD ⇄ MOP/CNY)
//! - [`balance`] - `BalanceGuard` (clamp, full settlement, settleable)
//! - [`reconcile`] - `ReconciliationService`, the single entry point for forms
//! - [`types`] - Invoice snapshot and submission payloads
//! - [`validation`] - Field-level input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::{
//!     Currency, CurrencyRateTable, Evaluation, EvaluationMode, EvaluationRequest,
//!     ReconciliationService,
//! };
//!
//! let rates = CurrencyRateTable::default(); // 1 HKD = 1.03 MOP = 0.93 CNY
//! let service = ReconciliationService::default();
//!
//! let request = EvaluationRequest::new("1200", Currency::Mop, Some(Decimal::new(100000, 2)));
//! let evaluation = service.evaluate(&request, &rates, EvaluationMode::Blur).unwrap();
//!
//! let Evaluation::Normalized(tx) = evaluation else { panic!("expected a normalized amount") };
//! assert_eq!(tx.normalized_amount, "1030.00");
//! assert!(!tx.partial);
//! assert!(tx.warning.is_some());
//! ```

use rust_decimal::Decimal;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod converter;
pub mod error;
pub mod money;
pub mod rates;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Currency` instead of
// `use tally_core::money::Currency`

pub use balance::{BalanceGuard, ClampOutcome};
pub use converter::CurrencyConverter;
pub use error::{ReconcileError, ReconcileResult, ValidationError};
pub use money::{AmountInput, Currency, MonetaryAmount};
pub use rates::{CurrencyListResponse, CurrencyRateTable, RateOrigin, RatePayload};
pub use reconcile::{
    Evaluation, EvaluationMode, EvaluationRequest, NormalizedTransaction, Precondition,
    ReconcileWarning, ReconciliationService, TransactionCandidate,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fallback HKD→MOP rate (1.03) used until the rate source answers.
///
/// Display/estimation only. Submissions in MOP are declined while the table
/// still holds a fallback value (see [`Precondition::NoRateLoaded`]).
pub const DEFAULT_HKD_TO_MOP: Decimal = Decimal::from_parts(103, 0, 0, false, 2);

/// Fallback HKD→CNY rate (0.93) used until the rate source answers.
pub const DEFAULT_HKD_TO_CNY: Decimal = Decimal::from_parts(93, 0, 0, false, 2);

/// Tolerance (0.01 HKD) under which an amount counts as settling the invoice.
///
/// ## Business Reason
/// Converting MOP/CNY back and forth leaves sub-cent residue. Without a
/// tolerance a payment of exactly the displayed remaining amount could be
/// flagged as partial.
pub const SETTLEMENT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest amount (1,000,000,000,000) accepted from an input field, in any currency.
///
/// ## Business Reason
/// Keeps every conversion far away from `Decimal` overflow and catches
/// runaway typing (an extra six zeros) before it reaches the backend.
pub const MAX_TRANSACTION_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Decimal places kept at rest and on every conversion boundary.
pub const AMOUNT_DECIMALS: u32 = 2;
