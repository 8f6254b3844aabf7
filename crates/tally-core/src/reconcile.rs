//! # Reconcile Module
//!
//! The single entry point forms use to validate and normalize a cash receipt
//! or delivery order amount before it is shown or submitted.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EvaluationRequest { amount_input, currency, remaining_hkd }            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  1. invoice selected?        no  ──► Declined(NoInvoiceSelected)        │
//! │  2. remaining > 0?           no  ──► Err(InvoiceAlreadySettled)         │
//! │  3. parse per mode           ──────► Cleared | Err(InvalidAmount)       │
//! │  4. submit on fallback rate? yes ──► Declined(NoRateLoaded)             │
//! │  5. maximum rounds to 0.00?  yes ──► Cleared | Err(InvalidAmount)       │
//! │  6. round → to_hkd → round (the displayed maximum maps to remaining)    │
//! │  7. clamp to remaining       ──────► AmountClampedToMaximum (warning)   │
//! │  8. partial = !full settlement (the displayed maximum is always full)   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Normalized { "1030.00", MOP, amount_hkd, partial, warning? }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modes
//! | Mode     | Empty input      | Unparsable        | Zero            |
//! |----------|------------------|-------------------|-----------------|
//! | `Typing` | `Cleared`        | `Cleared`         | normalized      |
//! | `Blur`   | `Cleared`        | `InvalidAmount`   | normalized      |
//! | `Submit` | `InvalidAmount`  | `InvalidAmount`   | `InvalidAmount` |
//!
//! Evaluation is pure: the same request against the same rate snapshot always
//! yields the same result, so forms can re-run it on every keystroke.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::balance::BalanceGuard;
use crate::converter::CurrencyConverter;
use crate::error::{ReconcileError, ReconcileResult};
use crate::money::{format_amount, parse_amount, round_amount, AmountInput, Currency, MonetaryAmount};
use crate::rates::CurrencyRateTable;

// =============================================================================
// Request
// =============================================================================

/// How strictly the amount field is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationMode {
    /// The operator is still typing.
    #[default]
    Typing,
    /// The amount field lost focus.
    Blur,
    /// The operator pressed submit.
    Submit,
}

/// A candidate amount to evaluate against an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub amount_input: AmountInput,
    pub currency: Currency,
    /// Remaining balance of the selected invoice, `None` when nothing is selected.
    #[ts(type = "string | number | null")]
    pub remaining_hkd: Option<Decimal>,
}

impl EvaluationRequest {
    pub fn new(
        amount_input: impl Into<AmountInput>,
        currency: Currency,
        remaining_hkd: Option<Decimal>,
    ) -> Self {
        EvaluationRequest {
            amount_input: amount_input.into(),
            currency,
            remaining_hkd,
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Preconditions under which evaluation declines to produce an amount.
///
/// Forms show a neutral empty state for these, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum Precondition {
    NoInvoiceSelected,
    /// Only fallback rates are available and the amount is not in HKD.
    NoRateLoaded,
}

/// Recoverable conditions reported alongside a corrected amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReconcileWarning {
    /// The amount exceeded the remaining balance and was lowered to it.
    AmountClampedToMaximum {
        #[ts(type = "string")]
        requested: Decimal,
        #[ts(type = "string")]
        maximum: Decimal,
        currency: Currency,
        #[serde(rename = "remainingHkd")]
        #[ts(type = "string")]
        remaining_hkd: Decimal,
    },
}

impl fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileWarning::AmountClampedToMaximum {
                maximum,
                currency,
                remaining_hkd,
                ..
            } => write!(
                f,
                "Amount exceeds the remaining balance, adjusted to {} {} ({} HKD)",
                format_amount(*maximum),
                currency,
                format_amount(*remaining_hkd)
            ),
        }
    }
}

/// An amount that passed evaluation, ready to display or submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    /// 2-dp amount in the display currency, e.g. `"1030.00"`.
    pub normalized_amount: String,
    pub normalized_currency: Currency,
    /// Final amount in HKD after clamping.
    #[ts(type = "string")]
    pub amount_hkd: Decimal,
    pub partial: bool,
    pub warning: Option<ReconcileWarning>,
    #[serde(skip)]
    #[ts(skip)]
    value: Decimal,
}

/// The amount and partial flag that end up in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionCandidate {
    pub amount: MonetaryAmount,
    pub partial: bool,
}

impl NormalizedTransaction {
    /// The normalized amount as a decimal in the display currency.
    #[inline]
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// The amount and partial flag as they would be submitted.
    pub fn candidate(&self) -> TransactionCandidate {
        TransactionCandidate {
            amount: MonetaryAmount::normalized(self.value, self.normalized_currency),
            partial: self.partial,
        }
    }
}

/// Result of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum Evaluation {
    Normalized(NormalizedTransaction),
    /// Nothing usable typed yet; the form shows an empty amount.
    Cleared,
    Declined(Precondition),
}

impl Evaluation {
    pub fn normalized(&self) -> Option<&NormalizedTransaction> {
        match self {
            Evaluation::Normalized(tx) => Some(tx),
            _ => None,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Validates and normalizes transaction amounts.
///
/// Holds no state beyond its [`BalanceGuard`]; rates and balances are passed
/// in on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationService {
    guard: BalanceGuard,
}

impl ReconciliationService {
    pub fn new(guard: BalanceGuard) -> Self {
        ReconciliationService { guard }
    }

    #[inline]
    pub fn guard(&self) -> &BalanceGuard {
        &self.guard
    }

    /// Evaluates a candidate amount. See the module docs for the pipeline.
    pub fn evaluate(
        &self,
        request: &EvaluationRequest,
        rates: &CurrencyRateTable,
        mode: EvaluationMode,
    ) -> ReconcileResult<Evaluation> {
        let remaining = match self.settleable_remaining(request.remaining_hkd)? {
            Some(remaining) => remaining,
            None => return Ok(Evaluation::Declined(Precondition::NoInvoiceSelected)),
        };

        let amount = match parse_for_mode(&request.amount_input, mode)? {
            Some(amount) => amount,
            None => return Ok(Evaluation::Cleared),
        };

        let currency = request.currency;
        if mode == EvaluationMode::Submit && !currency.is_canonical() && !rates.is_authoritative() {
            return Ok(Evaluation::Declined(Precondition::NoRateLoaded));
        }

        let maximum = match self.representable_maximum(remaining, currency, rates, &request.amount_input) {
            Ok(maximum) => maximum,
            Err(_) if mode == EvaluationMode::Typing => return Ok(Evaluation::Cleared),
            Err(err) => return Err(err),
        };

        // The displayed maximum stands for the whole remaining balance, even
        // when converting it back lands a cent off in HKD.
        let requested = round_amount(amount);
        let requested_hkd = if requested == maximum {
            remaining
        } else {
            round_amount(CurrencyConverter::new(rates).to_hkd(requested, currency))
        };

        let outcome = self.guard.clamp(requested_hkd, remaining);
        let (value, warning) = if outcome.was_clamped {
            let warning = ReconcileWarning::AmountClampedToMaximum {
                requested,
                maximum,
                currency,
                remaining_hkd: remaining,
            };
            (maximum, Some(warning))
        } else {
            (requested, None)
        };

        let amount_hkd = outcome.clamped_amount_hkd;
        let partial = !self.guard.is_full_settlement(amount_hkd, remaining);

        Ok(Evaluation::Normalized(NormalizedTransaction {
            normalized_amount: format_amount(value),
            normalized_currency: currency,
            amount_hkd,
            partial,
            warning,
            value,
        }))
    }

    /// The remaining balance expressed in `currency`, rounded to 2 dp.
    ///
    /// Negative balances project to zero.
    pub fn max_allowed(
        &self,
        remaining_hkd: Decimal,
        currency: Currency,
        rates: &CurrencyRateTable,
    ) -> Decimal {
        let remaining = round_amount(remaining_hkd).max(Decimal::ZERO);
        round_amount(CurrencyConverter::new(rates).from_hkd(remaining, currency))
    }

    /// A full-settlement transaction for the whole remaining balance.
    ///
    /// Used to fill the amount field when an invoice is picked and the field
    /// is still empty.
    pub fn prefill(
        &self,
        remaining_hkd: Decimal,
        currency: Currency,
        rates: &CurrencyRateTable,
    ) -> ReconcileResult<NormalizedTransaction> {
        let remaining = round_amount(remaining_hkd);
        if !self.guard.is_settleable(remaining) {
            return Err(ReconcileError::InvoiceAlreadySettled {
                remaining_hkd: remaining,
            });
        }

        let value = self.representable_maximum(remaining, currency, rates, &AmountInput::default())?;
        Ok(NormalizedTransaction {
            normalized_amount: format_amount(value),
            normalized_currency: currency,
            amount_hkd: remaining,
            partial: false,
            warning: None,
            value,
        })
    }

    /// Re-expresses the current amount in `new_currency` and re-evaluates it.
    ///
    /// The amount is converted through HKD, so switching MOP → CNY keeps the
    /// same HKD value. An empty amount is prefilled with the maximum in the
    /// new currency.
    pub fn switch_currency(
        &self,
        request: &EvaluationRequest,
        new_currency: Currency,
        rates: &CurrencyRateTable,
    ) -> ReconcileResult<Evaluation> {
        let remaining = match self.settleable_remaining(request.remaining_hkd)? {
            Some(remaining) => remaining,
            None => return Ok(Evaluation::Declined(Precondition::NoInvoiceSelected)),
        };

        if request.amount_input.is_blank() {
            return self
                .prefill(remaining, new_currency, rates)
                .map(Evaluation::Normalized);
        }

        let amount = parse_amount(&request.amount_input)?;
        let converted = CurrencyConverter::new(rates).convert(
            round_amount(amount),
            request.currency,
            new_currency,
        );

        let switched = EvaluationRequest::new(format_amount(converted), new_currency, Some(remaining));
        self.evaluate(&switched, rates, EvaluationMode::Blur)
    }

    /// [`Self::max_allowed`], rejected when the balance is too small to show
    /// in `currency` (e.g. 0.01 HKD at a rate below 0.5).
    fn representable_maximum(
        &self,
        remaining_hkd: Decimal,
        currency: Currency,
        rates: &CurrencyRateTable,
        input: &AmountInput,
    ) -> ReconcileResult<Decimal> {
        let maximum = self.max_allowed(remaining_hkd, currency, rates);
        if maximum.is_zero() {
            return Err(ReconcileError::invalid_amount(
                input.raw(),
                format!(
                    "remaining balance of {} HKD is less than 0.01 {}",
                    format_amount(remaining_hkd),
                    currency
                ),
            ));
        }
        Ok(maximum)
    }

    /// `Ok(None)` when no invoice is selected, an error when it is settled.
    fn settleable_remaining(&self, remaining_hkd: Option<Decimal>) -> ReconcileResult<Option<Decimal>> {
        let Some(remaining) = remaining_hkd else {
            return Ok(None);
        };

        let remaining = round_amount(remaining);
        if !self.guard.is_settleable(remaining) {
            return Err(ReconcileError::InvoiceAlreadySettled {
                remaining_hkd: remaining,
            });
        }

        Ok(Some(remaining))
    }
}

/// Parses the amount field under `mode`'s strictness.
///
/// `Ok(None)` means "nothing to show yet".
fn parse_for_mode(input: &AmountInput, mode: EvaluationMode) -> ReconcileResult<Option<Decimal>> {
    if input.is_blank() {
        return match mode {
            EvaluationMode::Submit => Err(ReconcileError::invalid_amount(
                input.raw(),
                "amount is required",
            )),
            EvaluationMode::Typing | EvaluationMode::Blur => Ok(None),
        };
    }

    match mode {
        EvaluationMode::Typing => Ok(parse_amount(input).ok()),
        EvaluationMode::Blur => parse_amount(input).map(Some),
        EvaluationMode::Submit => {
            let amount = parse_amount(input)?;
            if round_amount(amount).is_zero() {
                return Err(ReconcileError::invalid_amount(
                    input.raw(),
                    "amount must be greater than zero",
                ));
            }
            Ok(Some(amount))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
