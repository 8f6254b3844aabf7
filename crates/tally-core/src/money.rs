//! # Money Module
//!
//! Provides the currency-tagged amount types used by every reconciliation step.
//!
//! ## Why Decimal, and Why Round at the Edges?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE CONVERSION PROBLEM                                                 │
//! │                                                                         │
//! │  In the dashboard (floating point):                                     │
//! │    1000 HKD × 1.03 = 1030.0000000000002 MOP      ❌ noise               │
//! │    1029.99 MOP ÷ 1.03 = 999.9902912621359 HKD    ❌ not 2 dp            │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal + one rounding step per boundary         │
//! │    • parse the operator's text exactly                                  │
//! │    • convert without rounding (converter.rs)                            │
//! │    • round to 2 dp when crossing into HKD, and when displaying          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Strategy
//! Half away from zero (`1.005 → 1.01`), the same result operators get from
//! the dashboard's `Math.round(x * 100) / 100` and `toFixed(2)`.
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::money::{format_amount, parse_amount, AmountInput, Currency, MonetaryAmount};
//!
//! let value = parse_amount(&AmountInput::from("1029.5")).unwrap();
//! let amount = MonetaryAmount::new(value, Currency::Mop).unwrap();
//! assert_eq!(amount.to_string(), "1029.50 MOP");
//! assert_eq!(format_amount(Decimal::new(1030, 0)), "1030.00");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ReconcileError, ReconcileResult, ValidationError};
use crate::{AMOUNT_DECIMALS, MAX_TRANSACTION_AMOUNT};

// =============================================================================
// Currency
// =============================================================================

/// Currencies an operator can record a transaction in.
///
/// HKD is the canonical currency: invoice balances are always expressed in it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Hong Kong Dollar (canonical).
    #[default]
    Hkd,
    /// Macanese Pataca.
    Mop,
    /// Chinese Yuan.
    Cny,
}

impl Currency {
    /// Every supported currency, in selector order.
    pub const ALL: [Currency; 3] = [Currency::Hkd, Currency::Mop, Currency::Cny];

    /// ISO 4217 code as shown in the currency selector.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Hkd => "HKD",
            Currency::Mop => "MOP",
            Currency::Cny => "CNY",
        }
    }

    /// True for the canonical balance currency.
    #[inline]
    pub const fn is_canonical(&self) -> bool {
        matches!(self, Currency::Hkd)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    /// Parses a currency code, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();

        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: Currency::ALL.iter().map(|c| c.code().to_string()).collect(),
            })
    }
}

// =============================================================================
// Amount Input
// =============================================================================

/// Raw contents of an amount field.
///
/// Forms hand over either the text the operator typed or a number that was
/// already coerced (e.g. an amount loaded from an existing receipt).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// True when the field holds nothing at all (only whitespace counts as nothing).
    pub fn is_blank(&self) -> bool {
        match self {
            AmountInput::Number(_) => false,
            AmountInput::Text(text) => text.trim().is_empty(),
        }
    }

    /// The input as the operator would see it, for error messages.
    pub fn raw(&self) -> String {
        match self {
            AmountInput::Number(value) => value.to_string(),
            AmountInput::Text(text) => text.clone(),
        }
    }
}

impl Default for AmountInput {
    fn default() -> Self {
        AmountInput::Text(String::new())
    }
}

impl From<&str> for AmountInput {
    fn from(text: &str) -> Self {
        AmountInput::Text(text.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(text: String) -> Self {
        AmountInput::Text(text)
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

// =============================================================================
// Parsing & Rounding
// =============================================================================

/// Parses an amount field into a non-negative decimal.
///
/// ## Rules
/// - Text may contain only digits and at most one decimal point
///   (`"12"`, `"12.5"`, `".5"`, `"12."` are accepted)
/// - Negative amounts are rejected, not clamped
/// - Numbers must be finite
/// - Values above [`MAX_TRANSACTION_AMOUNT`] are rejected
///
/// Blank input is an error here; callers that tolerate blank fields check
/// [`AmountInput::is_blank`] first.
pub fn parse_amount(input: &AmountInput) -> ReconcileResult<Decimal> {
    let value = match input {
        AmountInput::Number(number) => parse_number(*number)?,
        AmountInput::Text(text) => parse_text(text)?,
    };

    if value > MAX_TRANSACTION_AMOUNT {
        return Err(ReconcileError::invalid_amount(
            input.raw(),
            format!("exceeds the maximum of {}", MAX_TRANSACTION_AMOUNT),
        ));
    }

    Ok(value)
}

fn parse_number(number: f64) -> ReconcileResult<Decimal> {
    if !number.is_finite() {
        return Err(ReconcileError::invalid_amount(
            number.to_string(),
            "not a finite number",
        ));
    }

    if number < 0.0 {
        return Err(ReconcileError::invalid_amount(
            number.to_string(),
            "negative amounts are not allowed",
        ));
    }

    // f64 Display is the shortest round-trip spelling, so 0.1 stays 0.1.
    let text = number.to_string();
    Decimal::from_str(&text).map_err(|e| ReconcileError::invalid_amount(text, e.to_string()))
}

fn parse_text(text: &str) -> ReconcileResult<Decimal> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(ReconcileError::invalid_amount(text, "amount is required"));
    }

    if let Some(unsigned) = trimmed.strip_prefix('-') {
        if is_plain_decimal(unsigned) {
            return Err(ReconcileError::invalid_amount(
                text,
                "negative amounts are not allowed",
            ));
        }
    }

    if !is_plain_decimal(trimmed) {
        return Err(ReconcileError::invalid_amount(text, "not a number"));
    }

    // "5." and ".5" are fine to type; give Decimal the canonical spelling.
    let mut normalized = trimmed.trim_end_matches('.').to_string();
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }

    Decimal::from_str(&normalized).map_err(|e| ReconcileError::invalid_amount(text, e.to_string()))
}

/// Digits with at most one '.', and at least one digit.
fn is_plain_decimal(text: &str) -> bool {
    let mut seen_point = false;
    let mut seen_digit = false;

    for c in text.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }

    seen_digit
}

/// True when `text` is an acceptable intermediate keystroke state for an
/// amount field (`""`, `"12"`, `"12."`, `".5"`).
///
/// Mirrors the `^[0-9]*\.?[0-9]*$` filter forms apply on every keystroke.
pub fn is_amount_keystroke(text: &str) -> bool {
    text.is_empty() || text == "." || is_plain_decimal(text)
}

/// Rounds to 2 decimal places, half away from zero.
#[inline]
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount with exactly 2 decimal places (`1030` → `"1030.00"`).
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_amount(value);
    rounded.rescale(AMOUNT_DECIMALS);
    rounded.to_string()
}

// =============================================================================
// Monetary Amount
// =============================================================================

/// A non-negative amount tagged with its currency.
///
/// ## Invariants
/// - `value >= 0` (enforced by [`MonetaryAmount::new`])
/// - Rounding to 2 dp happens at conversion boundaries, see [`MonetaryAmount::rounded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryAmount {
    #[ts(type = "string")]
    value: Decimal,
    currency: Currency,
}

impl MonetaryAmount {
    /// Creates an amount, rejecting negative values.
    pub fn new(value: Decimal, currency: Currency) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        Ok(MonetaryAmount { value, currency })
    }

    /// Wraps a value the reconciliation pipeline already proved non-negative.
    pub(crate) const fn normalized(value: Decimal, currency: Currency) -> Self {
        MonetaryAmount { value, currency }
    }

    #[inline]
    pub const fn value(&self) -> Decimal {
        self.value
    }

    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// The same amount rounded to 2 decimal places.
    pub fn rounded(&self) -> Self {
        MonetaryAmount {
            value: round_amount(self.value),
            currency: self.currency,
        }
    }

    /// The value as a 2-dp string, as sent to forms and the backend.
    pub fn to_fixed(&self) -> String {
        format_amount(self.value)
    }
}

/// Display shows the 2-dp value followed by the currency code.
impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_fixed(), self.currency)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
