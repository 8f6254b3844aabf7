//! # Validation Module
//!
//! Field-level input checks for the rate, receipt and delivery forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form shell                                                    │
//! │  ├── Keystroke filter (digits and one '.')                              │
//! │  └── Immediate operator feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: tally-core                                                    │
//! │  ├── Amount parsing & balance rules (money.rs, reconcile.rs)            │
//! │  └── THIS MODULE: rates, invoice numbers, delivered-by                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Dashboard REST API                                            │
//! │  └── Authoritative re-validation of every submission                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::validation::{validate_invoice_number, validate_rate};
//!
//! validate_invoice_number("INV-2024-001").unwrap();
//! validate_rate("hkdToMop", Decimal::new(103, 2)).unwrap();
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest invoice number the dashboard issues.
pub const MAX_INVOICE_NUMBER_LEN: usize = 64;

/// Longest "delivered by" name accepted on a delivery order.
pub const MAX_DELIVERED_BY_LEN: usize = 100;

/// Smallest accepted HKD→X rate (0.0001).
pub const MIN_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Largest accepted HKD→X rate (10000).
pub const MAX_RATE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

// =============================================================================
// String Validators
// =============================================================================

/// Validates an invoice number.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_INVOICE_NUMBER_LEN`] characters
/// - No whitespace inside (it becomes part of `REC-{invoiceNumber}`)
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_invoice_number;
///
/// assert!(validate_invoice_number("INV-001").is_ok());
/// assert!(validate_invoice_number("  ").is_err());
/// assert!(validate_invoice_number("INV 001").is_err());
/// ```
pub fn validate_invoice_number(invoice_number: &str) -> ValidationResult<()> {
    let invoice_number = invoice_number.trim();

    if invoice_number.is_empty() {
        return Err(ValidationError::Required {
            field: "invoiceNumber".to_string(),
        });
    }

    if invoice_number.chars().count() > MAX_INVOICE_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: "invoiceNumber".to_string(),
            max: MAX_INVOICE_NUMBER_LEN,
        });
    }

    if invoice_number.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "invoiceNumber".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates the "delivered by" field of a delivery order and returns it trimmed.
pub fn validate_delivered_by(delivered_by: Option<&str>) -> ValidationResult<String> {
    let name = delivered_by.map(str::trim).unwrap_or_default();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "deliveredBy".to_string(),
        });
    }

    if name.chars().count() > MAX_DELIVERED_BY_LEN {
        return Err(ValidationError::TooLong {
            field: "deliveredBy".to_string(),
            max: MAX_DELIVERED_BY_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a single HKD→X exchange rate.
///
/// ## Rules
/// - Must be > 0
/// - Must lie within [`MIN_RATE`]..=[`MAX_RATE`], which keeps conversions of
///   any accepted amount inside `Decimal` range
pub fn validate_rate(field: &str, rate: Decimal) -> ValidationResult<()> {
    if rate <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if rate < MIN_RATE || rate > MAX_RATE {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("must be between {} and {}", MIN_RATE, MAX_RATE),
        });
    }

    Ok(())
}

/// Validates a complete rate update (both rates required and positive).
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::validation::validate_rate_update;
///
/// let (mop, cny) = validate_rate_update(Some(Decimal::new(104, 2)), Some(Decimal::new(92, 2))).unwrap();
/// assert_eq!(mop, Decimal::new(104, 2));
/// assert_eq!(cny, Decimal::new(92, 2));
///
/// assert!(validate_rate_update(None, Some(Decimal::ONE)).is_err());
/// ```
pub fn validate_rate_update(
    hkd_to_mop: Option<Decimal>,
    hkd_to_cny: Option<Decimal>,
) -> ValidationResult<(Decimal, Decimal)> {
    let hkd_to_mop = hkd_to_mop.ok_or_else(|| ValidationError::Required {
        field: "hkdToMop".to_string(),
    })?;
    let hkd_to_cny = hkd_to_cny.ok_or_else(|| ValidationError::Required {
        field: "hkdToCny".to_string(),
    })?;

    validate_rate("hkdToMop", hkd_to_mop)?;
    validate_rate("hkdToCny", hkd_to_cny)?;

    Ok((hkd_to_mop, hkd_to_cny))
}

/// Validates a full-settlement tolerance (HKD). Must be > 0 and below 1 HKD.
pub fn validate_epsilon(epsilon: Decimal) -> ValidationResult<()> {
    if epsilon <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "settlementEpsilon".to_string(),
        });
    }

    if epsilon >= Decimal::ONE {
        return Err(ValidationError::InvalidFormat {
            field: "settlementEpsilon".to_string(),
            reason: "must be less than 1 HKD".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
