//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── ReconcileError   - Blocking outcomes of an evaluation             │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  Not errors (see reconcile.rs)                                          │
//! │  ├── ReconcileWarning - AmountClampedToMaximum, recoverable            │
//! │  └── Precondition     - NoInvoiceSelected / NoRateLoaded, neutral      │
//! │                                                                         │
//! │  tally-cli errors (in app)                                             │
//! │  └── ApiError         - What the form shell sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → ReconcileError → ApiError → form view         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (input text, remaining balance)
//! 3. Errors are returned, never thrown: they describe expected operator input
//! 4. Each error variant maps to a user-facing message

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Reconcile Error
// =============================================================================

/// Blocking outcomes of evaluating a cash receipt or delivery order amount.
///
/// Every variant disables the submit action in the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The amount field holds something that is not a usable amount.
    ///
    /// ## When This Occurs
    /// - Non-numeric text on blur or submit (`"12a"`, `"1.2.3"`)
    /// - Negative amounts (`"-5"`)
    /// - Empty or zero amount on submit
    /// - Amounts above `MAX_TRANSACTION_AMOUNT`
    ///
    /// ## User Workflow
    /// ```text
    /// Amount field: "12a"  ──blur──►  InvalidAmount  ──►  field cleared
    /// ```
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// The invoice has nothing left to pay or deliver.
    ///
    /// ## When This Occurs
    /// - `remainingAmount <= 0` on the selected invoice
    ///
    /// A zero-amount transaction carries no business meaning, so this is a
    /// hard stop rather than a clamp to zero.
    #[error("Invoice is already settled (remaining {remaining_hkd} HKD)")]
    InvoiceAlreadySettled { remaining_hkd: Decimal },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl ReconcileError {
    /// Shorthand for an [`ReconcileError::InvalidAmount`] with context.
    pub fn invalid_amount(input: impl Into<String>, reason: impl Into<String>) -> Self {
        ReconcileError::InvalidAmount {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when form input doesn't meet requirements.
/// Used for early validation before reconciliation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., unknown currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ReconcileError.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = ReconcileError::invalid_amount("12a", "not a number");
        assert_eq!(err.to_string(), "Invalid amount '12a': not a number");

        let err = ReconcileError::InvoiceAlreadySettled {
            remaining_hkd: dec!(0.00),
        };
        assert_eq!(
            err.to_string(),
            "Invoice is already settled (remaining 0.00 HKD)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "deliveredBy".to_string(),
        };
        assert_eq!(err.to_string(), "deliveredBy is required");

        let err = ValidationError::MustBePositive {
            field: "hkdToMop".to_string(),
        };
        assert_eq!(err.to_string(), "hkdToMop must be positive");
    }

    #[test]
    fn test_validation_converts_to_reconcile_error() {
        let validation_err = ValidationError::Required {
            field: "invoiceNumber".to_string(),
        };
        let err: ReconcileError = validation_err.into();
        assert!(matches!(err, ReconcileError::Validation(_)));
    }
}
