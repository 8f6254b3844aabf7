//! # API Error Type
//!
//! Unified error type for form commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally                                  │
//! │                                                                         │
//! │  Form event                  Rust                                       │
//! │  ──────────                  ────                                       │
//! │                                                                         │
//! │  amountBlurred                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  FormSession handler                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad amount? ──── ReconcileError::InvalidAmount ──┐             │  │
//! │  │         │                                         │             │  │
//! │  │         ▼                                         ▼             │  │
//! │  │  Settled? ─────── ReconcileError::InvoiceAlreadySettled ─► ApiError │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ─────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The form view carries { code: "INVALID_AMOUNT", message: "..." }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup and I/O failures use [`SessionError`]; anything shown inside a
//! form uses [`ApiError`].

use serde::Serialize;
use tally_core::{Precondition, ReconcileError, ValidationError};

use crate::config::ConfigError;

/// Error shown by a form.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INVOICE_SETTLED",
///   "message": "Invoice is already settled (remaining 0.00 HKD)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for form responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Amount field is empty, non-numeric, negative, zero or too large
    InvalidAmount,

    /// Invoice has no remaining balance
    InvoiceSettled,

    /// A form field failed validation
    ValidationError,

    /// Only fallback rates are loaded
    RatesUnavailable,

    /// Bad configuration
    ConfigError,

    /// Unreadable session input
    InputError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an input error.
    pub fn input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InputError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts reconciliation errors to API errors.
impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::InvalidAmount { .. } => {
                ApiError::new(ErrorCode::InvalidAmount, err.to_string())
            }
            ReconcileError::InvoiceAlreadySettled { .. } => {
                ApiError::new(ErrorCode::InvoiceSettled, err.to_string())
            }
            ReconcileError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// A declined evaluation blocks submission like an error does.
impl From<Precondition> for ApiError {
    fn from(precondition: Precondition) -> Self {
        match precondition {
            Precondition::NoInvoiceSelected => ValidationError::Required {
                field: "invoiceNumber".to_string(),
            }
            .into(),
            Precondition::NoRateLoaded => ApiError::new(
                ErrorCode::RatesUnavailable,
                "Exchange rates are still loading; only HKD can be submitted",
            ),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Config(e) => e.into(),
            SessionError::Output(e) => {
                tracing::error!("Failed to write output: {}", e);
                ApiError::internal("Failed to write output")
            }
            other => ApiError::input(other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Errors that stop a session before or while it runs.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Usage: tally-cli <session.json | ->")]
    MissingArgument,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),
}
