//! # Domain Types
//!
//! Shapes that cross the dashboard boundary: the invoice snapshot the forms
//! read, and the payloads they submit.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │   Invoice source                          Submission sink               │
//! │  ┌─────────────────────┐   evaluate   ┌──────────────────────────┐     │
//! │  │  InvoiceSnapshot    │ ───────────► │  CashReceiptPayload      │     │
//! │  │  ─────────────────  │              │  receiptNumber REC-{inv} │     │
//! │  │  invoiceNumber      │              │  amount, currency        │     │
//! │  │  amount, currency   │              │  partialDelivery         │     │
//! │  │  remainingAmount    │              ├──────────────────────────┤     │
//! │  │  (always HKD)       │              │  DeliveryOrderPayload    │     │
//! │  └─────────────────────┘              │  amountOfDelivery        │     │
//! │                                       │  deliveredBy             │     │
//! │  TransactionRecord (edit) ──────────► └──────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend stays authoritative for balances. A snapshot is read-only
//! here: nothing in this crate decrements `remainingAmount`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{round_amount, AmountInput, Currency};
use crate::reconcile::{EvaluationRequest, TransactionCandidate};
use crate::validation::{validate_delivered_by, validate_invoice_number};

// =============================================================================
// Invoice Snapshot
// =============================================================================

/// Whether an invoice still has a balance to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    Partial,
    Complete,
}

/// Invoice fields the reconciliation forms consume.
///
/// Amounts arrive as JSON numbers or numeric strings; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSnapshot {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub invoice_number: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Invoice total in its own currency.
    #[serde(default)]
    #[ts(type = "number | string")]
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    #[ts(type = "number | string | null")]
    pub amount_in_hkd: Option<Decimal>,
    /// Outstanding balance, always HKD.
    #[ts(type = "number | string")]
    pub remaining_amount: Decimal,
}

impl InvoiceSnapshot {
    /// Remaining balance rounded to 2 dp.
    pub fn remaining_hkd(&self) -> Decimal {
        round_amount(self.remaining_amount)
    }

    pub fn payment_status(&self) -> PaymentStatus {
        if self.remaining_hkd() <= Decimal::ZERO {
            PaymentStatus::Complete
        } else {
            PaymentStatus::Partial
        }
    }

    /// True once nothing is left to pay or deliver.
    #[inline]
    pub fn is_fulfilled(&self) -> bool {
        self.payment_status() == PaymentStatus::Complete
    }

    /// Builds an evaluation request for an amount typed against this invoice.
    pub fn request(&self, amount_input: impl Into<AmountInput>, currency: Currency) -> EvaluationRequest {
        EvaluationRequest::new(amount_input, currency, Some(self.remaining_amount))
    }
}

// =============================================================================
// Submission Payloads
// =============================================================================

/// Which dialog a transaction is recorded from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    #[default]
    CashReceipt,
    DeliveryOrder,
}

/// Body of a cash receipt submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashReceiptPayload {
    pub invoice_number: String,
    pub receipt_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub amount: Decimal,
    pub currency: Currency,
    pub partial_delivery: bool,
}

impl CashReceiptPayload {
    /// Builds the payload from an evaluated candidate.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::{CashReceiptPayload, Currency, CurrencyRateTable, ReconciliationService};
    ///
    /// let rates = CurrencyRateTable::default();
    /// let tx = ReconciliationService::default()
    ///     .prefill(Decimal::new(500, 0), Currency::Hkd, &rates)
    ///     .unwrap();
    ///
    /// let payload = CashReceiptPayload::from_candidate("INV-7", &tx.candidate()).unwrap();
    /// assert_eq!(payload.receipt_number, "REC-INV-7");
    /// assert!(!payload.partial_delivery);
    /// ```
    pub fn from_candidate(
        invoice_number: &str,
        candidate: &TransactionCandidate,
    ) -> Result<Self, ValidationError> {
        let invoice_number = checked_invoice_number(invoice_number)?;
        let amount = checked_amount("amount", candidate)?;

        Ok(CashReceiptPayload {
            receipt_number: format!("REC-{}", invoice_number),
            invoice_number,
            amount,
            currency: candidate.amount.currency(),
            partial_delivery: candidate.partial,
        })
    }
}

/// Body of a delivery order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOrderPayload {
    pub invoice_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub amount_of_delivery: Decimal,
    pub currency: Currency,
    pub partial_delivery: bool,
    pub delivered_by: String,
}

impl DeliveryOrderPayload {
    /// Builds the payload from an evaluated candidate. `delivered_by` is required.
    pub fn from_candidate(
        invoice_number: &str,
        candidate: &TransactionCandidate,
        delivered_by: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let invoice_number = checked_invoice_number(invoice_number)?;
        let amount_of_delivery = checked_amount("amountOfDelivery", candidate)?;
        let delivered_by = validate_delivered_by(delivered_by)?;

        Ok(DeliveryOrderPayload {
            invoice_number,
            amount_of_delivery,
            currency: candidate.amount.currency(),
            partial_delivery: candidate.partial,
            delivered_by,
        })
    }
}

/// A cash receipt or delivery order that was already recorded, opened for editing.
///
/// Cash receipts carry `amount`; delivery orders carry `amountOfDelivery`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub invoice_number: String,
    #[serde(alias = "amountOfDelivery")]
    #[ts(type = "number | string")]
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub partial_delivery: bool,
    #[serde(default)]
    pub delivered_by: Option<String>,
}

fn checked_invoice_number(invoice_number: &str) -> Result<String, ValidationError> {
    validate_invoice_number(invoice_number)?;
    Ok(invoice_number.trim().to_string())
}

fn checked_amount(field: &str, candidate: &TransactionCandidate) -> Result<Decimal, ValidationError> {
    let amount = candidate.amount.rounded().value();
    if amount <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================
