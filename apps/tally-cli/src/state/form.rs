//! # Form Session
//!
//! State of one open cash receipt or delivery order dialog.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Form Session Operations                              │
//! │                                                                         │
//! │  Operator Action          Handler                 Evaluation            │
//! │  ───────────────          ───────                 ──────────            │
//! │                                                                         │
//! │  Pick invoice ──────────► select_invoice() ─────► prefill / Blur        │
//! │                                                                         │
//! │  Type a digit ──────────► type_amount() ────────► Typing (preview only) │
//! │                                                                         │
//! │  Leave the field ───────► blur_amount() ────────► Blur (rewrites field) │
//! │                                                                         │
//! │  Pick currency ─────────► change_currency() ────► switch_currency       │
//! │                                                                         │
//! │  Tick "partial" ────────► toggle_partial() ─────► (none)                │
//! │                                                                         │
//! │  Type "delivered by" ───► enter_delivered_by() ─► (none)                │
//! │                                                                         │
//! │  Press submit ──────────► submit() ─────────────► Submit → payload      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Editing
//! [`FormSession::edit`] opens the dialog on a recorded transaction. The
//! stored amount, currency and partial flag are loaded as-is, a currency
//! switch never prefills, and submit produces an update for the record id.
//!
//! ## Last Write Wins
//! Every evaluation is issued an [`EvaluationTicket`]. Only the result of the
//! most recently issued ticket is applied; anything older is dropped. The
//! handlers here run evaluations inline, but callers that evaluate off the
//! event loop use [`FormSession::begin`] and [`FormSession::complete`].

use serde::Serialize;
use tally_core::money::{format_amount, is_amount_keystroke};
use tally_core::validation::validate_delivered_by;
use tally_core::{
    CashReceiptPayload, Currency, CurrencyRateTable, DeliveryOrderPayload, Evaluation, EvaluationMode,
    EvaluationRequest, InvoiceSnapshot, NormalizedTransaction, PaymentStatus, Precondition,
    RateOrigin, ReconcileError, ReconcileResult, ReconcileWarning, ReconciliationService,
    TransactionKind, TransactionRecord,
};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::RateState;

// =============================================================================
// Tickets
// =============================================================================

/// Identifies one evaluation request; higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EvaluationTicket(u64);

impl EvaluationTicket {
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What an evaluation was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationAction {
    Evaluate(EvaluationMode),
    SwitchCurrency(Currency),
}

/// An evaluation that has been issued but not yet applied.
///
/// Carries its own request and rate snapshot, so running it later gives the
/// same answer it would have given when it was issued.
#[derive(Debug, Clone)]
pub struct PendingEvaluation {
    ticket: EvaluationTicket,
    action: EvaluationAction,
    request: EvaluationRequest,
    rates: CurrencyRateTable,
}

impl PendingEvaluation {
    #[inline]
    pub fn ticket(&self) -> EvaluationTicket {
        self.ticket
    }

    /// Runs the evaluation. Pure; safe to call from any thread.
    pub fn run(&self, service: &ReconciliationService) -> ReconcileResult<Evaluation> {
        match self.action {
            EvaluationAction::Evaluate(mode) => service.evaluate(&self.request, &self.rates, mode),
            EvaluationAction::SwitchCurrency(currency) => {
                service.switch_currency(&self.request, currency, &self.rates)
            }
        }
    }
}

// =============================================================================
// Submission & View
// =============================================================================

/// What a submit produces, ready for the submission sink.
///
/// ```json
/// { "kind": "updateDeliveryOrder", "id": "o7", "data": { "amountOfDelivery": 150.0, ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SubmissionPayload {
    CashReceipt(CashReceiptPayload),
    DeliveryOrder(DeliveryOrderPayload),
    UpdateCashReceipt { id: String, data: CashReceiptPayload },
    UpdateDeliveryOrder { id: String, data: DeliveryOrderPayload },
}

/// Serializable snapshot of everything the dialog shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub kind: TransactionKind,
    /// Id of the record being edited, `None` when creating.
    pub record_id: Option<String>,
    pub invoice_number: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub amount: String,
    pub currency: Currency,
    pub partial: bool,
    pub delivered_by: String,
    /// "Remaining: 1030.00 MOP (1000.00 HKD)"
    pub remaining_hint: Option<String>,
    /// HKD value of what is being typed, e.g. "107.53".
    pub amount_hkd: Option<String>,
    pub warning: Option<String>,
    pub error: Option<ApiError>,
    pub precondition: Option<Precondition>,
    pub rate_origin: RateOrigin,
    pub can_submit: bool,
}

// =============================================================================
// Form Session
// =============================================================================

/// One open cash receipt or delivery order dialog.
#[derive(Debug)]
pub struct FormSession {
    kind: TransactionKind,
    service: ReconciliationService,
    rates: RateState,
    record_id: Option<String>,

    invoice: Option<InvoiceSnapshot>,
    amount: String,
    currency: Currency,
    partial: bool,
    partial_override: bool,
    delivered_by: String,

    preview: Option<NormalizedTransaction>,
    warning: Option<ReconcileWarning>,
    error: Option<ApiError>,
    precondition: Option<Precondition>,

    issued: u64,
}

impl FormSession {
    /// Opens an empty dialog. Currency starts at HKD.
    pub fn new(kind: TransactionKind, service: ReconciliationService, rates: RateState) -> Self {
        FormSession {
            kind,
            service,
            rates,
            record_id: None,
            invoice: None,
            amount: String::new(),
            currency: Currency::Hkd,
            partial: false,
            partial_override: false,
            delivered_by: String::new(),
            preview: None,
            warning: None,
            error: None,
            precondition: Some(Precondition::NoInvoiceSelected),
            issued: 0,
        }
    }

    /// Opens the dialog on a recorded transaction.
    ///
    /// `invoice` is the record's invoice as currently listed; when given, the
    /// stored amount is checked against its balance right away.
    pub fn edit(
        kind: TransactionKind,
        service: ReconciliationService,
        rates: RateState,
        record: TransactionRecord,
        invoice: Option<InvoiceSnapshot>,
    ) -> Self {
        info!(
            record_id = %record.id,
            invoice_number = %record.invoice_number,
            "Editing recorded transaction"
        );

        let mut form = FormSession::new(kind, service, rates);
        form.amount = format_amount(record.amount);
        form.currency = record.currency;
        form.partial = record.partial_delivery;
        form.delivered_by = record.delivered_by.unwrap_or_default();
        form.record_id = Some(record.id);

        if invoice.is_some() {
            form.select_invoice(invoice);
        }
        form
    }

    #[inline]
    pub fn is_editing(&self) -> bool {
        self.record_id.is_some()
    }

    #[inline]
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    #[inline]
    pub fn amount(&self) -> &str {
        &self.amount
    }

    #[inline]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    #[inline]
    pub fn partial(&self) -> bool {
        self.partial
    }

    #[inline]
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    #[inline]
    pub fn warning(&self) -> Option<&ReconcileWarning> {
        self.warning.as_ref()
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    /// Picks (or clears) the invoice the transaction is recorded against.
    ///
    /// An empty amount field is filled with the full remaining balance; an
    /// existing amount is re-checked against the new balance. When editing,
    /// nothing is prefilled and the recorded partial flag is kept unless the
    /// amount had to be lowered.
    pub fn select_invoice(&mut self, invoice: Option<InvoiceSnapshot>) {
        info!(
            invoice_number = invoice.as_ref().map(|i| i.invoice_number.as_str()),
            "Invoice selected"
        );
        self.invoice = invoice;
        self.reset_feedback();

        let action = if self.amount.trim().is_empty() && !self.is_editing() {
            EvaluationAction::SwitchCurrency(self.currency)
        } else {
            EvaluationAction::Evaluate(EvaluationMode::Blur)
        };

        let partial = self.partial;
        self.run(action);

        if self.is_editing() && self.preview.is_some() && self.warning.is_none() {
            self.partial = partial;
            self.partial_override = true;
        }
    }

    /// Applies a keystroke. Returns `false` when the text is rejected by the
    /// keystroke filter, in which case nothing changes.
    pub fn type_amount(&mut self, text: &str) -> bool {
        if !is_amount_keystroke(text) {
            debug!(text, "Keystroke rejected");
            return false;
        }

        self.amount = text.to_string();
        self.run(EvaluationAction::Evaluate(EvaluationMode::Typing));
        true
    }

    /// The amount field lost focus.
    pub fn blur_amount(&mut self) {
        self.run(EvaluationAction::Evaluate(EvaluationMode::Blur));
    }

    /// The operator picked another currency.
    pub fn change_currency(&mut self, currency: Currency) {
        if currency == self.currency {
            return;
        }

        if self.is_editing() && self.amount.trim().is_empty() {
            self.currency = currency;
            self.run(EvaluationAction::Evaluate(EvaluationMode::Blur));
            return;
        }
        self.run(EvaluationAction::SwitchCurrency(currency));
    }

    /// The operator ticked or cleared the partial checkbox.
    pub fn toggle_partial(&mut self, partial: bool) {
        debug!(partial, "Partial flag overridden");
        self.partial = partial;
        self.partial_override = true;
    }

    /// The "delivered by" field changed.
    pub fn enter_delivered_by(&mut self, name: &str) {
        self.delivered_by = name.to_string();
    }

    /// Validates the form and builds the submission payload.
    ///
    /// A partial flag ticked by the operator since the last blur is kept
    /// unless the amount had to be corrected. Delivery orders need a
    /// "delivered by" name, either entered earlier or passed here.
    pub fn submit(&mut self, delivered_by: Option<&str>) -> Result<SubmissionPayload, ApiError> {
        if let Some(name) = delivered_by {
            self.enter_delivered_by(name);
        }

        let pending = self.begin(EvaluationAction::Evaluate(EvaluationMode::Submit));
        let result = pending.run(&self.service);
        self.complete(&pending, result.clone());

        let outcome = self.payload_from(result);
        match &outcome {
            Ok(payload) => info!(?payload, "Submission prepared"),
            Err(err) => {
                warn!(code = ?err.code, message = %err.message, "Submission blocked");
                self.error = Some(err.clone());
            }
        }
        outcome
    }

    /// Current dialog contents.
    pub fn view(&self) -> FormView {
        let rates = self.rates.snapshot();

        FormView {
            kind: self.kind,
            record_id: self.record_id.clone(),
            invoice_number: self.invoice.as_ref().map(|i| i.invoice_number.clone()),
            payment_status: self.invoice.as_ref().map(InvoiceSnapshot::payment_status),
            amount: self.amount.clone(),
            currency: self.currency,
            partial: self.partial,
            delivered_by: self.delivered_by.clone(),
            remaining_hint: self.remaining_hint(),
            amount_hkd: self.preview.as_ref().map(|tx| format_amount(tx.amount_hkd)),
            warning: self.warning.map(|w| w.to_string()),
            error: self.error.clone(),
            precondition: self.precondition,
            rate_origin: rates.origin(),
            can_submit: self.can_submit(),
        }
    }

    // -------------------------------------------------------------------------
    // Tickets
    // -------------------------------------------------------------------------

    /// Issues a ticket and captures the request and rates it will run against.
    pub fn begin(&mut self, action: EvaluationAction) -> PendingEvaluation {
        self.issued += 1;
        PendingEvaluation {
            ticket: EvaluationTicket(self.issued),
            action,
            request: self.request(),
            rates: self.rates.snapshot(),
        }
    }

    /// Applies a finished evaluation. Returns `false` (and changes nothing)
    /// when a newer evaluation has been issued since.
    pub fn complete(
        &mut self,
        pending: &PendingEvaluation,
        result: ReconcileResult<Evaluation>,
    ) -> bool {
        if pending.ticket.id() != self.issued {
            debug!(
                ticket = pending.ticket.id(),
                latest = self.issued,
                "Stale evaluation discarded"
            );
            return false;
        }

        if let EvaluationAction::SwitchCurrency(currency) = pending.action {
            self.currency = currency;
        }
        let mode = match pending.action {
            EvaluationAction::Evaluate(mode) => mode,
            EvaluationAction::SwitchCurrency(_) => EvaluationMode::Blur,
        };

        self.apply(mode, result);
        debug!(ticket = pending.ticket.id(), ?mode, "Evaluation applied");
        true
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn run(&mut self, action: EvaluationAction) {
        let pending = self.begin(action);
        let result = pending.run(&self.service);
        self.complete(&pending, result);
    }

    fn request(&self) -> EvaluationRequest {
        EvaluationRequest::new(
            self.amount.as_str(),
            self.currency,
            self.invoice.as_ref().map(|i| i.remaining_amount),
        )
    }

    fn reset_feedback(&mut self) {
        self.preview = None;
        self.warning = None;
        self.error = None;
        self.precondition = None;
    }

    fn apply(&mut self, mode: EvaluationMode, result: ReconcileResult<Evaluation>) {
        self.reset_feedback();

        match result {
            Ok(Evaluation::Normalized(tx)) => {
                if mode != EvaluationMode::Typing {
                    self.amount = tx.normalized_amount.clone();
                    let keep_override = mode == EvaluationMode::Submit
                        && self.partial_override
                        && tx.warning.is_none();
                    if !keep_override {
                        self.partial = tx.partial;
                        self.partial_override = false;
                    }
                }
                if let Some(warning) = tx.warning {
                    warn!(invoice_number = self.invoice_number(), %warning, "Amount clamped");
                }
                self.warning = tx.warning;
                self.preview = Some(tx);
            }
            Ok(Evaluation::Cleared) => {
                if mode == EvaluationMode::Blur {
                    self.amount.clear();
                }
            }
            Ok(Evaluation::Declined(precondition)) => {
                self.precondition = Some(precondition);
            }
            Err(err) => {
                if mode == EvaluationMode::Blur && matches!(err, ReconcileError::InvalidAmount { .. }) {
                    self.amount.clear();
                }
                self.error = Some(err.into());
            }
        }
    }

    fn payload_from(&self, result: ReconcileResult<Evaluation>) -> Result<SubmissionPayload, ApiError> {
        let tx = match result? {
            Evaluation::Normalized(tx) => tx,
            Evaluation::Declined(precondition) => return Err(precondition.into()),
            Evaluation::Cleared => {
                return Err(ReconcileError::invalid_amount(&self.amount, "amount is required").into())
            }
        };

        let invoice_number = self.invoice_number().unwrap_or_default();
        let mut candidate = tx.candidate();
        candidate.partial = self.partial;

        let delivered_by = Some(self.delivered_by.as_str());

        let payload = match (self.kind, self.record_id.clone()) {
            (TransactionKind::CashReceipt, None) => {
                SubmissionPayload::CashReceipt(CashReceiptPayload::from_candidate(invoice_number, &candidate)?)
            }
            (TransactionKind::CashReceipt, Some(id)) => SubmissionPayload::UpdateCashReceipt {
                id,
                data: CashReceiptPayload::from_candidate(invoice_number, &candidate)?,
            },
            (TransactionKind::DeliveryOrder, None) => SubmissionPayload::DeliveryOrder(
                DeliveryOrderPayload::from_candidate(invoice_number, &candidate, delivered_by)?,
            ),
            (TransactionKind::DeliveryOrder, Some(id)) => SubmissionPayload::UpdateDeliveryOrder {
                id,
                data: DeliveryOrderPayload::from_candidate(invoice_number, &candidate, delivered_by)?,
            },
        };
        Ok(payload)
    }

    fn invoice_number(&self) -> Option<&str> {
        self.invoice.as_ref().map(|i| i.invoice_number.as_str())
    }

    fn remaining_hint(&self) -> Option<String> {
        let invoice = self.invoice.as_ref()?;
        let remaining = invoice.remaining_hkd();
        if remaining <= rust_decimal::Decimal::ZERO {
            return None;
        }

        let rates = self.rates.snapshot();
        let maximum = self.service.max_allowed(remaining, self.currency, &rates);

        Some(if self.currency.is_canonical() {
            format!("{} HKD", format_amount(remaining))
        } else {
            format!(
                "{} {} ({} HKD)",
                format_amount(maximum),
                self.currency,
                format_amount(remaining)
            )
        })
    }

    fn can_submit(&self) -> bool {
        if self.kind == TransactionKind::DeliveryOrder
            && validate_delivered_by(Some(&self.delivered_by)).is_err()
        {
            return false;
        }

        let rates = self.rates.snapshot();
        matches!(
            self.service
                .evaluate(&self.request(), &rates, EvaluationMode::Submit),
            Ok(Evaluation::Normalized(_))
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;
    use tally_core::RatePayload;

    fn loaded_rates() -> RateState {
        let rates = RateState::default();
        rates.refresh(Some(RatePayload::new(dec!(1.03), dec!(0.93))));
        rates
    }

    fn invoice(remaining: &str) -> InvoiceSnapshot {
        serde_json::from_str(&format!(
            r#"{{"invoiceNumber":"INV-001","amount":1000,"currency":"HKD","remainingAmount":"{remaining}"}}"#
        ))
        .unwrap()
    }

    fn session(kind: TransactionKind, rates: RateState) -> FormSession {
        FormSession::new(kind, ReconciliationService::default(), rates)
    }

    #[test]
    fn test_new_session_waits_for_invoice() {
        let form = session(TransactionKind::CashReceipt, loaded_rates());
        let view = form.view();

        assert_eq!(view.precondition, Some(Precondition::NoInvoiceSelected));
        assert!(!view.can_submit);
        assert!(view.remaining_hint.is_none());
    }

    #[test]
    fn test_select_invoice_prefills_remaining() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("1000.00")));

        let view = form.view();
        assert_eq!(view.amount, "1000.00");
        assert!(!view.partial);
        assert_eq!(view.remaining_hint.as_deref(), Some("1000.00 HKD"));
        assert!(view.can_submit);
    }

    #[test]
    fn test_select_settled_invoice_blocks() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("0")));

        let view = form.view();
        assert_eq!(view.error.map(|e| e.code), Some(ErrorCode::InvoiceSettled));
        assert_eq!(view.payment_status, Some(PaymentStatus::Complete));
        assert!(!view.can_submit);
    }

    #[test]
    fn test_keystroke_filter() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("500")));

        assert!(form.type_amount("12."));
        assert!(!form.type_amount("12.3.4"));
        assert!(!form.type_amount("-1"));
        assert_eq!(form.amount(), "12.");
    }

    #[test]
    fn test_typing_previews_without_rewriting() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("500")));

        form.type_amount("200.5");
        let view = form.view();
        assert_eq!(view.amount, "200.5");
        assert_eq!(view.amount_hkd.as_deref(), Some("200.50"));

        form.blur_amount();
        assert_eq!(form.amount(), "200.50");
        assert!(form.partial());
    }

    #[test]
    fn test_blur_clamps_with_warning() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("1000.00")));
        form.change_currency(Currency::Mop);
        form.type_amount("1200");
        form.blur_amount();

        let view = form.view();
        assert_eq!(view.amount, "1030.00");
        assert_eq!(view.currency, Currency::Mop);
        assert!(!view.partial);
        assert_eq!(
            view.warning.as_deref(),
            Some("Amount exceeds the remaining balance, adjusted to 1030.00 MOP (1000.00 HKD)")
        );
        assert_eq!(view.remaining_hint.as_deref(), Some("1030.00 MOP (1000.00 HKD)"));
    }

    #[test]
    fn test_change_currency_converts_amount() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("500")));
        form.type_amount("200");
        form.blur_amount();

        form.change_currency(Currency::Mop);
        assert_eq!(form.amount(), "206.00");
        assert_eq!(form.currency(), Currency::Mop);
        assert!(form.partial());
    }

    #[test]
    fn test_blur_clears_invalid_amount() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("500")));
        form.type_amount(".");
        form.blur_amount();

        assert_eq!(form.amount(), "");
        assert_eq!(form.error().map(|e| e.code), Some(ErrorCode::InvalidAmount));
    }

    #[test]
    fn test_submit_keeps_partial_override() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("500")));
        form.toggle_partial(true);

        let payload = form.submit(None).unwrap();
        let SubmissionPayload::CashReceipt(receipt) = payload else {
            panic!("expected a cash receipt");
        };
        assert_eq!(receipt.amount, dec!(500.00));
        assert!(receipt.partial_delivery);
        assert_eq!(receipt.receipt_number, "REC-INV-001");
    }

    #[test]
    fn test_submit_on_fallback_rates_declines_mop() {
        let mut form = session(TransactionKind::CashReceipt, RateState::default());
        form.select_invoice(Some(invoice("1000")));
        form.change_currency(Currency::Mop);

        assert_eq!(form.amount(), "1030.00");
        assert!(!form.view().can_submit);

        let err = form.submit(None).unwrap_err();
        assert_eq!(err.code, ErrorCode::RatesUnavailable);
        assert_eq!(form.view().precondition, Some(Precondition::NoRateLoaded));
    }

    #[test]
    fn test_delivery_order_requires_delivered_by() {
        let mut form = session(TransactionKind::DeliveryOrder, loaded_rates());
        form.select_invoice(Some(invoice("500")));
        form.type_amount("100");

        let err = form.submit(Some("  ")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "deliveredBy is required");

        let payload = form.submit(Some("Ah Wong")).unwrap();
        let SubmissionPayload::DeliveryOrder(order) = payload else {
            panic!("expected a delivery order");
        };
        assert_eq!(order.amount_of_delivery, dec!(100.00));
        assert!(order.partial_delivery);
        assert_eq!(order.delivered_by, "Ah Wong");
    }

    #[test]
    fn test_delivery_order_waits_for_delivered_by() {
        let mut form = session(TransactionKind::DeliveryOrder, loaded_rates());
        form.select_invoice(Some(invoice("500")));
        form.type_amount("100");
        form.blur_amount();
        assert!(!form.view().can_submit);

        form.enter_delivered_by("Ah Wong");
        let view = form.view();
        assert_eq!(view.delivered_by, "Ah Wong");
        assert!(view.can_submit);

        let SubmissionPayload::DeliveryOrder(order) = form.submit(None).unwrap() else {
            panic!("expected a delivery order");
        };
        assert_eq!(order.delivered_by, "Ah Wong");
    }

    #[test]
    fn test_submit_rejects_zero() {
        let mut form = session(TransactionKind::DeliveryOrder, loaded_rates());
        form.select_invoice(Some(invoice("500")));
        form.type_amount("0");

        let err = form.submit(Some("Ah Wong")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAmount);
    }

    #[test]
    fn test_stale_evaluation_is_discarded() {
        let mut form = session(TransactionKind::CashReceipt, loaded_rates());
        form.select_invoice(Some(invoice("500")));

        form.type_amount("100");
        let older = form.begin(EvaluationAction::Evaluate(EvaluationMode::Blur));
        form.type_amount("200");
        let newer = form.begin(EvaluationAction::Evaluate(EvaluationMode::Blur));
        assert!(newer.ticket() > older.ticket());

        let service = ReconciliationService::default();
        assert!(form.complete(&newer, newer.run(&service)));
        assert!(!form.complete(&older, older.run(&service)));
        assert_eq!(form.amount(), "200.00");
    }

    #[test]
    fn test_rates_loaded_mid_session_are_used() {
        let rates = RateState::default();
        let mut form = session(TransactionKind::CashReceipt, rates.clone());
        form.select_invoice(Some(invoice("1000")));
        form.change_currency(Currency::Cny);
        assert_eq!(form.view().rate_origin, RateOrigin::Fallback);

        rates.refresh(Some(RatePayload::new(dec!(1.03), dec!(0.90))));
        form.type_amount("900");
        form.blur_amount();

        let view = form.view();
        assert_eq!(view.rate_origin, RateOrigin::Backend);
        assert_eq!(view.amount, "900.00");
        assert!(!view.partial);
        assert!(view.can_submit);
    }

    // ===== Editing =====

    fn record(json: &str) -> TransactionRecord {
        serde_json::from_str(json).unwrap()
    }

    fn edit(kind: TransactionKind, json: &str, remaining: &str) -> FormSession {
        FormSession::edit(
            kind,
            ReconciliationService::default(),
            loaded_rates(),
            record(json),
            Some(invoice(remaining)),
        )
    }

    #[test]
    fn test_edit_seeds_recorded_values() {
        let form = edit(
            TransactionKind::CashReceipt,
            r#"{"_id":"c1","invoiceNumber":"INV-001","amount":"206.00","currency":"MOP","partialDelivery":false}"#,
            "1000",
        );
        assert!(form.is_editing());

        let view = form.view();
        assert_eq!(view.record_id.as_deref(), Some("c1"));
        assert_eq!(view.amount, "206.00");
        assert_eq!(view.currency, Currency::Mop);
        assert_eq!(view.amount_hkd.as_deref(), Some("200.00"));
        assert!(!view.partial);
        assert!(view.can_submit);
    }

    #[test]
    fn test_edit_recomputes_partial_when_amount_lowered() {
        let form = edit(
            TransactionKind::CashReceipt,
            r#"{"_id":"c1","invoiceNumber":"INV-001","amount":1200,"partialDelivery":true}"#,
            "1000",
        );

        let view = form.view();
        assert_eq!(view.amount, "1000.00");
        assert!(view.warning.is_some());
        assert!(!view.partial);
    }

    #[test]
    fn test_edit_currency_switch_does_not_prefill() {
        let mut form = edit(
            TransactionKind::CashReceipt,
            r#"{"_id":"c1","invoiceNumber":"INV-001","amount":300}"#,
            "1000",
        );
        assert!(form.type_amount(""));
        form.change_currency(Currency::Cny);

        let view = form.view();
        assert_eq!(view.currency, Currency::Cny);
        assert_eq!(view.amount, "");
        assert!(view.error.is_none());
        assert!(!view.can_submit);

        let mut fresh = session(TransactionKind::CashReceipt, loaded_rates());
        fresh.select_invoice(Some(invoice("1000")));
        assert!(fresh.type_amount(""));
        fresh.change_currency(Currency::Cny);
        assert_eq!(fresh.amount(), "930.00");
    }

    #[test]
    fn test_edit_submits_update_for_record() {
        let mut form = edit(
            TransactionKind::CashReceipt,
            r#"{"_id":"c1","invoiceNumber":"INV-001","amount":"206.00","currency":"MOP","partialDelivery":false}"#,
            "1000",
        );

        let payload = form.submit(None).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "updateCashReceipt");
        assert_eq!(json["id"], "c1");
        assert_eq!(json["data"]["receiptNumber"], "REC-INV-001");

        let SubmissionPayload::UpdateCashReceipt { id, data } = payload else {
            panic!("expected a receipt update");
        };
        assert_eq!(id, "c1");
        assert_eq!(data.amount, dec!(206.00));
        assert_eq!(data.currency, Currency::Mop);
        assert!(!data.partial_delivery);
    }

    #[test]
    fn test_edit_delivery_order_keeps_delivered_by() {
        let mut form = edit(
            TransactionKind::DeliveryOrder,
            r#"{"id":"o7","invoiceNumber":"INV-001","amountOfDelivery":150,"partialDelivery":true,"deliveredBy":"Ah Wong"}"#,
            "500",
        );
        assert!(form.view().can_submit);

        let SubmissionPayload::UpdateDeliveryOrder { id, data } = form.submit(None).unwrap() else {
            panic!("expected a delivery order update");
        };
        assert_eq!(id, "o7");
        assert_eq!(data.amount_of_delivery, dec!(150.00));
        assert!(data.partial_delivery);
        assert_eq!(data.delivered_by, "Ah Wong");
    }
}
