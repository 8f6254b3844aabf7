//! # Form Commands
//!
//! Operator events and how each one reaches a [`FormSession`].
//!
//! ## Event Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Form Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ Invoice  │────►│  Amount  │────►│ Payload  │       │
//! │  │  Form    │     │ Selected │     │ Checked  │     │  Built   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                 invoiceSelected     amountTyped                        │
//! │                 ratesLoaded         amountBlurred                      │
//! │                                     currencyChanged                    │
//! │                                     partialToggled ──► submitted       │
//! │                                     deliveredByChanged                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tally_core::{Currency, CurrencyListResponse, InvoiceSnapshot};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{FormSession, RateState, SubmissionPayload};

/// One operator (or rate source) event.
///
/// ## Serialization
/// ```json
/// { "type": "amountTyped", "value": "1200" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FormEvent {
    /// The rate fetch answered. `null` means it failed.
    RatesLoaded {
        #[serde(default)]
        rates: Option<CurrencyListResponse>,
    },
    /// An invoice was picked from the list, or the selection was cleared.
    InvoiceSelected {
        #[serde(default, rename = "invoiceNumber")]
        invoice_number: Option<String>,
    },
    CurrencyChanged {
        currency: Currency,
    },
    /// The amount field now holds `value`.
    AmountTyped {
        value: String,
    },
    AmountBlurred,
    PartialToggled {
        partial: bool,
    },
    /// The "delivered by" field now holds `value`.
    DeliveredByChanged {
        value: String,
    },
    /// `deliveredBy`, when present, replaces the field before validating.
    Submitted {
        #[serde(default, rename = "deliveredBy")]
        delivered_by: Option<String>,
    },
}

impl FormEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            FormEvent::RatesLoaded { .. } => "ratesLoaded",
            FormEvent::InvoiceSelected { .. } => "invoiceSelected",
            FormEvent::CurrencyChanged { .. } => "currencyChanged",
            FormEvent::AmountTyped { .. } => "amountTyped",
            FormEvent::AmountBlurred => "amountBlurred",
            FormEvent::PartialToggled { .. } => "partialToggled",
            FormEvent::DeliveredByChanged { .. } => "deliveredByChanged",
            FormEvent::Submitted { .. } => "submitted",
        }
    }
}

/// What handling one event produced, besides the new form view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    /// False when the event was ignored (rejected keystroke, failed rate fetch).
    pub accepted: bool,
    pub payload: Option<SubmissionPayload>,
    pub error: Option<ApiError>,
}

impl EventOutcome {
    fn accepted(accepted: bool) -> Self {
        EventOutcome {
            accepted,
            payload: None,
            error: None,
        }
    }

    fn failed(error: ApiError) -> Self {
        EventOutcome {
            accepted: false,
            payload: None,
            error: Some(error),
        }
    }
}

/// Applies one event to a form.
///
/// `invoices` is the list the operator picks from; an unknown invoice
/// number is reported and leaves the form untouched.
pub fn handle_event(
    form: &mut FormSession,
    rates: &RateState,
    invoices: &[InvoiceSnapshot],
    event: FormEvent,
) -> EventOutcome {
    debug!(event = event.name(), "handle_event");

    match event {
        FormEvent::RatesLoaded { rates: response } => {
            let loaded = match response {
                Some(response) => rates.apply_response(&response),
                None => rates.refresh(None),
            };
            EventOutcome::accepted(loaded)
        }
        FormEvent::InvoiceSelected { invoice_number: None } => {
            form.select_invoice(None);
            EventOutcome::accepted(true)
        }
        FormEvent::InvoiceSelected {
            invoice_number: Some(number),
        } => {
            let number = number.trim();
            match invoices.iter().find(|i| i.invoice_number == number) {
                Some(invoice) => {
                    form.select_invoice(Some(invoice.clone()));
                    EventOutcome::accepted(true)
                }
                None => EventOutcome::failed(ApiError::input(format!("Unknown invoice {}", number))),
            }
        }
        FormEvent::CurrencyChanged { currency } => {
            form.change_currency(currency);
            EventOutcome::accepted(true)
        }
        FormEvent::AmountTyped { value } => EventOutcome::accepted(form.type_amount(&value)),
        FormEvent::AmountBlurred => {
            form.blur_amount();
            EventOutcome::accepted(true)
        }
        FormEvent::PartialToggled { partial } => {
            form.toggle_partial(partial);
            EventOutcome::accepted(true)
        }
        FormEvent::DeliveredByChanged { value } => {
            form.enter_delivered_by(&value);
            EventOutcome::accepted(true)
        }
        FormEvent::Submitted { delivered_by } => match form.submit(delivered_by.as_deref()) {
            Ok(payload) => EventOutcome {
                accepted: true,
                payload: Some(payload),
                error: None,
            },
            Err(err) => EventOutcome::failed(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tally_core::{ReconciliationService, TransactionKind};

    fn invoices() -> Vec<InvoiceSnapshot> {
        serde_json::from_str(
            r#"[{"invoiceNumber":"INV-001","amount":1000,"currency":"HKD","remainingAmount":1000}]"#,
        )
        .unwrap()
    }

    fn form(rates: &RateState) -> FormSession {
        FormSession::new(
            TransactionKind::CashReceipt,
            ReconciliationService::default(),
            rates.clone(),
        )
    }

    #[test]
    fn test_event_deserialization() {
        let event: FormEvent =
            serde_json::from_str(r#"{"type":"invoiceSelected","invoiceNumber":"INV-001"}"#).unwrap();
        assert_eq!(
            event,
            FormEvent::InvoiceSelected {
                invoice_number: Some("INV-001".to_string())
            }
        );

        let event: FormEvent = serde_json::from_str(r#"{"type":"amountBlurred"}"#).unwrap();
        assert_eq!(event.name(), "amountBlurred");

        let event: FormEvent = serde_json::from_str(r#"{"type":"ratesLoaded","rates":null}"#).unwrap();
        assert_eq!(event, FormEvent::RatesLoaded { rates: None });

        let event: FormEvent =
            serde_json::from_str(r#"{"type":"deliveredByChanged","value":"Ah Wong"}"#).unwrap();
        assert_eq!(event.name(), "deliveredByChanged");
    }

    #[test]
    fn test_unknown_invoice_is_reported() {
        let rates = RateState::default();
        let mut form = form(&rates);

        let outcome = handle_event(
            &mut form,
            &rates,
            &invoices(),
            FormEvent::InvoiceSelected {
                invoice_number: Some("INV-404".to_string()),
            },
        );

        assert!(!outcome.accepted);
        assert_eq!(outcome.error.map(|e| e.code), Some(ErrorCode::InputError));
        assert!(form.view().invoice_number.is_none());
    }

    #[test]
    fn test_failed_rate_fetch_is_not_accepted() {
        let rates = RateState::default();
        let mut form = form(&rates);

        let outcome = handle_event(&mut form, &rates, &[], FormEvent::RatesLoaded { rates: None });
        assert!(!outcome.accepted);
        assert!(!rates.snapshot().is_authoritative());
    }

    #[test]
    fn test_rejected_keystroke_is_not_accepted() {
        let rates = RateState::default();
        let mut form = form(&rates);
        handle_event(
            &mut form,
            &rates,
            &invoices(),
            FormEvent::InvoiceSelected {
                invoice_number: Some("INV-001".to_string()),
            },
        );

        let outcome = handle_event(
            &mut form,
            &rates,
            &invoices(),
            FormEvent::AmountTyped {
                value: "1e3".to_string(),
            },
        );
        assert!(!outcome.accepted);
        assert_eq!(form.amount(), "1000.00");
    }

    #[test]
    fn test_submitted_returns_payload() {
        let rates = RateState::default();
        let mut form = form(&rates);
        handle_event(
            &mut form,
            &rates,
            &invoices(),
            FormEvent::InvoiceSelected {
                invoice_number: Some("INV-001".to_string()),
            },
        );

        let outcome = handle_event(&mut form, &rates, &[], FormEvent::Submitted { delivered_by: None });
        assert!(outcome.accepted);
        assert!(matches!(outcome.payload, Some(SubmissionPayload::CashReceipt(_))));
    }
}
