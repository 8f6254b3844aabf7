//! # Session Commands
//!
//! Loads a session file and replays its events against one form, writing
//! one JSON line per event.
//!
//! ## Output Line
//! ```json
//! {
//!   "index": 4,
//!   "type": "amountBlurred",
//!   "accepted": true,
//!   "view": { "amount": "1030.00", "currency": "MOP", "warning": "..." }
//! }
//! ```

use std::fs;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use tally_core::{CurrencyListResponse, InvoiceSnapshot, TransactionKind, TransactionRecord};
use tracing::{info, warn};

use crate::commands::form::{handle_event, FormEvent};
use crate::config::AppConfig;
use crate::error::{ApiError, SessionError};
use crate::state::{FormSession, FormView, RateState, SubmissionPayload};

/// A scripted form session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScript {
    #[serde(default)]
    pub kind: TransactionKind,

    /// Rate source answer available before the form opens, if any.
    #[serde(default)]
    pub rates: Option<CurrencyListResponse>,

    /// Invoices the operator can pick from.
    #[serde(default)]
    pub invoices: Vec<InvoiceSnapshot>,

    /// Recorded transaction to edit. Its invoice is looked up in `invoices`.
    #[serde(default)]
    pub editing: Option<TransactionRecord>,

    #[serde(default)]
    pub events: Vec<FormEvent>,
}

/// One line of replay output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub index: usize,
    #[serde(rename = "type")]
    pub event: &'static str,
    pub accepted: bool,
    pub view: FormView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<SubmissionPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Totals for a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub events: usize,
    pub submissions: usize,
    pub rejected: usize,
}

/// Reads a session from a file path, or from stdin when `source` is `-`.
pub fn load_script(source: &str) -> Result<SessionScript, SessionError> {
    let text = if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| SessionError::Read {
                path: "<stdin>".to_string(),
                source,
            })?;
        text
    } else {
        fs::read_to_string(source).map_err(|err| SessionError::Read {
            path: source.to_string(),
            source: err,
        })?
    };

    Ok(serde_json::from_str(&text)?)
}

/// Replays every event of `script` and writes one JSON line per event.
pub fn replay<W: Write>(
    script: SessionScript,
    config: &AppConfig,
    out: &mut W,
) -> Result<SessionSummary, SessionError> {
    let rates = RateState::new(config.fallback_rates);
    if let Some(response) = &script.rates {
        rates.apply_response(response);
    }

    let mut form = match script.editing {
        Some(record) => {
            let invoice = script
                .invoices
                .iter()
                .find(|invoice| invoice.invoice_number == record.invoice_number)
                .cloned();
            if invoice.is_none() {
                warn!(invoice_number = %record.invoice_number, "Edited record's invoice is not listed");
            }
            FormSession::edit(script.kind, config.service(), rates.clone(), record, invoice)
        }
        None => FormSession::new(script.kind, config.service(), rates.clone()),
    };
    let mut summary = SessionSummary::default();

    info!(
        kind = ?script.kind,
        invoices = script.invoices.len(),
        events = script.events.len(),
        "Replaying session"
    );

    for (index, event) in script.events.into_iter().enumerate() {
        let name = event.name();
        let outcome = handle_event(&mut form, &rates, &script.invoices, event);

        summary.events += 1;
        if outcome.payload.is_some() {
            summary.submissions += 1;
        }
        if let Some(err) = &outcome.error {
            summary.rejected += 1;
            warn!(index, event = name, %err, "Event rejected");
        }

        let record = EventRecord {
            index,
            event: name,
            accepted: outcome.accepted,
            view: form.view(),
            payload: outcome.payload,
            error: outcome.error,
        };
        write_line(out, &record)?;
    }

    out.flush().map_err(SessionError::Output)?;
    info!(?summary, "Session finished");
    Ok(summary)
}

fn write_line<W: Write>(out: &mut W, record: &EventRecord) -> Result<(), SessionError> {
    let line = serde_json::to_string(record).map_err(|e| SessionError::Output(e.into()))?;
    writeln!(out, "{}", line).map_err(SessionError::Output)
}
