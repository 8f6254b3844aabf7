//! # Commands Module
//!
//! Everything a session file can ask a form to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── form.rs     ◄─── One operator event against one form
//! └── session.rs  ◄─── Session file loading and replay
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Replay Flow                                  │
//! │                                                                         │
//! │  session.json                                                           │
//! │  ────────────                                                           │
//! │  { "kind": "cashReceipt", "invoices": [...], "events": [               │
//! │      { "type": "invoiceSelected", "invoiceNumber": "INV-001" },         │
//! │      { "type": "currencyChanged", "currency": "MOP" },                  │
//! │      { "type": "submitted" } ] }                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  replay() ──► handle_event() per event ──► FormSession handler          │
//! │         │                                                               │
//! │         │ (one JSON line per event)                                     │
//! │         ▼                                                               │
//! │  stdout: { "index": 0, "type": "invoiceSelected", "view": {...} }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod form;
pub mod session;

pub use form::{handle_event, EventOutcome, FormEvent};
pub use session::{load_script, replay, EventRecord, SessionScript, SessionSummary};
