//! # State Module
//!
//! Manages application state for the form shell.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────┐          ┌──────────────────────────────┐    │
//! │  │     RateState        │ snapshot │        FormSession           │    │
//! │  │                      │ ───────► │                              │    │
//! │  │  Arc<RwLock<         │          │  invoice, amount, currency   │    │
//! │  │    RateCache>>       │          │  partial, feedback, tickets  │    │
//! │  └──────────────────────┘          └──────────────────────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • RateState: shared by every form, replaced wholesale on refresh      │
//! │  • FormSession: owned by one dialog, `&mut self` handlers              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod form;
mod rates;

pub use form::{
    EvaluationAction, EvaluationTicket, FormSession, FormView, PendingEvaluation,
    SubmissionPayload,
};
pub use rates::{RateCache, RateState};
