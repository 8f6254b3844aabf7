//! # Tally CLI Library
//!
//! Headless shell around the reconciliation forms. Replays a session file
//! (operator events plus rate and invoice data) and prints what the form
//! shows after each event.
//!
//! ## Module Organization
//! ```text
//! tally_cli_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── Environment configuration
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── rates.rs    ◄─── Shared exchange rate cache
//! │   └── form.rs     ◄─── One open cash receipt / delivery order form
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── form.rs     ◄─── Operator events
//! │   └── session.rs  ◄─── Session loading and replay
//! └── error.rs        ◄─── Form and session error types
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::io;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use error::SessionError;

/// Runs one session.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Session Startup                                   │
/// │                                                                         │
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • TALLY_* environment variables over defaults                       │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber on stderr                                      │
/// │     • RUST_LOG wins over TALLY_LOG                                      │
/// │                                                                         │
/// │  3. Load Session ─────────────────────────────────────────────────────► │
/// │     • File path argument, or `-` for stdin                              │
/// │                                                                         │
/// │  4. Replay ───────────────────────────────────────────────────────────► │
/// │     • Fallback rates until the session loads real ones                  │
/// │     • One JSON line per event on stdout                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> Result<(), SessionError> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.log_filter);

    let source = std::env::args().nth(1).ok_or(SessionError::MissingArgument)?;
    info!(%source, "Starting Tally session");

    let script = commands::load_script(&source)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::replay(script, &config, &mut out)?;

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `TALLY_LOG=tally_core=trace` - Used when `RUST_LOG` is unset
/// - Default: INFO level
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
