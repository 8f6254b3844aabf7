//! # Tally CLI Entry Point
//!
//! ```text
//! tally-cli session.json          replay a session file
//! tally-cli - < session.json      replay from stdin
//! ```
//!
//! Output is JSON lines on stdout; logs go to stderr.

use std::process::ExitCode;

use tally_cli_lib::error::ApiError;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for testability
    match tally_cli_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ApiError::from(err));
            ExitCode::FAILURE
        }
    }
}
