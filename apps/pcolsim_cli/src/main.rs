//! `pcolsim` binary entry point.
//!
//! A thin wrapper around [`pcolsim_cli::run_cli`]: all logic lives in the
//! library crate for testability, this file only maps errors to stderr and
//! the exit code.
//!
//! # Exit Codes
//!
//! - `0` — the simulation halted normally (or the requested artifact was
//!   generated)
//! - `1` — usage error, rejected input, or a simulation that did not
//!   complete

fn main() {
    if let Err(e) = pcolsim_cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
