//! # pcolsim-cli
//!
//! Command-line harness for the pcolsim simulator: argument parsing,
//! logger setup, the load → validate → simulate flow, and the C rule
//! header generator for the companion embedded simulator.

pub mod cli;
pub mod ruleheader;

pub use cli::run_cli;
