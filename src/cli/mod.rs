//! Command-line interface
//!
//! Argument parsing for the `proof-ledger` binary. Dispatch lives in `main.rs`.

pub mod commands;

pub use commands::{Command, Opt};
