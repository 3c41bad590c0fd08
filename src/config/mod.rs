//! Configuration management
//!
//! Settings for the store location, wallet file, sealing difficulty and log
//! level. Loaded from an optional TOML file and `LEDGER_*` environment
//! variables, then handed to whatever needs them.

pub mod settings;

pub use settings::Config;
