//! Shared fixtures for unit tests: throwaway chains in temporary directories.

pub mod test_utils;

pub use test_utils::*;
