//! Wallets, key hashes and textual addresses
//!
//! The ledger core only consumes raw key hashes; this module turns key pairs
//! into those hashes and into base58-check addresses for the CLI.

#[allow(clippy::module_inception)]
pub mod wallet;
pub mod wallets;

pub use wallet::{
    convert_address, hash_pub_key, pub_key_hash_from_address, validate_address, Wallet,
    ADDRESS_CHECK_SUM_LEN,
};
pub use wallets::Wallets;
