//! # Proof Ledger - A Minimal Proof-of-Work UTXO Ledger
//!
//! A single-node blockchain: value moves between key hashes through signed
//! transactions, every block is sealed with a proof-of-work nonce, and the
//! whole chain is persisted in an embedded sled database.
//!
//! ## What's Here
//! - **Chain Store**: blocks keyed by hash plus a tip record, appended atomically
//! - **Proof-of-Work**: SHA-256 nonce search against a configurable difficulty
//! - **UTXO Model**: outputs locked to key hashes, spent by ECDSA P-256 signatures
//! - **Resolver**: balances and spendable outputs computed by replaying the chain
//! - **UTXO Index**: a persistent index kept in step with every append
//!
//! ## How the Code Is Organized
//! - `core/`: blocks, transactions, sealing, the chain store and the resolver
//! - `storage/`: the persistent unspent-output index
//! - `wallet/`: key pairs, key hashes and base58-check addresses
//! - `config/`: settings from TOML and `LEDGER_*` environment variables
//! - `utils/`: hashing, signing and bincode helpers
//! - `cli/`: argument parsing for the binary
//!
//! ## Where to Start Reading
//! 1. `main.rs` for the commands
//! 2. `core/blockchain.rs` for creation, resumption and appends
//! 3. `core/transaction.rs` for signing and verification
//! 4. `core/utxo_resolver.rs` for how balances are found

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

pub use cli::{Command, Opt};
pub use config::Config;
pub use core::{
    Block, Blockchain, BlockchainIterator, ProofOfWork, ReferencedTransactions, TXInput, TXOutput,
    Transaction, UTXOResolver, DEFAULT_DIFFICULTY, MAX_DIFFICULTY, SUBSIDY,
};
pub use error::{LedgerError, Result};
pub use storage::{IndexedOutput, UTXOSet};
pub use utils::{
    base58_decode, base58_encode, ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify,
    new_key_pair, ripemd160_digest, sha256_digest,
};
pub use wallet::{
    convert_address, hash_pub_key, pub_key_hash_from_address, validate_address, Wallet, Wallets,
    ADDRESS_CHECK_SUM_LEN,
};
