//! Error handling for the ledger
//!
//! Every fallible operation in the crate returns [`Result`], carrying a
//! [`LedgerError`]. Errors from the store, the signer and the serializer are
//! propagated to the direct caller unchanged; nothing in here retries.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A chain already exists at the configured location
    ChainExists(String),
    /// No chain exists at the configured location
    ChainMissing(String),
    /// Invalid configuration file or override
    Config(String),
    /// An input references a transaction that cannot be located
    ReferencedTransactionMissing(String),
    /// Key-value store errors
    Database(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Cryptographic operation errors
    Crypto(String),
    /// Transaction construction or validation errors
    Transaction(String),
    /// Block validation errors
    InvalidBlock(String),
    /// Wallet lookup errors
    Wallet(String),
    /// Invalid address format
    InvalidAddress(String),
    /// Not enough unspent value to cover a transfer
    InsufficientFunds { required: u64, available: u64 },
}

impl LedgerError {
    /// Whether this error comes from creating or resuming a chain at the
    /// wrong location, or from bad settings. These are fatal at the CLI.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LedgerError::ChainExists(_) | LedgerError::ChainMissing(_) | LedgerError::Config(_)
        )
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::ChainExists(path) => {
                write!(f, "Blockchain already exists at {path}")
            }
            LedgerError::ChainMissing(path) => {
                write!(f, "No existing blockchain at {path}. Create one first.")
            }
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::ReferencedTransactionMissing(txid) => {
                write!(f, "Referenced transaction not found: {txid}")
            }
            LedgerError::Database(msg) => write!(f, "Database error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            LedgerError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            LedgerError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            LedgerError::Wallet(msg) => write!(f, "Wallet error: {msg}"),
            LedgerError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            LedgerError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Database(err.to_string())
    }
}

impl From<sled::transaction::TransactionError<LedgerError>> for LedgerError {
    fn from(err: sled::transaction::TransactionError<LedgerError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(inner) => inner,
            sled::transaction::TransactionError::Storage(e) => {
                LedgerError::Database(e.to_string())
            }
        }
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for LedgerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}
