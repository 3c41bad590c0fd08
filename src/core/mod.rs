//! Core ledger functionality
//!
//! Blocks, transactions, the proof-of-work seal, the persistent chain and
//! the replay-based unspent-output resolver.

pub mod block;
pub mod blockchain;
pub mod proof_of_work;
pub mod transaction;
pub mod utxo_resolver;

pub use block::Block;
pub use blockchain::{Blockchain, BlockchainIterator};
pub use proof_of_work::{ProofOfWork, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
pub use transaction::{ReferencedTransactions, TXInput, TXOutput, Transaction, SUBSIDY};
pub use utxo_resolver::UTXOResolver;
