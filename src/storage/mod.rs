//! Persistent indexes derived from the chain
//!
//! The unspent-output index lives next to the blocks in the same sled
//! database and is written in the same transaction as each appended block.

pub mod utxo_set;

pub use utxo_set::{IndexedOutput, UTXOSet};
