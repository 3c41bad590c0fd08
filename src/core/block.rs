use crate::core::{ProofOfWork, Transaction};
use crate::error::{LedgerError, Result};
use crate::utils::{deserialize, serialize, sha256_digest};
use data_encoding::HEXLOWER;
use log::info;

#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Block {
    prev_hash: Vec<u8>, // empty only for genesis
    hash: Vec<u8>,
    transactions: Vec<Transaction>,
    nonce: i64,
    difficulty: u32,
}

impl Block {
    /// Seal `transactions` on top of `prev_hash`. Blocks until a nonce is found.
    pub fn new_block(prev_hash: &[u8], transactions: &[Transaction], difficulty: u32) -> Result<Block> {
        if transactions.is_empty() {
            return Err(LedgerError::InvalidBlock(
                "Block must contain at least one transaction".to_string(),
            ));
        }

        let pow = ProofOfWork::new_proof_of_work(prev_hash, transactions, difficulty)?;
        let (nonce, hash) = pow.run();
        info!(
            "Sealed block {} (nonce {nonce}, difficulty {difficulty})",
            HEXLOWER.encode(hash.as_slice())
        );

        Ok(Block {
            prev_hash: prev_hash.to_vec(),
            hash,
            transactions: transactions.to_vec(),
            nonce,
            difficulty,
        })
    }

    pub fn generate_genesis_block(coinbase: &Transaction, difficulty: u32) -> Result<Block> {
        Block::new_block(&[], &[coinbase.clone()], difficulty)
    }

    /// SHA-256 over the concatenated serialized transactions, signatures included.
    pub fn hash_transactions(transactions: &[Transaction]) -> Result<Vec<u8>> {
        let mut tx_bytes = vec![];
        for transaction in transactions {
            tx_bytes.extend(transaction.serialize()?);
        }
        Ok(sha256_digest(tx_bytes.as_slice()))
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize::<Block>(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_empty()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_prev_hash(&self) -> &[u8] {
        self.prev_hash.as_slice()
    }

    pub fn get_hash(&self) -> &[u8] {
        self.hash.as_slice()
    }

    pub fn get_nonce(&self) -> i64 {
        self.nonce
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }

    #[cfg(test)]
    pub(crate) fn set_hash(&mut self, hash: Vec<u8>) {
        self.hash = hash;
    }

    #[cfg(test)]
    pub(crate) fn set_nonce(&mut self, nonce: i64) {
        self.nonce = nonce;
    }
}
