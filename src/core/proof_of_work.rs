use crate::core::{Block, Transaction};
use crate::error::{LedgerError, Result};
use crate::utils::sha256_digest;
use data_encoding::HEXLOWER;
use log::{debug, error};
use num_bigint::{BigInt, Sign};
use std::ops::ShlAssign;

/// Leading zero bits required of a block hash unless configured otherwise
pub const DEFAULT_DIFFICULTY: u32 = 12;

/// Highest usable difficulty; the target is `1 << (256 - difficulty)`
pub const MAX_DIFFICULTY: u32 = 255;

const MAX_NONCE: i64 = i64::MAX;

pub struct ProofOfWork {
    prev_hash: Vec<u8>,
    transactions_hash: Vec<u8>,
    target: BigInt,
    difficulty: u32,
}

impl ProofOfWork {
    pub fn new_proof_of_work(
        prev_hash: &[u8],
        transactions: &[Transaction],
        difficulty: u32,
    ) -> Result<ProofOfWork> {
        if difficulty == 0 || difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::InvalidBlock(format!(
                "Difficulty {difficulty} outside 1..={MAX_DIFFICULTY}"
            )));
        }
        let mut target = BigInt::from(1);
        target.shl_assign(256 - difficulty);
        Ok(ProofOfWork {
            prev_hash: prev_hash.to_vec(),
            transactions_hash: Block::hash_transactions(transactions)?,
            target,
            difficulty,
        })
    }

    /// Recompute the digest from the block's own nonce. The block passes only
    /// if that digest is below the target and equals the stored hash.
    pub fn validate(block: &Block) -> bool {
        let pow = match ProofOfWork::new_proof_of_work(
            block.get_prev_hash(),
            block.get_transactions(),
            block.get_difficulty(),
        ) {
            Ok(pow) => pow,
            Err(e) => {
                error!("Cannot rebuild proof-of-work for block: {e}");
                return false;
            }
        };
        let hash = sha256_digest(pow.prepare_data(block.get_nonce()).as_slice());
        pow.meets_target(&hash) && hash.as_slice() == block.get_hash()
    }

    fn meets_target(&self, hash: &[u8]) -> bool {
        BigInt::from_bytes_be(Sign::Plus, hash) < self.target
    }

    fn prepare_data(&self, nonce: i64) -> Vec<u8> {
        let mut data_bytes = vec![];
        data_bytes.extend(self.prev_hash.as_slice());
        data_bytes.extend(self.transactions_hash.as_slice());
        data_bytes.extend(nonce.to_be_bytes());
        data_bytes.extend(i64::from(self.difficulty).to_be_bytes());
        data_bytes
    }

    /// Brute-force the first nonce from 0 whose digest is below the target.
    pub fn run(&self) -> (i64, Vec<u8>) {
        let mut nonce = 0;
        let mut hash = Vec::new();
        debug!("Searching nonce at difficulty {}", self.difficulty);
        while nonce < MAX_NONCE {
            hash = sha256_digest(self.prepare_data(nonce).as_slice());
            if self.meets_target(&hash) {
                break;
            }
            nonce += 1;
        }
        debug!(
            "Found nonce {nonce} for hash {}",
            HEXLOWER.encode(hash.as_slice())
        );
        (nonce, hash)
    }
}
