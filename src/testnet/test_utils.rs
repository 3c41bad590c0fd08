//! Test utilities for ledger testing

use crate::core::{Blockchain, Transaction};
use crate::error::{LedgerError, Result};
use crate::wallet::Wallet;
use tempfile::TempDir;

/// Low enough that sealing a block takes a few hundred hashes.
pub const TEST_DIFFICULTY: u32 = 8;

pub fn create_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(|e| LedgerError::Io(e.to_string()))
}

/// Fresh chain in a temporary directory, with the genesis reward paid to the
/// returned wallet. Keep the `TempDir` alive for as long as the chain.
pub fn create_test_blockchain() -> Result<(Blockchain, TempDir, Wallet)> {
    let temp_dir = create_temp_dir()?;
    let owner = Wallet::new()?;
    let blockchain = Blockchain::create_blockchain_with_path(
        temp_dir.path().join("test_blockchain"),
        &owner.get_pub_key_hash(),
        TEST_DIFFICULTY,
    )?;
    Ok((blockchain, temp_dir, owner))
}

/// Build, sign and seal a transfer in its own block.
pub fn transfer(
    blockchain: &mut Blockchain,
    from: &Wallet,
    to: &Wallet,
    amount: u64,
) -> Result<Transaction> {
    let tx = Transaction::new_utxo_transaction(from, &to.get_pub_key_hash(), amount, blockchain)?;
    blockchain.add_block(&[tx.clone()])?;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{UTXOResolver, SUBSIDY};

    #[test]
    fn test_create_test_blockchain() {
        let (blockchain, _temp_dir, owner) = create_test_blockchain().unwrap();
        assert_eq!(blockchain.block_count().unwrap(), 1);
        assert_eq!(blockchain.get_difficulty(), TEST_DIFFICULTY);
        assert_eq!(
            UTXOResolver::new(&blockchain)
                .balance_for(&owner.get_pub_key_hash())
                .unwrap(),
            SUBSIDY
        );
    }

    #[test]
    fn test_transfer_appends_one_block() {
        let (mut blockchain, _temp_dir, owner) = create_test_blockchain().unwrap();
        let recipient = Wallet::new().unwrap();
        let tx = transfer(&mut blockchain, &owner, &recipient, 10).unwrap();

        let tip = blockchain.iterator().next().unwrap().unwrap();
        assert_eq!(tip.get_transactions(), &[tx]);
        assert_eq!(blockchain.block_count().unwrap(), 2);
    }
}
