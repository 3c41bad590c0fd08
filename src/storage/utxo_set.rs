use crate::core::{Block, Blockchain, TXOutput, UTXOResolver};
use crate::error::{LedgerError, Result};
use crate::utils::{deserialize, serialize};
use data_encoding::HEXLOWER;
use log::info;
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionalTree};
use sled::Batch;
use std::collections::HashMap;

pub const UTXO_TREE: &str = "chainstate";

/// An unspent output together with its position in the transaction.
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct IndexedOutput {
    vout: usize,
    output: TXOutput,
}

impl IndexedOutput {
    pub fn get_vout(&self) -> usize {
        self.vout
    }

    pub fn get_output(&self) -> &TXOutput {
        &self.output
    }
}

/// Index of unspent outputs, ( K -> txid, V -> Vec<IndexedOutput> ).
/// Kept current by the blockchain on every append; `reindex` rebuilds it
/// from a full replay.
pub struct UTXOSet<'a> {
    blockchain: &'a Blockchain,
}

impl<'a> UTXOSet<'a> {
    pub fn new(blockchain: &'a Blockchain) -> UTXOSet<'a> {
        UTXOSet { blockchain }
    }

    fn entries(&self) -> impl Iterator<Item = Result<(Vec<u8>, Vec<IndexedOutput>)>> + '_ {
        self.blockchain.chainstate().iter().map(|item| {
            let (k, v) = item
                .map_err(|e| LedgerError::Database(format!("Failed to iterate UTXO tree: {e}")))?;
            Ok((k.to_vec(), deserialize(v.as_ref())?))
        })
    }

    pub fn find_spendable_outputs(
        &self,
        pub_key_hash: &[u8],
        amount: u64,
    ) -> Result<(u64, HashMap<String, Vec<usize>>)> {
        let mut unspent_outputs: HashMap<String, Vec<usize>> = HashMap::new();
        let mut accumulated = 0u64;

        for entry in self.entries() {
            if accumulated >= amount {
                break;
            }
            let (txid, outs) = entry?;
            for out in outs {
                if out.output.is_locked_with_key(pub_key_hash) && accumulated < amount {
                    accumulated += out.output.get_value();
                    unspent_outputs
                        .entry(HEXLOWER.encode(&txid))
                        .or_default()
                        .push(out.vout);
                }
            }
        }
        Ok((accumulated, unspent_outputs))
    }

    pub fn find_utxo(&self, pub_key_hash: &[u8]) -> Result<Vec<TXOutput>> {
        let mut utxos = vec![];
        for entry in self.entries() {
            let (_, outs) = entry?;
            utxos.extend(
                outs.into_iter()
                    .filter(|out| out.output.is_locked_with_key(pub_key_hash))
                    .map(|out| out.output),
            );
        }
        Ok(utxos)
    }

    pub fn balance(&self, pub_key_hash: &[u8]) -> Result<u64> {
        Ok(self
            .find_utxo(pub_key_hash)?
            .iter()
            .map(TXOutput::get_value)
            .sum())
    }

    pub fn is_unspent(&self, txid: &[u8], vout: usize) -> Result<bool> {
        match self.blockchain.chainstate().get(txid)? {
            Some(bytes) => {
                let outs: Vec<IndexedOutput> = deserialize(bytes.as_ref())?;
                Ok(outs.iter().any(|out| out.vout == vout))
            }
            None => Ok(false),
        }
    }

    pub fn count_transactions(&self) -> Result<u64> {
        let mut counter = 0;
        for entry in self.blockchain.chainstate().iter() {
            entry.map_err(|e| LedgerError::Database(format!("Failed to iterate UTXO tree: {e}")))?;
            counter += 1;
        }
        Ok(counter)
    }

    /// Replace the whole index with a fresh replay of the chain, atomically.
    pub fn reindex(&self) -> Result<()> {
        let utxo_tree = self.blockchain.chainstate();
        let mut batch = Batch::default();

        for key in utxo_tree.iter().keys() {
            batch.remove(key?);
        }

        let utxo_map = UTXOResolver::new(self.blockchain).all_unspent()?;
        for (txid, outs) in &utxo_map {
            let indexed: Vec<IndexedOutput> = outs
                .iter()
                .map(|(vout, output)| IndexedOutput {
                    vout: *vout,
                    output: output.clone(),
                })
                .collect();
            batch.insert(txid.as_slice(), serialize(&indexed)?);
        }

        utxo_tree
            .apply_batch(batch)
            .map_err(|e| LedgerError::Database(format!("Failed to rebuild UTXO tree: {e}")))?;
        info!("Reindexed UTXO set: {} transactions", utxo_map.len());
        Ok(())
    }
}

fn abort(err: LedgerError) -> ConflictableTransactionError<LedgerError> {
    ConflictableTransactionError::Abort(err)
}

/// Apply one block's spends and new outputs to the index, inside the caller's
/// transaction.
pub(crate) fn apply_block(
    chainstate: &TransactionalTree,
    block: &Block,
) -> ConflictableTransactionResult<(), LedgerError> {
    for tx in block.get_transactions() {
        if !tx.is_coinbase() {
            for vin in tx.get_vin() {
                let outs_bytes = chainstate.get(vin.get_txid())?.ok_or_else(|| {
                    abort(LedgerError::Database(format!(
                        "UTXO not found: {}",
                        HEXLOWER.encode(vin.get_txid())
                    )))
                })?;
                let outs: Vec<IndexedOutput> = deserialize(outs_bytes.as_ref()).map_err(abort)?;
                let remaining: Vec<IndexedOutput> = outs
                    .into_iter()
                    .filter(|out| out.vout != vin.get_vout())
                    .collect();

                if remaining.is_empty() {
                    chainstate.remove(vin.get_txid())?;
                } else {
                    chainstate.insert(vin.get_txid(), serialize(&remaining).map_err(abort)?)?;
                }
            }
        }

        let new_outputs: Vec<IndexedOutput> = tx
            .get_vout()
            .iter()
            .enumerate()
            .map(|(vout, output)| IndexedOutput {
                vout,
                output: output.clone(),
            })
            .collect();
        chainstate.insert(tx.get_id(), serialize(&new_outputs).map_err(abort)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::SUBSIDY;
    use crate::core::Transaction;
    use crate::testnet::test_utils::create_test_blockchain;
    use crate::wallet::Wallet;

    #[test]
    fn test_index_tracks_appends() {
        let (mut blockchain, _dir, owner) = create_test_blockchain().unwrap();
        let recipient = Wallet::new().unwrap();
        {
            let utxo_set = UTXOSet::new(&blockchain);
            assert_eq!(utxo_set.count_transactions().unwrap(), 1);
            assert_eq!(utxo_set.balance(&owner.get_pub_key_hash()).unwrap(), SUBSIDY);
        }

        let tx = Transaction::new_utxo_transaction(
            &owner,
            &recipient.get_pub_key_hash(),
            25,
            &blockchain,
        )
        .unwrap();
        let genesis_txid = tx.get_vin()[0].get_txid().to_vec();
        blockchain.add_block(&[tx]).unwrap();

        let utxo_set = UTXOSet::new(&blockchain);
        assert!(!utxo_set.is_unspent(&genesis_txid, 0).unwrap());
        assert_eq!(utxo_set.count_transactions().unwrap(), 1);
        assert_eq!(utxo_set.balance(&owner.get_pub_key_hash()).unwrap(), 75);
        assert_eq!(
            utxo_set.balance(&recipient.get_pub_key_hash()).unwrap(),
            25
        );
    }

    #[test]
    fn test_reindex_agrees_with_replay() {
        let (mut blockchain, _dir, owner) = create_test_blockchain().unwrap();
        let recipient = Wallet::new().unwrap();
        blockchain.mine_block(&[], &owner.get_pub_key_hash()).unwrap();
        let tx = Transaction::new_utxo_transaction(
            &owner,
            &recipient.get_pub_key_hash(),
            150,
            &blockchain,
        )
        .unwrap();
        blockchain.add_block(&[tx]).unwrap();

        let utxo_set = UTXOSet::new(&blockchain);
        let before = utxo_set.count_transactions().unwrap();
        utxo_set.reindex().unwrap();
        assert_eq!(utxo_set.count_transactions().unwrap(), before);

        let resolver = UTXOResolver::new(&blockchain);
        for key_hash in [owner.get_pub_key_hash(), recipient.get_pub_key_hash()] {
            assert_eq!(
                utxo_set.balance(&key_hash).unwrap(),
                resolver.balance_for(&key_hash).unwrap()
            );
        }
    }

    #[test]
    fn test_find_spendable_outputs_from_index() {
        let (mut blockchain, _dir, owner) = create_test_blockchain().unwrap();
        let key_hash = owner.get_pub_key_hash();
        blockchain.mine_block(&[], &key_hash).unwrap();

        let utxo_set = UTXOSet::new(&blockchain);
        let (accumulated, outputs) = utxo_set.find_spendable_outputs(&key_hash, 50).unwrap();
        assert_eq!(accumulated, SUBSIDY);
        assert_eq!(outputs.len(), 1);

        let (accumulated, _) = utxo_set.find_spendable_outputs(&key_hash, 500).unwrap();
        assert_eq!(accumulated, 2 * SUBSIDY);
    }
}
