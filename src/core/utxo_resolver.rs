use crate::core::{Blockchain, TXOutput, Transaction};
use crate::error::Result;
use data_encoding::HEXLOWER;
use std::collections::HashMap;

/// Answers balance and spendability questions by replaying the chain from
/// tip to genesis. Nothing is cached: each query is one full traversal.
pub struct UTXOResolver<'a> {
    blockchain: &'a Blockchain,
}

impl<'a> UTXOResolver<'a> {
    pub fn new(blockchain: &'a Blockchain) -> UTXOResolver<'a> {
        UTXOResolver { blockchain }
    }

    /// Walk newest to oldest, calling `visit` for every unspent output locked
    /// to `pub_key_hash` (every unspent output when `None`). Spends are recorded
    /// as blocks are visited, so they are known before the older outputs they
    /// consume come up. `visit` returns false to stop the walk.
    fn walk_unspent<F>(&self, pub_key_hash: Option<&[u8]>, mut visit: F) -> Result<()>
    where
        F: FnMut(&Transaction, usize, &TXOutput) -> bool,
    {
        // ( K -> txid_hex, V -> spent output indices )
        let mut spent_txos: HashMap<String, Vec<usize>> = HashMap::new();

        for block in self.blockchain.iterator() {
            let block = block?;
            for tx in block.get_transactions() {
                let txid_hex = HEXLOWER.encode(tx.get_id());
                for (idx, out) in tx.get_vout().iter().enumerate() {
                    if pub_key_hash.is_some_and(|key| !out.is_locked_with_key(key)) {
                        continue;
                    }
                    if spent_txos
                        .get(&txid_hex)
                        .is_some_and(|outs| outs.contains(&idx))
                    {
                        continue;
                    }
                    if !visit(tx, idx, out) {
                        return Ok(());
                    }
                }

                if tx.is_coinbase() {
                    continue;
                }
                for txin in tx.get_vin() {
                    if pub_key_hash.map_or(true, |key| txin.uses_key(key)) {
                        spent_txos
                            .entry(HEXLOWER.encode(txin.get_txid()))
                            .or_default()
                            .push(txin.get_vout());
                    }
                }
            }
        }
        Ok(())
    }

    pub fn unspent_outputs_for(&self, pub_key_hash: &[u8]) -> Result<Vec<(Transaction, usize)>> {
        let mut unspent = vec![];
        self.walk_unspent(Some(pub_key_hash), |tx, idx, _| {
            unspent.push((tx.clone(), idx));
            true
        })?;
        Ok(unspent)
    }

    pub fn balance_for(&self, pub_key_hash: &[u8]) -> Result<u64> {
        let mut balance = 0u64;
        self.walk_unspent(Some(pub_key_hash), |_, _, out| {
            balance = balance.saturating_add(out.get_value());
            true
        })?;
        Ok(balance)
    }

    /// Collect outputs in traversal order until their value reaches `amount`.
    /// The set is sufficient, not minimal. If the balance falls short, the
    /// whole balance is returned.
    pub fn find_spendable(
        &self,
        pub_key_hash: &[u8],
        amount: u64,
    ) -> Result<(u64, HashMap<String, Vec<usize>>)> {
        let mut unspent_outputs: HashMap<String, Vec<usize>> = HashMap::new();
        let mut accumulated = 0u64;
        if amount == 0 {
            return Ok((accumulated, unspent_outputs));
        }

        self.walk_unspent(Some(pub_key_hash), |tx, idx, out| {
            accumulated = accumulated.saturating_add(out.get_value());
            unspent_outputs
                .entry(HEXLOWER.encode(tx.get_id()))
                .or_default()
                .push(idx);
            accumulated < amount
        })?;
        Ok((accumulated, unspent_outputs))
    }

    /// Every unspent output on the chain, keyed by raw txid.
    pub fn all_unspent(&self) -> Result<HashMap<Vec<u8>, Vec<(usize, TXOutput)>>> {
        let mut utxo: HashMap<Vec<u8>, Vec<(usize, TXOutput)>> = HashMap::new();
        self.walk_unspent(None, |tx, idx, out| {
            utxo.entry(tx.get_id().to_vec())
                .or_default()
                .push((idx, out.clone()));
            true
        })?;
        Ok(utxo)
    }
}
