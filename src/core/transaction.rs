// Value moves between key hashes as in Bitcoin's UTXO model: a transaction
// consumes earlier outputs through its inputs and creates new outputs.
// Each input is signed separately over a trimmed copy of the transaction.

use crate::core::{Blockchain, UTXOResolver};
use crate::error::{LedgerError, Result};
use crate::utils::{
    deserialize, ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, serialize,
    sha256_digest,
};
use crate::wallet::{hash_pub_key, Wallet};
use data_encoding::HEXLOWER;
use log::warn;
use std::collections::HashMap;
use uuid::Uuid;

/// Value paid by every coinbase transaction
pub const SUBSIDY: u64 = 100;

/// Referenced transactions keyed by hex-encoded id
pub type ReferencedTransactions = HashMap<String, Transaction>;

#[derive(Debug, Clone, Default, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct TXInput {
    txid: Vec<u8>,      // id of the transaction holding the output being spent
    vout: usize,        // index of that output
    signature: Vec<u8>, // empty until signed; coinbase data for coinbase inputs
    pub_key: Vec<u8>,   // spender's raw public key
}

impl TXInput {
    pub fn new(txid: &[u8], vout: usize, pub_key: &[u8]) -> TXInput {
        TXInput {
            txid: txid.to_vec(),
            vout,
            signature: vec![],
            pub_key: pub_key.to_vec(),
        }
    }

    pub fn get_txid(&self) -> &[u8] {
        self.txid.as_slice()
    }

    pub fn get_vout(&self) -> usize {
        self.vout
    }

    pub fn get_signature(&self) -> &[u8] {
        self.signature.as_slice()
    }

    pub fn get_pub_key(&self) -> &[u8] {
        self.pub_key.as_slice()
    }

    pub fn uses_key(&self, pub_key_hash: &[u8]) -> bool {
        hash_pub_key(self.pub_key.as_slice()) == pub_key_hash
    }
}

#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct TXOutput {
    value: u64,
    pub_key_hash: Vec<u8>, // only the holder of the matching key may spend
}

impl TXOutput {
    pub fn new(value: u64, pub_key_hash: &[u8]) -> TXOutput {
        TXOutput {
            value,
            pub_key_hash: pub_key_hash.to_vec(),
        }
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_pub_key_hash(&self) -> &[u8] {
        self.pub_key_hash.as_slice()
    }

    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.pub_key_hash.as_slice() == pub_key_hash
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    id: Vec<u8>,
    vin: Vec<TXInput>,
    vout: Vec<TXOutput>,
}

impl Transaction {
    /// Build an unsigned transaction and fix its id.
    pub fn new(vin: Vec<TXInput>, vout: Vec<TXOutput>) -> Result<Transaction> {
        let mut tx = Transaction {
            id: vec![],
            vin,
            vout,
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    pub fn new_coinbase_tx(to: &[u8], data: &str) -> Result<Transaction> {
        Self::new_coinbase_tx_with_reward(to, SUBSIDY, data)
    }

    /// A coinbase has a single input with an empty txid. Its signature slot
    /// carries `data`, or a random UUID so repeated rewards to one key differ.
    pub fn new_coinbase_tx_with_reward(to: &[u8], reward: u64, data: &str) -> Result<Transaction> {
        let data = if data.is_empty() {
            Uuid::new_v4().as_bytes().to_vec()
        } else {
            data.as_bytes().to_vec()
        };
        let tx_input = TXInput {
            signature: data,
            ..Default::default()
        };
        Self::new(vec![tx_input], vec![TXOutput::new(reward, to)])
    }

    /// Pay `amount` from `wallet` to `to`, returning change to the sender.
    /// Spendable outputs come from a replay of `blockchain`; the result is signed.
    pub fn new_utxo_transaction(
        wallet: &Wallet,
        to: &[u8],
        amount: u64,
        blockchain: &Blockchain,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(LedgerError::Transaction(
                "Amount must be positive".to_string(),
            ));
        }

        let from = wallet.get_pub_key_hash();
        let (accumulated, valid_outputs) =
            UTXOResolver::new(blockchain).find_spendable(from.as_slice(), amount)?;

        if accumulated < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: accumulated,
            });
        }

        let mut inputs = vec![];
        for (txid_hex, outs) in valid_outputs {
            let txid = HEXLOWER
                .decode(txid_hex.as_bytes())
                .map_err(|e| LedgerError::Transaction(format!("Invalid transaction ID: {e}")))?;
            for out in outs {
                inputs.push(TXInput::new(&txid, out, wallet.get_public_key()));
            }
        }

        let mut outputs = vec![TXOutput::new(amount, to)];
        if accumulated > amount {
            outputs.push(TXOutput::new(accumulated - amount, from.as_slice()));
        }

        let mut tx = Transaction::new(inputs, outputs)?;
        blockchain.sign_transaction(&mut tx, wallet.get_pkcs8())?;
        Ok(tx)
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].txid.is_empty()
    }

    // Every input stripped of signature and public key.
    fn trimmed_copy(&self) -> Transaction {
        Transaction {
            id: self.id.clone(),
            vin: self
                .vin
                .iter()
                .map(|input| TXInput::new(input.get_txid(), input.get_vout(), &[]))
                .collect(),
            vout: self.vout.clone(),
        }
    }

    fn referenced_output<'a>(
        input: &TXInput,
        prev_txs: &'a ReferencedTransactions,
    ) -> Result<&'a TXOutput> {
        let txid_hex = HEXLOWER.encode(input.get_txid());
        let prev_tx = prev_txs
            .get(&txid_hex)
            .ok_or_else(|| LedgerError::ReferencedTransactionMissing(txid_hex.clone()))?;
        prev_tx.vout.get(input.get_vout()).ok_or_else(|| {
            LedgerError::Transaction(format!(
                "Output index {} out of range for transaction {txid_hex}",
                input.get_vout()
            ))
        })
    }

    /// Digest signed by input `idx`: a fresh trimmed copy in which only that
    /// input carries a public-key field, set to the lock of the output it spends.
    fn signing_digest(&self, idx: usize, prev_txs: &ReferencedTransactions) -> Result<Vec<u8>> {
        let output = Self::referenced_output(&self.vin[idx], prev_txs)?;
        let mut tx_copy = self.trimmed_copy();
        tx_copy.vin[idx].pub_key = output.pub_key_hash.clone();
        tx_copy.hash()
    }

    /// Sign every input with `pkcs8`. Nothing is attached unless all inputs
    /// could be signed.
    pub fn sign(&mut self, pkcs8: &[u8], prev_txs: &ReferencedTransactions) -> Result<()> {
        if self.is_coinbase() {
            return Ok(());
        }

        let mut signatures = Vec::with_capacity(self.vin.len());
        for idx in 0..self.vin.len() {
            let digest = self.signing_digest(idx, prev_txs)?;
            signatures.push(ecdsa_p256_sha256_sign_digest(pkcs8, &digest)?);
        }

        for (vin, signature) in self.vin.iter_mut().zip(signatures) {
            vin.signature = signature;
        }
        Ok(())
    }

    /// `Err` when a referenced transaction is missing; `Ok(false)` when any
    /// input's key does not own the referenced output or its signature fails.
    pub fn verify(&self, prev_txs: &ReferencedTransactions) -> Result<bool> {
        if self.is_coinbase() {
            return Ok(true);
        }

        for (idx, vin) in self.vin.iter().enumerate() {
            let output = Self::referenced_output(vin, prev_txs)?;
            if !output.is_locked_with_key(&hash_pub_key(vin.get_pub_key())) {
                warn!(
                    "Input {idx} of {} does not own the output it spends",
                    HEXLOWER.encode(&self.id)
                );
                return Ok(false);
            }

            let digest = self.signing_digest(idx, prev_txs)?;
            if !ecdsa_p256_sha256_sign_verify(vin.get_pub_key(), vin.get_signature(), &digest) {
                warn!(
                    "Input {idx} of {} has an invalid signature",
                    HEXLOWER.encode(&self.id)
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    // Id digest: the serialized transaction with its id field cleared and,
    // outside a coinbase, its signatures cleared, so signing keeps the id valid.
    fn hash(&self) -> Result<Vec<u8>> {
        let mut vin = self.vin.clone();
        if !self.is_coinbase() {
            for input in vin.iter_mut() {
                input.signature.clear();
            }
        }
        let tx_copy = Transaction {
            id: vec![],
            vin,
            vout: self.vout.clone(),
        };
        Ok(sha256_digest(tx_copy.serialize()?.as_slice()))
    }

    /// Whether the stored id is the digest of the transaction's content.
    pub fn has_valid_id(&self) -> Result<bool> {
        Ok(self.hash()? == self.id)
    }

    /// Total value of the outputs this transaction spends.
    pub fn input_value(&self, prev_txs: &ReferencedTransactions) -> Result<u64> {
        let mut total = 0u64;
        for input in &self.vin {
            let output = Self::referenced_output(input, prev_txs)?;
            total = total.checked_add(output.value).ok_or_else(|| {
                LedgerError::Transaction("Input value overflows u64".to_string())
            })?;
        }
        Ok(total)
    }

    pub fn output_value(&self) -> Result<u64> {
        self.vout.iter().try_fold(0u64, |total, output| {
            total.checked_add(output.value).ok_or_else(|| {
                LedgerError::Transaction("Output value overflows u64".to_string())
            })
        })
    }

    pub fn get_id(&self) -> &[u8] {
        self.id.as_slice()
    }

    pub fn get_vin(&self) -> &[TXInput] {
        self.vin.as_slice()
    }

    pub fn get_vout(&self) -> &[TXOutput] {
        self.vout.as_slice()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize(bytes)
    }

    #[cfg(test)]
    pub(crate) fn vin_mut(&mut self) -> &mut Vec<TXInput> {
        &mut self.vin
    }

    #[cfg(test)]
    pub(crate) fn vout_mut(&mut self) -> &mut Vec<TXOutput> {
        &mut self.vout
    }

    #[cfg(test)]
    pub(crate) fn set_id(&mut self, id: Vec<u8>) {
        self.id = id;
    }
}

#[cfg(test)]
impl TXInput {
    pub(crate) fn set_signature(&mut self, signature: Vec<u8>) {
        self.signature = signature;
    }

    pub(crate) fn set_pub_key(&mut self, pub_key: Vec<u8>) {
        self.pub_key = pub_key;
    }
}

#[cfg(test)]
impl TXOutput {
    pub(crate) fn set_value(&mut self, value: u64) {
        self.value = value;
    }
}
