// Canonical encoding for everything the ledger persists or hashes.
// The standard bincode config is part of the on-disk format: changing it
// changes every block hash and transaction id.
use crate::error::{LedgerError, Result};

pub fn serialize<T: bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| LedgerError::Serialization(format!("Serialization failed: {e}")))
}

pub fn deserialize<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T> {
    let config = bincode::config::standard();
    let (data, _) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| LedgerError::Serialization(format!("Deserialization failed: {e}")))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, bincode::Encode, bincode::Decode)]
    struct Record {
        key: Vec<u8>,
        index: usize,
        value: u64,
    }

    #[test]
    fn test_encoding_is_stable() {
        let record = Record {
            key: vec![0xAB; 4],
            index: 1,
            value: 100,
        };
        let first = serialize(&record).unwrap();
        let second = serialize(&record.clone()).unwrap();
        assert_eq!(first, second);

        let decoded: Record = deserialize(&first).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_deserialize_truncated_data() {
        let record = Record {
            key: vec![1, 2, 3],
            index: 7,
            value: 9,
        };
        let bytes = serialize(&record).unwrap();
        let result: Result<Record> = deserialize(&bytes[..2]);
        assert!(matches!(result, Err(LedgerError::Serialization(_))));
    }
}
