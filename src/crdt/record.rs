//! Persistence records.
//!
//! A sequence is saved as one record per element, live or tombstoned. Each
//! record names its reference explicitly, so records can be written and read
//! back in any order and the visiting order is rebuilt on load.

use serde::{Deserialize, Serialize};

use crate::crdt::codec::Value;
use crate::crdt::config::SequenceConfig;
use crate::crdt::error::{CodecError, Result, SequenceError};
use crate::crdt::operation::Operation;
use crate::crdt::sequence::Sequence;
use crate::crdt::types::Identifier;

/// The stored form of one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: Identifier,
    pub reference: Identifier,
    pub tombstone: bool,
    /// Codec-encoded value; absent for tombstones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<u8>>,
}

impl Sequence {
    /// One record per stored element, in visiting order.
    pub fn records(&self) -> Result<Vec<ElementRecord>> {
        let store = self.store();
        self.elements()
            .map(|element| -> Result<ElementRecord> {
                let value = element
                    .value()
                    .map(|value| self.codec().encode_to_vec(value))
                    .transpose()?;
                Ok(ElementRecord {
                    id: element.id().clone(),
                    reference: store.reference_of(element).clone(),
                    tombstone: element.is_tombstoned(),
                    value,
                })
            })
            .collect()
    }

    /// Rebuilds a sequence from records given in any order.
    ///
    /// # Errors
    ///
    /// Fails with `UnresolvableReference` if some record's reference never
    /// appears, and with `InvalidValue` if a stored value does not decode to
    /// exactly one value or a live record carries no value.
    pub fn from_records<I>(config: SequenceConfig, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = ElementRecord>,
    {
        let mut seq = Sequence::with_config(config);
        for record in records {
            let value = match &record.value {
                Some(bytes) => {
                    let (value, used) = config.codec.decode(bytes, 0)?;
                    if used != bytes.len() {
                        return Err(CodecError::Invalid { offset: used }.into());
                    }
                    value
                }
                None if record.tombstone => Value::default(),
                None => return Err(CodecError::Truncated { offset: 0 }.into()),
            };
            seq.insert(Operation::insert(record.id.clone(), record.reference, value))?;
            if record.tombstone {
                seq.insert(Operation::delete(record.id.clone(), record.id))?;
            }
        }

        match seq.missing_references().into_iter().next() {
            Some(reference) => Err(SequenceError::UnresolvableReference { reference }),
            None => Ok(seq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::codec::Codec;

    fn id(counter: u64) -> Identifier {
        Identifier::new(counter, "a")
    }

    fn sample() -> Sequence {
        let mut seq = Sequence::new(Codec::Utf8);
        seq.insert(Operation::insert(id(1), Identifier::sentinel(), 'a')).unwrap();
        seq.insert(Operation::insert(id(2), id(1), 'b')).unwrap();
        seq.insert(Operation::insert(id(3), id(1), '€')).unwrap();
        seq.insert(Operation::delete(id(4), id(2))).unwrap();
        seq
    }

    #[test]
    fn test_records_cover_tombstones() {
        let records = sample().records().unwrap();
        assert_eq!(records.len(), 3);

        let tomb = records.iter().find(|r| r.id == id(2)).unwrap();
        assert!(tomb.tombstone);
        assert_eq!(tomb.value, None);
        assert_eq!(tomb.reference, id(1));

        let euro = records.iter().find(|r| r.id == id(3)).unwrap();
        assert_eq!(euro.value.as_deref(), Some("€".as_bytes()));
    }

    #[test]
    fn test_reload_in_reverse_order() {
        let seq = sample();
        let mut records = seq.records().unwrap();
        records.reverse();

        let loaded = Sequence::from_records(*seq.config(), records).unwrap();
        assert_eq!(loaded.to_string(), seq.to_string());
        assert_eq!(loaded.row_count(), seq.row_count());
        assert_eq!(loaded.size(), seq.size());
        assert_eq!(loaded.records().unwrap(), seq.records().unwrap());
    }

    #[test]
    fn test_reload_through_json() {
        let seq = sample();
        let json = serde_json::to_string(&seq.records().unwrap()).unwrap();
        let records: Vec<ElementRecord> = serde_json::from_str(&json).unwrap();
        let loaded = Sequence::from_records(*seq.config(), records).unwrap();
        assert_eq!(loaded.to_string(), "a€");
    }

    #[test]
    fn test_dangling_reference() {
        let records = vec![ElementRecord {
            id: id(2),
            reference: id(1),
            tombstone: false,
            value: Some(vec![b'x']),
        }];
        assert_eq!(
            Sequence::from_records(SequenceConfig::default(), records).unwrap_err(),
            SequenceError::UnresolvableReference { reference: id(1) }
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let records = vec![ElementRecord {
            id: id(1),
            reference: Identifier::sentinel(),
            tombstone: false,
            value: Some(vec![b'x', b'y']),
        }];
        assert!(matches!(
            Sequence::from_records(SequenceConfig::default(), records),
            Err(SequenceError::InvalidValue(CodecError::Invalid { offset: 1 }))
        ));
    }

    #[test]
    fn test_live_record_without_value_rejected() {
        let records = vec![ElementRecord {
            id: id(1),
            reference: Identifier::sentinel(),
            tombstone: false,
            value: None,
        }];
        assert!(matches!(
            Sequence::from_records(SequenceConfig::default(), records),
            Err(SequenceError::InvalidValue(CodecError::Truncated { offset: 0 }))
        ));
    }
}
