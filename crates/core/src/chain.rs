//! Hash chaining for lot histories
//!
//! Every step carries a SHA-256 digest over its predecessor's digest, the
//! lot id, its index, its timestamp and its description. The first step
//! chains from a per-lot genesis hash. Rewriting any recorded step changes
//! every later digest, which makes history tampering detectable.
//!
//! The chain provides tamper-evidence, not authentication: anyone able to
//! rewrite the whole history can also recompute the chain.

use crate::error::LedgerError;
use crate::types::{LotId, StepRecord, Timestamp};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};

const GENESIS_DOMAIN: &[u8] = b"cafeledger.lot.v1";

/// 32-byte SHA-256 digest in a lot's chain
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainHash([u8; 32]);

impl ChainHash {
    /// Wrap raw digest bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        ChainHash(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(ChainHash(bytes))
    }
}

impl std::fmt::Debug for ChainHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChainHash({})", &self.to_hex()[..16])
    }
}

impl std::fmt::Display for ChainHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Hex for human-readable formats (JSON), raw bytes for binary ones (WAL).
impl Serialize for ChainHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ChainHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            struct HexVisitor;

            impl<'de> Visitor<'de> for HexVisitor {
                type Value = ChainHash;

                fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str("a 64-character hex digest")
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<ChainHash, E> {
                    ChainHash::from_hex(v)
                        .map_err(|e| E::custom(format!("invalid chain hash: {}", e)))
                }
            }

            deserializer.deserialize_str(HexVisitor)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(ChainHash)
        }
    }
}

/// Hash a new lot's history starts from
pub fn genesis(lot_id: LotId) -> ChainHash {
    let mut hasher = Sha256::new();
    hasher.update(GENESIS_DOMAIN);
    hasher.update(lot_id.as_u64().to_be_bytes());
    ChainHash(hasher.finalize().into())
}

/// Hash of one step given its predecessor's hash
pub fn step_hash(
    prev: &ChainHash,
    lot_id: LotId,
    index: u64,
    timestamp: Timestamp,
    description: &str,
) -> ChainHash {
    let mut hasher = Sha256::new();
    hasher.update(prev.as_bytes());
    hasher.update(lot_id.as_u64().to_be_bytes());
    hasher.update(index.to_be_bytes());
    hasher.update(timestamp.as_secs().to_be_bytes());
    hasher.update((description.len() as u64).to_be_bytes());
    hasher.update(description.as_bytes());
    ChainHash(hasher.finalize().into())
}

/// Chain verification result
///
/// Returned by [`verify_chain`] to report the integrity status of a lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainVerification {
    /// Whether the chain is valid
    pub is_valid: bool,
    /// Total length of the chain
    pub length: u64,
    /// First invalid step index (if any)
    pub first_invalid: Option<u64>,
    /// Head hash recomputed from the history
    pub head: ChainHash,
}

impl ChainVerification {
    /// Convert into a result, failing on the first broken link
    pub fn into_result(self, lot_id: LotId) -> crate::Result<ChainHash> {
        match self.first_invalid {
            None => Ok(self.head),
            Some(index) => Err(LedgerError::ChainMismatch { lot_id, index }),
        }
    }
}

/// Recompute a lot's chain and compare it against the stored hashes
///
/// Also checks index alignment and timestamp order, since either would
/// indicate a rewritten history.
pub fn verify_chain(lot_id: LotId, history: &[StepRecord]) -> ChainVerification {
    let mut prev = genesis(lot_id);
    let mut last_ts: Option<Timestamp> = None;

    for (i, record) in history.iter().enumerate() {
        let index = i as u64;
        let expected = step_hash(&prev, lot_id, index, record.timestamp, &record.description);
        let regressed = last_ts.map_or(false, |t| record.timestamp < t);
        if record.index != index || record.hash != expected || regressed {
            return ChainVerification {
                is_valid: false,
                length: history.len() as u64,
                first_invalid: Some(index),
                head: prev,
            };
        }
        prev = expected;
        last_ts = Some(record.timestamp);
    }

    ChainVerification {
        is_valid: true,
        length: history.len() as u64,
        first_invalid: None,
        head: prev,
    }
}
