//! Canonical block hashing.
//!
//! Every block hash is SHA-256 over a fixed serialization of the block's
//! fields, excluding the hash itself. The preimage is compact JSON with the
//! keys in alphabetical order:
//!
//! ```text
//! {"index":..,"nonce":..,"previous_hash":"<hex>","timestamp":..,"transactions":[..]}
//! ```
//!
//! The field list and order are part of the format; changing either breaks
//! every stored hash.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Hex characters in a rendered digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// SHA-256 digest of a block's canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// The all-zero digest, used as the genesis predecessor link.
    pub const ZERO: BlockHash = BlockHash([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out)?;
        Ok(BlockHash(out))
    }

    /// True when the digest starts with at least `difficulty` zero hex
    /// characters, i.e. zero nibbles.
    pub fn satisfies_difficulty(&self, difficulty: u32) -> bool {
        let mut remaining = difficulty;
        for byte in &self.0 {
            if remaining == 0 {
                return true;
            }
            if remaining == 1 {
                return byte >> 4 == 0;
            }
            if *byte != 0 {
                return false;
            }
            remaining -= 2;
        }
        remaining == 0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for BlockHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BlockHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Canonical preimage. Field declaration order is the serialized key order
/// and must stay alphabetical.
#[derive(Serialize)]
struct Preimage<'a> {
    index: u64,
    nonce: u64,
    previous_hash: &'a BlockHash,
    timestamp: i64,
    transactions: &'a [String],
}

/// Hash a block's fields. Pure; identical fields always produce the
/// identical digest.
pub fn hash_fields(
    index: u64,
    nonce: u64,
    previous_hash: &BlockHash,
    timestamp: i64,
    transactions: &[String],
) -> BlockHash {
    let preimage = Preimage {
        index,
        nonce,
        previous_hash,
        timestamp,
        transactions,
    };
    // Serializing strings and integers to JSON cannot fail.
    let bytes = serde_json::to_vec(&preimage).expect("canonical preimage serialization");

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    BlockHash(out)
}
