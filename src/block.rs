//! Block types: the unsealed candidate and the sealed ledger unit.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::hasher::{hash_fields, BlockHash};

/// A block under construction or proof-of-work search. Carries every field
/// of a sealed block except the hash, so an unhashed block cannot leak into
/// the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBlock {
    pub index: u64,
    pub transactions: Vec<String>,
    pub timestamp: i64,
    pub previous_hash: BlockHash,
    pub nonce: u64,
}

impl CandidateBlock {
    /// Build a candidate extending the block identified by `previous_hash`.
    /// The timestamp is clamped to `min_timestamp` so the sequence never
    /// runs backwards when the wall clock does.
    pub fn new(
        index: u64,
        previous_hash: BlockHash,
        min_timestamp: i64,
        transactions: Vec<String>,
    ) -> Self {
        let timestamp = Utc::now().timestamp_millis().max(min_timestamp);
        CandidateBlock {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: 0,
        }
    }

    /// Hash of the candidate's current field values.
    pub fn compute_hash(&self) -> BlockHash {
        hash_fields(
            self.index,
            self.nonce,
            &self.previous_hash,
            self.timestamp,
            &self.transactions,
        )
    }

    /// Seal the candidate with the hash of its current fields. Admission
    /// re-checks the proof, so sealing early only produces a block the
    /// chain will reject.
    pub fn seal(self) -> Block {
        let hash = self.compute_hash();
        Block {
            index: self.index,
            transactions: self.transactions,
            timestamp: self.timestamp,
            previous_hash: self.previous_hash,
            nonce: self.nonce,
            hash,
        }
    }
}

/// A sealed block. `hash` was derived from the other five fields when the
/// block was sealed; `Chain::validate` can re-derive it at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<String>,
    pub timestamp: i64,
    pub previous_hash: BlockHash,
    pub nonce: u64,
    pub hash: BlockHash,
}

impl Block {
    /// The genesis block: index 0, no payloads, all-zero predecessor link.
    /// Its hash is computed directly rather than mined, so the difficulty
    /// target applies only to the blocks after it.
    pub fn genesis() -> Block {
        CandidateBlock {
            index: 0,
            transactions: Vec::new(),
            timestamp: Utc::now().timestamp_millis(),
            previous_hash: BlockHash::ZERO,
            nonce: 0,
        }
        .seal()
    }

    /// Recompute the hash from the stored fields.
    pub fn compute_hash(&self) -> BlockHash {
        hash_fields(
            self.index,
            self.nonce,
            &self.previous_hash,
            self.timestamp,
            &self.transactions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_shape() {
        let genesis = Block::genesis();
        assert_eq!(genesis.index, 0);
        assert!(genesis.transactions.is_empty());
        assert_eq!(genesis.previous_hash, BlockHash::ZERO);
        assert_eq!(genesis.nonce, 0);
        assert_eq!(genesis.hash, genesis.compute_hash());
    }

    #[test]
    fn sealed_hash_matches_recompute() {
        let candidate = CandidateBlock {
            index: 1,
            transactions: vec!["a".to_string(), "b".to_string()],
            timestamp: 1_700_000_000_000,
            previous_hash: BlockHash::ZERO,
            nonce: 7,
        };
        let expected = candidate.compute_hash();
        let block = candidate.seal();
        assert_eq!(block.hash, expected);
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn timestamp_clamped_to_predecessor() {
        let future = Utc::now().timestamp_millis() + 86_400_000;
        let candidate = CandidateBlock::new(1, BlockHash::ZERO, future, vec!["a".to_string()]);
        assert_eq!(candidate.timestamp, future);
    }

    #[test]
    fn block_serializes_hashes_as_hex() {
        let block = Block::genesis();
        let value = serde_json::to_value(&block).unwrap();
        let prev = value["previous_hash"].as_str().unwrap();
        assert_eq!(prev, "0".repeat(64));
        assert_eq!(value["hash"].as_str().unwrap(), block.hash.to_hex());
    }
}
