//! Chain state: the sealed block sequence, the pending pool, and the
//! admission rules that keep them consistent.

use crate::block::{Block, CandidateBlock};
use crate::error::{ChainError, Result};
use crate::hasher::BlockHash;

/// Difficulty bounds, in leading zero hex characters of a block hash.
pub const MIN_DIFFICULTY: u32 = 1;
pub const MAX_DIFFICULTY: u32 = 64;

/// An append-only sequence of sealed blocks plus the payloads waiting to be
/// mined. The genesis block is created at construction; nothing is ever
/// removed from `blocks`.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
    pending: Vec<String>,
    difficulty: u32,
}

impl Chain {
    pub fn new(difficulty: u32) -> Result<Self> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
            return Err(ChainError::InvalidDifficulty(difficulty));
        }
        Ok(Chain {
            blocks: vec![Block::genesis()],
            pending: Vec::new(),
            difficulty,
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn tip(&self) -> &Block {
        self.blocks.last().expect("chain always holds genesis")
    }

    /// Queue a payload for the next mined block. Returns the pool depth
    /// after the append.
    pub fn submit_transaction(&mut self, payload: String) -> usize {
        self.pending.push(payload);
        self.pending.len()
    }

    /// Snapshot the pool into a candidate extending the tip. `None` when
    /// there is nothing to mine.
    pub fn stage_candidate(&self) -> Option<CandidateBlock> {
        if self.pending.is_empty() {
            return None;
        }
        let tip = self.tip();
        Some(CandidateBlock::new(
            tip.index + 1,
            tip.hash,
            tip.timestamp,
            self.pending.clone(),
        ))
    }

    /// Difficulty target plus a full recompute from the block's stored
    /// fields. Both must hold; a block whose fields were touched after
    /// sealing fails the recompute even though its stored hash still
    /// satisfies the target.
    pub fn is_valid_proof(&self, block: &Block) -> bool {
        block.hash.satisfies_difficulty(self.difficulty) && block.hash == block.compute_hash()
    }

    /// Append a solved block after re-validating it against the current
    /// tip. The linkage check catches candidates that went stale while the
    /// search ran; the proof check catches anything mutated between solving
    /// and admission. On any error the chain and the pool are unchanged.
    pub fn admit(&mut self, block: Block) -> Result<&Block> {
        let tip_index = self.tip().index;
        let tip_hash = self.tip().hash;

        if block.index != tip_index + 1 || block.previous_hash != tip_hash {
            return Err(ChainError::LinkageMismatch(format!(
                "expected index {} extending {}, got index {} extending {}",
                tip_index + 1,
                tip_hash,
                block.index,
                block.previous_hash
            )));
        }

        if !self.is_valid_proof(&block) {
            return Err(ChainError::ProofInvalid(format!(
                "hash {} fails recompute or the difficulty target {}",
                block.hash, self.difficulty
            )));
        }

        self.blocks.push(block);
        Ok(self.tip())
    }

    /// Drop the first `count` pooled payloads after a successful admit.
    /// Payloads submitted while the search ran stay queued for the next
    /// cycle.
    pub fn clear_mined(&mut self, count: usize) {
        let count = count.min(self.pending.len());
        self.pending.drain(..count);
    }

    /// Audit the whole chain: index sequence, hash integrity for every
    /// block, and linkage plus the difficulty target for every block after
    /// genesis.
    pub fn validate(&self) -> Result<()> {
        for (i, block) in self.blocks.iter().enumerate() {
            if block.index != i as u64 {
                return Err(ChainError::LinkageMismatch(format!(
                    "block at position {} carries index {}",
                    i, block.index
                )));
            }
            if block.hash != block.compute_hash() {
                return Err(ChainError::ProofInvalid(format!(
                    "block {} hash does not match its fields",
                    i
                )));
            }
            if i == 0 {
                if block.previous_hash != BlockHash::ZERO {
                    return Err(ChainError::LinkageMismatch(
                        "genesis predecessor link is not the zero digest".to_string(),
                    ));
                }
                continue;
            }
            if block.previous_hash != self.blocks[i - 1].hash {
                return Err(ChainError::LinkageMismatch(format!(
                    "block {} does not link to block {}",
                    i,
                    i - 1
                )));
            }
            if !block.hash.satisfies_difficulty(self.difficulty) {
                return Err(ChainError::ProofInvalid(format!(
                    "block {} hash misses the difficulty target {}",
                    i, self.difficulty
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::{solve, SolveStatus, StopSignal};

    fn solved_candidate(chain: &Chain) -> Block {
        let mut candidate = chain.stage_candidate().expect("non-empty pool");
        match solve(&mut candidate, chain.difficulty(), &StopSignal::new()) {
            SolveStatus::Solved(_) => candidate.seal(),
            SolveStatus::Cancelled => panic!("search without a stop signal cannot cancel"),
        }
    }

    #[test]
    fn new_chain_holds_only_genesis() {
        let chain = Chain::new(2).unwrap();
        assert_eq!(chain.blocks().len(), 1);
        assert_eq!(chain.tip().index, 0);
        assert!(chain.pending().is_empty());
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn difficulty_out_of_range_is_rejected() {
        assert!(matches!(Chain::new(0), Err(ChainError::InvalidDifficulty(0))));
        assert!(matches!(Chain::new(65), Err(ChainError::InvalidDifficulty(65))));
        assert!(Chain::new(64).is_ok());
    }

    #[test]
    fn stage_candidate_requires_pending_payloads() {
        let mut chain = Chain::new(1).unwrap();
        assert!(chain.stage_candidate().is_none());

        chain.submit_transaction("a".to_string());
        let candidate = chain.stage_candidate().unwrap();
        assert_eq!(candidate.index, 1);
        assert_eq!(candidate.previous_hash, chain.tip().hash);
        assert_eq!(candidate.transactions, vec!["a".to_string()]);
        assert!(candidate.timestamp >= chain.tip().timestamp);
    }

    #[test]
    fn admit_appends_a_solved_candidate() {
        let mut chain = Chain::new(1).unwrap();
        chain.submit_transaction("a".to_string());
        chain.submit_transaction("b".to_string());

        let block = solved_candidate(&chain);
        let batch = block.transactions.len();
        let admitted = chain.admit(block).unwrap().clone();
        chain.clear_mined(batch);

        assert_eq!(admitted.index, 1);
        assert_eq!(
            admitted.transactions,
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(chain.pending().is_empty());
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn admit_rejects_a_stale_candidate() {
        let mut chain = Chain::new(1).unwrap();
        chain.submit_transaction("a".to_string());

        let block = solved_candidate(&chain);
        chain.admit(block.clone()).unwrap();
        chain.clear_mined(1);

        // The tip moved, so the same block no longer extends it.
        let err = chain.admit(block).unwrap_err();
        assert!(matches!(err, ChainError::LinkageMismatch(_)));
        assert_eq!(chain.blocks().len(), 2);
    }

    #[test]
    fn admit_rejects_a_tampered_block() {
        let mut chain = Chain::new(1).unwrap();
        chain.submit_transaction("a".to_string());

        let mut block = solved_candidate(&chain);
        block.transactions.push("forged".to_string());

        let err = chain.admit(block).unwrap_err();
        assert!(matches!(err, ChainError::ProofInvalid(_)));
        // Pool untouched by the failed admit.
        assert_eq!(chain.pending(), ["a".to_string()]);
        assert_eq!(chain.blocks().len(), 1);
    }

    #[test]
    fn admit_rejects_an_unmined_block() {
        // At difficulty 8 a hash sealed without searching misses the target
        // (with overwhelming probability).
        let mut chain = Chain::new(8).unwrap();
        chain.submit_transaction("a".to_string());

        let block = chain.stage_candidate().unwrap().seal();
        let err = chain.admit(block).unwrap_err();
        assert!(matches!(err, ChainError::ProofInvalid(_)));
    }

    #[test]
    fn late_submission_survives_the_cycle() {
        let mut chain = Chain::new(1).unwrap();
        chain.submit_transaction("a".to_string());

        let candidate = chain.stage_candidate().unwrap();
        let batch = candidate.transactions.len();

        // Arrives while the search would be running.
        chain.submit_transaction("late".to_string());

        let mut candidate = candidate;
        match solve(&mut candidate, chain.difficulty(), &StopSignal::new()) {
            SolveStatus::Solved(_) => {}
            SolveStatus::Cancelled => panic!("search without a stop signal cannot cancel"),
        }
        chain.admit(candidate.seal()).unwrap();
        chain.clear_mined(batch);

        assert_eq!(chain.pending(), ["late".to_string()]);
        assert_eq!(chain.tip().transactions, vec!["a".to_string()]);
    }

    #[test]
    fn validate_detects_rewritten_history() {
        let mut chain = Chain::new(1).unwrap();
        chain.submit_transaction("a".to_string());
        let block = solved_candidate(&chain);
        chain.admit(block).unwrap();
        chain.clear_mined(1);
        assert!(chain.validate().is_ok());

        chain.blocks[1].transactions[0] = "rewritten".to_string();
        assert!(matches!(chain.validate(), Err(ChainError::ProofInvalid(_))));
    }

    #[test]
    fn validate_detects_a_broken_link() {
        let mut chain = Chain::new(1).unwrap();
        chain.submit_transaction("a".to_string());
        let block = solved_candidate(&chain);
        chain.admit(block).unwrap();
        chain.clear_mined(1);

        // Replay the sealed fields with a severed predecessor link.
        let mut severed = chain.blocks[1].clone();
        severed.previous_hash = BlockHash::ZERO;
        severed.hash = severed.compute_hash();
        chain.blocks[1] = severed;

        assert!(matches!(
            chain.validate(),
            Err(ChainError::LinkageMismatch(_))
        ));
    }
}
