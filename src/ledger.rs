//! Thread-safe facade over [`Chain`].
//!
//! A `Ledger` is the object a transport layer holds, usually as an
//! `Arc<Ledger>`. Submissions and reads take short chain locks; the
//! CPU-bound nonce search runs with no chain lock held at all, so readers
//! never wait behind it. Whole mine cycles serialize on a dedicated gate.

use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::block::Block;
use crate::chain::Chain;
use crate::error::Result;
use crate::miner::{solve, SolveStatus, StopSignal};

/// Result of one mine cycle. `EmptyPool` and `Cancelled` are ordinary
/// outcomes, not errors: the chain is unchanged and the pool is left
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MineOutcome {
    Sealed(Block),
    EmptyPool,
    Cancelled,
}

pub struct Ledger {
    chain: RwLock<Chain>,
    // Serializes whole snapshot-solve-admit cycles, so two candidates
    // never race for the same tip.
    mine_gate: Mutex<()>,
}

impl Ledger {
    pub fn new(difficulty: u32) -> Result<Self> {
        Ok(Ledger {
            chain: RwLock::new(Chain::new(difficulty)?),
            mine_gate: Mutex::new(()),
        })
    }

    /// Queue a payload for the next mined block. Safe to call while a mine
    /// cycle is running; the payload lands in the following cycle if the
    /// current one already snapshotted the pool. Returns the pool depth.
    pub fn submit_transaction(&self, payload: String) -> usize {
        self.chain.write().submit_transaction(payload)
    }

    /// Run one mine cycle to completion.
    pub fn mine(&self) -> Result<MineOutcome> {
        self.mine_with_signal(&StopSignal::new())
    }

    /// Run one mine cycle: snapshot the pool into a candidate, search for a
    /// winning nonce, then re-validate and append. Only a confirmed append
    /// removes the mined payloads from the pool.
    pub fn mine_with_signal(&self, stop: &StopSignal) -> Result<MineOutcome> {
        let _cycle = self.mine_gate.lock();

        let (mut candidate, difficulty) = {
            let chain = self.chain.read();
            match chain.stage_candidate() {
                Some(candidate) => (candidate, chain.difficulty()),
                None => {
                    debug!("mine requested with an empty pool");
                    return Ok(MineOutcome::EmptyPool);
                }
            }
        };

        let batch = candidate.transactions.len();
        info!(
            "Mining block {} ({} payloads, difficulty {})",
            candidate.index, batch, difficulty
        );

        let started = Instant::now();
        if let SolveStatus::Cancelled = solve(&mut candidate, difficulty, stop) {
            info!(
                "Search for block {} cancelled after {:.3}s, pool preserved",
                candidate.index,
                started.elapsed().as_secs_f64()
            );
            return Ok(MineOutcome::Cancelled);
        }
        let sealed = candidate.seal();
        let elapsed = started.elapsed();

        let mut chain = self.chain.write();
        let block = chain.admit(sealed)?.clone();
        chain.clear_mined(batch);
        drop(chain);

        info!(
            "Block {} sealed: hash={} nonce={} ({:.3}s)",
            block.index,
            block.hash,
            block.nonce,
            elapsed.as_secs_f64()
        );
        Ok(MineOutcome::Sealed(block))
    }

    /// Order-preserving copy of the full block sequence. Never blocks
    /// behind an in-progress search and never observes a half-appended
    /// block.
    pub fn chain_snapshot(&self) -> Vec<Block> {
        self.chain.read().blocks().to_vec()
    }

    pub fn pending_snapshot(&self) -> Vec<String> {
        self.chain.read().pending().to_vec()
    }

    pub fn tip(&self) -> Block {
        self.chain.read().tip().clone()
    }

    pub fn block_at(&self, index: u64) -> Option<Block> {
        self.chain.read().blocks().get(index as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.chain.read().blocks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.read().blocks().is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.chain.read().difficulty()
    }

    /// Full-chain audit, see [`Chain::validate`].
    pub fn validate(&self) -> Result<()> {
        self.chain.read().validate()
    }
}
