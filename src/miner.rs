//! Proof-of-work search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::block::CandidateBlock;
use crate::hasher::BlockHash;

/// Shared flag a caller raises to abort an in-progress search. Cloning
/// yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        StopSignal(Arc::new(AtomicBool::new(false)))
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// The candidate's nonce now satisfies the target; the winning hash is
    /// attached.
    Solved(BlockHash),
    /// The stop signal fired before a winning nonce was found.
    Cancelled,
}

/// Search for a nonce whose hash carries `difficulty` leading zero hex
/// characters.
///
/// The nonce is reset to 0 before the search, whatever the candidate held,
/// so the winning pair is a pure function of the remaining fields: two runs
/// over identical input always return the same nonce and hash. The stop
/// flag is checked before every hash, so a signal raised ahead of the call
/// cancels without computing a single digest. The search is otherwise
/// unbounded.
pub fn solve(candidate: &mut CandidateBlock, difficulty: u32, stop: &StopSignal) -> SolveStatus {
    candidate.nonce = 0;
    loop {
        if stop.stop_requested() {
            return SolveStatus::Cancelled;
        }
        let hash = candidate.compute_hash();
        if hash.satisfies_difficulty(difficulty) {
            return SolveStatus::Solved(hash);
        }
        candidate.nonce = candidate.nonce.wrapping_add(1);
    }
}
