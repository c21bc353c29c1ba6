//! Error types for forgechain

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// The candidate was built against a tip that has since moved; the
    /// caller should stage a fresh candidate and retry the cycle.
    #[error("stale candidate: {0}")]
    LinkageMismatch(String),

    /// The solved hash failed re-validation against the block's own fields
    /// or the difficulty target. Unreachable with a correct solver; treated
    /// as a logic fault, not retried.
    #[error("invalid proof of work: {0}")]
    ProofInvalid(String),

    #[error("difficulty {0} out of range (1..=64 leading zero hex digits)")]
    InvalidDifficulty(u32),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
