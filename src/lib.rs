//! forgechain - An append-only proof-of-work ledger
//!
//! Blocks batch opaque payloads and link to their predecessor by SHA-256
//! hash; a block is admitted only once a nonce is found whose hash clears
//! the configured number of leading zero hex characters.
//!
//! # Architecture
//!
//! ## Ledger Core
//! - [`hasher`] - Canonical block hashing and the difficulty predicate
//! - [`block`] - Candidate and sealed block types
//! - [`miner`] - The cancellable nonce search
//! - [`chain`] - Block sequence, pending pool, admission and audit
//! - [`ledger`] - Thread-safe facade wrapping a chain
//!
//! ## Integration
//! - [`api`] - REST server over the facade (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Ledger Core
// ============================================================================
pub mod block;
pub mod chain;
pub mod hasher;
pub mod ledger;
pub mod miner;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
