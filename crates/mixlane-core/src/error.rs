//! # Core Error Types
//!
//! Errors produced by the foundational types themselves. Domain-level
//! error taxonomies (state transitions, payment gating) live in their
//! own crates; this is only what can go wrong constructing a primitive.

use thiserror::Error;

/// Errors from constructing core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timestamp string was malformed or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An amount computation overflowed.
    #[error("amount overflow: {0}")]
    AmountOverflow(String),
}
