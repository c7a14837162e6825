//! Error types for the tree engine and the stock ledger.
//!
//! ## Categories
//!
//! - **Caller-contract violations** ([`TreeError::NotPresent`],
//!   [`TreeError::RangeSizeMismatch`]): the caller asked for something the
//!   engine's contract rules out.
//! - **Expected misses** are not errors: `search` returns `Option`, `delete`
//!   returns `false`.
//! - **Structural violations** ([`TreeError::Invariant`]) are only ever
//!   reported by [`OrderStatTree::validate`](crate::tree::OrderStatTree::validate).
//!   Seeing one means the engine has a bug.

use thiserror::Error;

use crate::types::Price;

/// Errors raised by [`OrderStatTree`](crate::tree::OrderStatTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The queried `(key, value)` pair is not stored in the tree.
    #[error("no element with the requested (key, value) pair")]
    NotPresent,

    /// `nodes_in_range` was handed a size that does not match the range.
    #[error("range holds {found} elements but {expected} were requested")]
    RangeSizeMismatch { expected: usize, found: usize },

    /// A balance, height, size or ordering invariant does not hold.
    #[error("tree invariant violated: {0}")]
    Invariant(String),
}

/// Errors raised by [`StockManager`](crate::ledger::StockManager).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("stock {0} already exists")]
    StockExists(String),

    #[error("stock {0} does not exist")]
    StockNotFound(String),

    #[error("initial price must be positive, got {0}")]
    NonPositivePrice(Price),

    #[error("price change must be non-zero")]
    ZeroPriceChange,

    #[error("stock {id} already has an update at timestamp {timestamp}")]
    DuplicateUpdate { id: String, timestamp: u64 },

    #[error("stock {id} has no update at timestamp {timestamp}")]
    UpdateNotFound { id: String, timestamp: u64 },

    #[error("price arithmetic overflowed")]
    PriceOverflow,

    #[error("invalid price literal: {0:?}")]
    InvalidPrice(String),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
