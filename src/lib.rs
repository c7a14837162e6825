//! # Stock Ledger
//!
//! Stock price bookkeeping on top of an AVL order-statistics tree.
//!
//! ## Architecture
//!
//! - **Tree**: Balanced order-statistics tree with composite `(key, value)` ordering
//! - **Types**: Fixed-point prices, stock records, price updates
//! - **Ledger**: Dual index (by identifier, by price) over stock records
//!
//! ## Design Principles
//!
//! 1. **Exact arithmetic**: Prices are fixed-point (10^8 scaling), never floats
//! 2. **Logarithmic queries**: Rank and range counts never scan the tree
//! 3. **Slab storage**: Nodes and stocks live in pre-allocated slabs
//! 4. **Synchronous execution**: Single-threaded, `&mut self` for every mutation

// ============================================================================
// Module declarations
// ============================================================================

/// Balanced order-statistics tree
pub mod tree;

/// Core data types: Price, Stock, PriceUpdate
pub mod types;

/// Stock ledger: dual-indexed stock records
pub mod ledger;

/// Error types
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use error::{LedgerError, TreeError};
pub use ledger::StockManager;
pub use tree::{OrderStatTree, TieBreak};
pub use types::{Price, PriceUpdate, Stock, StockId};
