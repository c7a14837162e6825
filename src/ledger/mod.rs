//! Stock ledger built on two order-statistics trees.
//!
//! ## Components
//!
//! - [`StockManager`]: Stocks indexed by identifier and by price
//! - State root: SHA-256 digest of the ledger (see [`StockManager::state_root`])
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add / remove stock | O(log n) |
//! | Update price | O(log n + log h) |
//! | Count stocks in price range | O(log n) |
//! | List stocks in price range | O(log n + k) |
//!
//! h is the length of the stock's update history, k the number of matches.

pub mod manager;
mod snapshot;

pub use manager::StockManager;
