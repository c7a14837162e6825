//! Balanced order-statistics tree.
//!
//! ## Architecture
//!
//! The tree is an AVL tree augmented with a per-node left-subtree size:
//!
//! - **Slab-based storage**: nodes live in a pre-allocated slab, children are slab keys
//! - **Composite ordering**: elements are ordered by `(key, value)`
//! - **Order statistics**: rank, range count and range enumeration in O(log n)
//!
//! ## Components
//!
//! - [`TreeNode`]: One element plus its height and left-subtree size
//! - [`TieBreak`]: Value slot with `Lowest`/`Highest` virtual infinities
//! - [`OrderStatTree`]: The tree itself
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Insert / delete | O(log n) |
//! | Search by key | O(log n) |
//! | Rank | O(log n) |
//! | Range count | O(log n) |
//! | Range enumeration | O(log n + k) |
//!
//! ## Example
//!
//! ```
//! use stock_ledger::tree::{OrderStatTree, TieBreak};
//!
//! let mut by_price = OrderStatTree::with_capacity(16);
//! by_price.insert(105u64, String::from("ACME"));
//! by_price.insert(100u64, String::from("INIT"));
//! by_price.insert(105u64, String::from("BOLT"));
//!
//! let count = by_price
//!     .count_in_range(&100, &105, TieBreak::Lowest, TieBreak::Highest)
//!     .unwrap();
//! let ids = by_price
//!     .nodes_in_range(&100, &105, TieBreak::Lowest, TieBreak::Highest, count)
//!     .unwrap();
//!
//! assert_eq!(ids, vec!["INIT", "ACME", "BOLT"]);
//! ```

pub mod node;
pub mod tie_break;
pub mod avl;

pub use node::TreeNode;
pub use tie_break::TieBreak;
pub use avl::{Iter, OrderStatTree};
