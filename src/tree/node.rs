//! Tree node for slab-based storage.
//!
//! ## Design
//!
//! `TreeNode` holds one element of the tree plus the two augmentations the
//! engine maintains: the AVL `height` and the `left_size` counter used for
//! order-statistics queries.
//!
//! ## Slab Integration
//!
//! Per official slab docs (https://docs.rs/slab/0.4.11):
//! - Keys are `usize` values returned by `slab.insert()`
//! - Keys may be reused after `slab.remove()`
//! - O(1) insert, remove, and lookup
//!
//! Child links are slab keys. Every node is referenced by exactly one parent
//! link (or by the tree root), so a subtree is exclusively owned by its parent.

use crate::tree::TieBreak;

/// Node stored in the tree's slab.
///
/// ## Layout
///
/// ```text
/// TreeNode {
///     key, value        composite ordering position
///     height            1 for a leaf
///     left_size         number of elements in the left subtree
///     left, right       Option<usize> slab keys
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TreeNode<K, V> {
    /// Primary ordering key
    pub key: K,

    /// Tie-break payload (a marker only while a range count is running)
    pub value: TieBreak<V>,

    /// Height of the subtree rooted here (leaf = 1)
    pub height: u32,

    /// Element count of the left subtree
    pub left_size: usize,

    /// Left child (slab key)
    pub left: Option<usize>,

    /// Right child (slab key)
    pub right: Option<usize>,
}

impl<K, V> TreeNode<K, V> {
    /// Create a new leaf node (not yet linked)
    ///
    /// # Example
    ///
    /// ```
    /// use stock_ledger::tree::{TieBreak, TreeNode};
    ///
    /// let node = TreeNode::new(10u64, TieBreak::Value("ACME"));
    ///
    /// assert!(node.is_leaf());
    /// assert_eq!(node.height, 1);
    /// assert_eq!(node.left_size, 0);
    /// ```
    #[inline]
    pub fn new(key: K, value: TieBreak<V>) -> Self {
        Self {
            key,
            value,
            height: 1,
            left_size: 0,
            left: None,
            right: None,
        }
    }

    /// Check if this node has no children
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Get the real payload (None for a range marker)
    #[inline]
    pub fn payload(&self) -> Option<&V> {
        self.value.as_value()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_node_new() {
        let node = TreeNode::new(42u64, TieBreak::Value(7u64));

        assert_eq!(node.key, 42);
        assert_eq!(node.payload(), Some(&7));
        assert_eq!(node.height, 1);
        assert_eq!(node.left_size, 0);
        assert!(node.is_leaf());
    }

    #[test]
    fn test_tree_node_marker_payload() {
        let node: TreeNode<u64, u64> = TreeNode::new(1, TieBreak::Highest);
        assert!(node.payload().is_none());
    }

    #[test]
    fn test_tree_node_linking() {
        let mut node = TreeNode::new(1u64, TieBreak::Value(1u64));

        assert!(node.is_leaf());

        node.left = Some(3);
        assert!(!node.is_leaf());

        node.right = Some(4);
        assert!(!node.is_leaf());

        // Only one link
        node.left = None;
        assert!(!node.is_leaf());
    }
}
