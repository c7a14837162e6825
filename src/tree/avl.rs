//! AVL order-statistics tree.
//!
//! ## Architecture
//!
//! The tree keeps its nodes in a [`Slab`] and links them by slab key:
//!
//! - **Balancing engine**: recursive insert/delete that rebalance on the way
//!   back up with the four classic AVL rotation cases
//! - **Order statistics**: every node counts the elements of its left subtree,
//!   so rank and range-count queries run in O(log n)
//!
//! ## Ordering
//!
//! Elements are ordered by the composite `(key, value)`: key first, value as
//! tie-break. Several elements may share a key as long as their values differ.
//! The value's `Ord` is therefore part of the tree's correctness, not just
//! payload metadata.
//!
//! ## Example
//!
//! ```
//! use stock_ledger::tree::{OrderStatTree, TieBreak};
//!
//! let mut tree = OrderStatTree::new();
//! tree.insert(30u64, "c");
//! tree.insert(10u64, "a");
//! tree.insert(20u64, "b");
//!
//! assert_eq!(tree.rank(&20, &"b"), Ok(1));
//! assert_eq!(tree.min_key(), Some(&10));
//!
//! let count = tree
//!     .count_in_range(&10, &20, TieBreak::Lowest, TieBreak::Highest)
//!     .unwrap();
//! assert_eq!(count, 2);
//! ```

use std::cmp::Ordering;
use std::fmt::Display;

use slab::Slab;

use crate::error::TreeError;
use crate::tree::tie_break::cmp_composite;
use crate::tree::{TieBreak, TreeNode};

/// Composite position used by range queries: `(key, tie-break)`.
type Position<'a, K, V> = (&'a K, TieBreak<&'a V>);

/// Balanced order-statistics tree.
///
/// All mutators take `&mut self`, including the range counts, which insert
/// and remove boundary elements while they run.
#[derive(Debug, Clone)]
pub struct OrderStatTree<K, V> {
    /// Node storage
    nodes: Slab<TreeNode<K, V>>,

    /// Slab key of the root node
    root: Option<usize>,
}

impl<K, V> Default for OrderStatTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OrderStatTree<K, V> {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
        }
    }

    /// Create a tree with pre-allocated node capacity
    ///
    /// # Example
    ///
    /// ```
    /// use stock_ledger::tree::OrderStatTree;
    ///
    /// let tree: OrderStatTree<u64, u64> = OrderStatTree::with_capacity(1_000);
    /// assert!(tree.capacity() >= 1_000);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            root: None,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    /// Get the current capacity (pre-allocated node slots)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree (0 when empty)
    #[inline]
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Remove every element
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// In-order iterator over `(key, value)` pairs.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_left(self.root);
        iter
    }

    // ========================================================================
    // Min / Max
    // ========================================================================

    /// Smallest key, or `None` on an empty tree
    pub fn min_key(&self) -> Option<&K> {
        self.leftmost().map(|idx| &self.nodes[idx].key)
    }

    /// Largest key, or `None` on an empty tree
    pub fn max_key(&self) -> Option<&K> {
        let mut idx = self.root?;
        while let Some(right) = self.nodes[idx].right {
            idx = right;
        }
        Some(&self.nodes[idx].key)
    }

    /// Payload of the smallest element, or `None` on an empty tree
    pub fn min_value(&self) -> Option<&V> {
        self.leftmost().and_then(|idx| self.nodes[idx].payload())
    }

    fn leftmost(&self) -> Option<usize> {
        let mut idx = self.root?;
        while let Some(left) = self.nodes[idx].left {
            idx = left;
        }
        Some(idx)
    }

    // ========================================================================
    // Structural helpers
    // ========================================================================

    #[inline]
    fn height_of(&self, link: Option<usize>) -> u32 {
        link.map_or(0, |idx| self.nodes[idx].height)
    }

    fn update_height(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[idx].height = height;
    }

    /// `height(right) - height(left)`
    fn balance_factor(&self, idx: usize) -> i64 {
        let node = &self.nodes[idx];
        i64::from(self.height_of(node.right)) - i64::from(self.height_of(node.left))
    }

    /// Rotate `idx` down to the left; its right child becomes the subtree root.
    fn rotate_left(&mut self, idx: usize) -> usize {
        let Some(pivot) = self.nodes[idx].right else {
            return idx;
        };
        let inner = self.nodes[pivot].left;

        self.nodes[idx].right = inner;
        self.nodes[pivot].left = Some(idx);

        self.update_height(idx);
        self.update_height(pivot);

        // The pivot's left subtree is now `idx` with everything under it
        let absorbed = self.nodes[idx].left_size + 1;
        self.nodes[pivot].left_size += absorbed;

        pivot
    }

    /// Rotate `idx` down to the right; its left child becomes the subtree root.
    fn rotate_right(&mut self, idx: usize) -> usize {
        let Some(pivot) = self.nodes[idx].left else {
            return idx;
        };
        let inner = self.nodes[pivot].right;

        self.nodes[idx].left = inner;
        self.nodes[pivot].right = Some(idx);

        // `idx` keeps only the pivot's former right subtree on its left
        let released = self.nodes[pivot].left_size + 1;
        self.nodes[idx].left_size -= released;

        self.update_height(idx);
        self.update_height(pivot);

        pivot
    }

    /// Recompute the height of `idx` and restore its balance.
    ///
    /// Returns the slab key of the node now rooting this subtree.
    fn rebalance(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let balance = self.balance_factor(idx);

        if balance > 1 {
            // Right-left case
            if let Some(right) = self.nodes[idx].right {
                if self.balance_factor(right) < 0 {
                    let pivot = self.rotate_right(right);
                    self.nodes[idx].right = Some(pivot);
                }
            }
            return self.rotate_left(idx);
        }

        if balance < -1 {
            // Left-right case
            if let Some(left) = self.nodes[idx].left {
                if self.balance_factor(left) > 0 {
                    let pivot = self.rotate_left(left);
                    self.nodes[idx].left = Some(pivot);
                }
            }
            return self.rotate_right(idx);
        }

        idx
    }

    /// Unlink the leftmost node of the subtree at `idx`.
    ///
    /// Returns the new subtree root and the slab key of the detached node.
    fn detach_min(&mut self, idx: usize) -> (Option<usize>, usize) {
        match self.nodes[idx].left {
            None => (self.nodes[idx].right, idx),
            Some(left) => {
                let (child, min) = self.detach_min(left);
                let node = &mut self.nodes[idx];
                node.left = child;
                node.left_size -= 1;
                (Some(self.rebalance(idx)), min)
            }
        }
    }
}

impl<K: Ord, V: Ord> OrderStatTree<K, V> {
    // ========================================================================
    // Balancing engine
    // ========================================================================

    /// Insert a `(key, value)` element.
    ///
    /// Idempotent: if an equal pair is already stored the tree is unchanged.
    ///
    /// # Returns
    ///
    /// `true` if a new element was created
    ///
    /// # Example
    ///
    /// ```
    /// use stock_ledger::tree::OrderStatTree;
    ///
    /// let mut tree = OrderStatTree::new();
    /// assert!(tree.insert(1u64, 'a'));
    /// assert!(tree.insert(1u64, 'b')); // same key, different value
    /// assert!(!tree.insert(1u64, 'a'));
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_entry(key, TieBreak::Value(value))
    }

    /// Remove the element equal to `(key, value)`.
    ///
    /// A miss is a silent no-op.
    ///
    /// # Returns
    ///
    /// `true` if an element was removed
    pub fn delete(&mut self, key: &K, value: &V) -> bool {
        self.delete_entry(key, TieBreak::Value(value))
    }

    /// Check if an element equal to `(key, value)` is stored
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.find(key, TieBreak::Value(value)).is_some()
    }

    fn insert_entry(&mut self, key: K, value: TieBreak<V>) -> bool {
        let (root, inserted) = self.insert_at(self.root, key, value);
        self.root = Some(root);
        inserted
    }

    fn delete_entry(&mut self, key: &K, value: TieBreak<&V>) -> bool {
        let (root, removed) = self.delete_at(self.root, key, value);
        self.root = root;
        removed
    }

    fn insert_at(&mut self, link: Option<usize>, key: K, value: TieBreak<V>) -> (usize, bool) {
        let Some(idx) = link else {
            return (self.nodes.insert(TreeNode::new(key, value)), true);
        };

        let node = &self.nodes[idx];
        let ordering = cmp_composite(&key, value.as_ref(), &node.key, node.value.as_ref());
        let (left, right) = (node.left, node.right);

        let inserted = match ordering {
            Ordering::Less => {
                let (child, inserted) = self.insert_at(left, key, value);
                let node = &mut self.nodes[idx];
                node.left = Some(child);
                if inserted {
                    node.left_size += 1;
                }
                inserted
            }
            Ordering::Greater => {
                let (child, inserted) = self.insert_at(right, key, value);
                self.nodes[idx].right = Some(child);
                inserted
            }
            Ordering::Equal => false,
        };

        if !inserted {
            return (idx, false);
        }
        (self.rebalance(idx), true)
    }

    fn delete_at(
        &mut self,
        link: Option<usize>,
        key: &K,
        value: TieBreak<&V>,
    ) -> (Option<usize>, bool) {
        let Some(idx) = link else {
            return (None, false);
        };

        let node = &self.nodes[idx];
        let ordering = cmp_composite(key, value, &node.key, node.value.as_ref());
        let (left, right) = (node.left, node.right);

        match ordering {
            Ordering::Less => {
                let (child, removed) = self.delete_at(left, key, value);
                let node = &mut self.nodes[idx];
                node.left = child;
                if !removed {
                    return (Some(idx), false);
                }
                node.left_size -= 1;
            }
            Ordering::Greater => {
                let (child, removed) = self.delete_at(right, key, value);
                self.nodes[idx].right = child;
                if !removed {
                    return (Some(idx), false);
                }
            }
            Ordering::Equal => match (left, right) {
                (None, child) | (child, None) => {
                    self.nodes.remove(idx);
                    return (child, true);
                }
                (Some(_), Some(right)) => {
                    // Overwrite with the in-order successor, then drop its node
                    let (child, min) = self.detach_min(right);
                    let successor = self.nodes.remove(min);
                    let node = &mut self.nodes[idx];
                    node.key = successor.key;
                    node.value = successor.value;
                    node.right = child;
                }
            },
        }

        (Some(self.rebalance(idx)), true)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Find a payload by key alone.
    ///
    /// The descent compares keys only, not the composite order. Callers must
    /// keep keys unique for the keys they search; with several elements under
    /// one key the result is whichever of them the key-only path meets first.
    ///
    /// # Example
    ///
    /// ```
    /// use stock_ledger::tree::OrderStatTree;
    ///
    /// let mut tree = OrderStatTree::new();
    /// tree.insert("ACME", 1u64);
    ///
    /// assert_eq!(tree.search(&"ACME"), Some(&1));
    /// assert_eq!(tree.search(&"NOPE"), None);
    /// ```
    pub fn search(&self, key: &K) -> Option<&V> {
        let mut link = self.root;
        while let Some(idx) = link {
            let node = &self.nodes[idx];
            match key.cmp(&node.key) {
                Ordering::Less => link = node.left,
                Ordering::Greater => link = node.right,
                Ordering::Equal => return node.payload(),
            }
        }
        None
    }

    fn find(&self, key: &K, value: TieBreak<&V>) -> Option<usize> {
        let mut link = self.root;
        while let Some(idx) = link {
            let node = &self.nodes[idx];
            match cmp_composite(key, value, &node.key, node.value.as_ref()) {
                Ordering::Less => link = node.left,
                Ordering::Greater => link = node.right,
                Ordering::Equal => return Some(idx),
            }
        }
        None
    }

    // ========================================================================
    // Order statistics
    // ========================================================================

    /// Number of elements strictly less than `(key, value)`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotPresent`] if the exact pair is not stored.
    pub fn rank(&self, key: &K, value: &V) -> Result<usize, TreeError> {
        self.rank_of(key, TieBreak::Value(value))
    }

    fn rank_of(&self, key: &K, value: TieBreak<&V>) -> Result<usize, TreeError> {
        let mut link = self.root;
        let mut rank = 0;
        while let Some(idx) = link {
            let node = &self.nodes[idx];
            match cmp_composite(key, value, &node.key, node.value.as_ref()) {
                Ordering::Equal => return Ok(rank + node.left_size),
                Ordering::Less => link = node.left,
                Ordering::Greater => {
                    rank += node.left_size + 1;
                    link = node.right;
                }
            }
        }
        Err(TreeError::NotPresent)
    }

    /// Count the elements in `[(low_key, low_value), (high_key, high_value)]`.
    ///
    /// Both bounds are inserted as boundary elements, the count is the rank
    /// difference between them, and the boundaries are removed again. A bound
    /// that equals a stored element is left alone (it is counted, and it is
    /// not removed afterwards). Reversed bounds count zero.
    ///
    /// # Example
    ///
    /// ```
    /// use stock_ledger::tree::{OrderStatTree, TieBreak};
    ///
    /// let mut tree = OrderStatTree::new();
    /// for (price, id) in [(10u64, "a"), (20, "b"), (20, "c"), (30, "d")] {
    ///     tree.insert(price, id);
    /// }
    ///
    /// let n = tree.count_in_range(&20, &30, TieBreak::Lowest, TieBreak::Highest).unwrap();
    /// assert_eq!(n, 3);
    /// assert_eq!(tree.len(), 4);
    /// ```
    pub fn count_in_range(
        &mut self,
        low_key: &K,
        high_key: &K,
        low_value: TieBreak<&V>,
        high_value: TieBreak<&V>,
    ) -> Result<usize, TreeError>
    where
        K: Clone,
        V: Clone,
    {
        match cmp_composite(low_key, low_value, high_key, high_value) {
            Ordering::Greater => return Ok(0),
            Ordering::Equal => return Ok(usize::from(self.find(low_key, low_value).is_some())),
            Ordering::Less => {}
        }

        let low_fresh = self.insert_entry(low_key.clone(), low_value.cloned());
        let high_fresh = self.insert_entry(high_key.clone(), high_value.cloned());

        let upper = self.rank_of(high_key, high_value);
        let lower = self.rank_of(low_key, low_value);

        if low_fresh {
            self.delete_entry(low_key, low_value);
        }
        if high_fresh {
            self.delete_entry(high_key, high_value);
        }

        // upper counts the lower boundary when it was inserted; a stored
        // upper bound is part of the range
        Ok(upper? + usize::from(!high_fresh) - lower? - usize::from(low_fresh))
    }

    /// Count the elements in `[(low_key, low_value), (high_key, high_value)]`
    /// when the lower bound is a stored element.
    ///
    /// Only the upper bound is inserted as a boundary element.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotPresent`] if `(low_key, low_value)` is not stored.
    pub fn count_in_range_special(
        &mut self,
        low_key: &K,
        high_key: &K,
        low_value: &V,
        high_value: TieBreak<&V>,
    ) -> Result<usize, TreeError>
    where
        K: Clone,
        V: Clone,
    {
        let low_value = TieBreak::Value(low_value);
        self.rank_of(low_key, low_value)?;

        match cmp_composite(low_key, low_value, high_key, high_value) {
            Ordering::Greater => return Ok(0),
            Ordering::Equal => return Ok(1),
            Ordering::Less => {}
        }

        let high_fresh = self.insert_entry(high_key.clone(), high_value.cloned());

        let upper = self.rank_of(high_key, high_value);
        let lower = self.rank_of(low_key, low_value);

        if high_fresh {
            self.delete_entry(high_key, high_value);
        }

        Ok(upper? + usize::from(!high_fresh) - lower?)
    }

    /// Payloads of the elements in the inclusive composite range, ascending.
    ///
    /// Subtrees that cannot hold a bound are pruned, so the cost is
    /// O(log n + k) for k matches.
    pub fn values_in_range<'a>(
        &'a self,
        low_key: &K,
        high_key: &K,
        low_value: TieBreak<&V>,
        high_value: TieBreak<&V>,
    ) -> Vec<&'a V> {
        let mut out = Vec::new();
        self.collect_range(self.root, (low_key, low_value), (high_key, high_value), &mut out);
        out
    }

    /// String representations of the payloads in the inclusive composite
    /// range, ascending.
    ///
    /// `size` is the count obtained from [`count_in_range`](Self::count_in_range)
    /// for the same bounds.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeSizeMismatch`] if the range does not hold exactly
    /// `size` elements.
    pub fn nodes_in_range(
        &self,
        low_key: &K,
        high_key: &K,
        low_value: TieBreak<&V>,
        high_value: TieBreak<&V>,
        size: usize,
    ) -> Result<Vec<String>, TreeError>
    where
        V: Display,
    {
        let values = self.values_in_range(low_key, high_key, low_value, high_value);
        if values.len() != size {
            return Err(TreeError::RangeSizeMismatch {
                expected: size,
                found: values.len(),
            });
        }

        let mut result = Vec::with_capacity(size);
        result.extend(values.into_iter().map(ToString::to_string));
        Ok(result)
    }

    fn collect_range<'a>(
        &'a self,
        link: Option<usize>,
        low: Position<'_, K, V>,
        high: Position<'_, K, V>,
        out: &mut Vec<&'a V>,
    ) {
        let Some(idx) = link else {
            return;
        };
        let node = &self.nodes[idx];
        let here = node.value.as_ref();

        let above_low = cmp_composite(&node.key, here, low.0, low.1) != Ordering::Less;
        let below_high = cmp_composite(&node.key, here, high.0, high.1) != Ordering::Greater;

        if above_low {
            self.collect_range(node.left, low, high, out);
        }
        if above_low && below_high {
            if let Some(value) = node.payload() {
                out.push(value);
            }
        }
        if below_high {
            self.collect_range(node.right, low, high, out);
        }
    }

    // ========================================================================
    // Invariant checking
    // ========================================================================

    /// Walk the whole tree and check every structural invariant.
    ///
    /// # Errors
    ///
    /// [`TreeError::Invariant`] describing the first violation found.
    pub fn validate(&self) -> Result<(), TreeError> {
        let (_, size) = self.validate_at(self.root, None, None)?;
        if size != self.nodes.len() {
            return Err(TreeError::Invariant(format!(
                "{} nodes stored but {} reachable from the root",
                self.nodes.len(),
                size
            )));
        }
        Ok(())
    }

    fn validate_at<'a>(
        &'a self,
        link: Option<usize>,
        low: Option<Position<'a, K, V>>,
        high: Option<Position<'a, K, V>>,
    ) -> Result<(u32, usize), TreeError> {
        let Some(idx) = link else {
            return Ok((0, 0));
        };
        let node = self
            .nodes
            .get(idx)
            .ok_or_else(|| TreeError::Invariant(format!("dangling link to slot {idx}")))?;

        if node.value.is_marker() {
            return Err(TreeError::Invariant(format!("range marker left at slot {idx}")));
        }

        let here = (&node.key, node.value.as_ref());
        if let Some((key, value)) = low {
            if cmp_composite(here.0, here.1, key, value) != Ordering::Greater {
                return Err(TreeError::Invariant(format!("slot {idx} is out of order")));
            }
        }
        if let Some((key, value)) = high {
            if cmp_composite(here.0, here.1, key, value) != Ordering::Less {
                return Err(TreeError::Invariant(format!("slot {idx} is out of order")));
            }
        }

        let (left_height, left_size) = self.validate_at(node.left, low, Some(here))?;
        let (right_height, right_size) = self.validate_at(node.right, Some(here), high)?;

        if node.left_size != left_size {
            return Err(TreeError::Invariant(format!(
                "slot {idx}: left_size is {} but the left subtree holds {left_size}",
                node.left_size
            )));
        }
        if node.height != 1 + left_height.max(right_height) {
            return Err(TreeError::Invariant(format!(
                "slot {idx}: height is {} but children have {left_height} and {right_height}",
                node.height
            )));
        }
        if left_height.abs_diff(right_height) > 1 {
            return Err(TreeError::Invariant(format!(
                "slot {idx}: unbalanced ({left_height} vs {right_height})"
            )));
        }

        Ok((node.height, left_size + right_size + 1))
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// In-order iterator over a tree, driven by an explicit stack.
pub struct Iter<'a, K, V> {
    tree: &'a OrderStatTree<K, V>,
    stack: Vec<usize>,
}

impl<K, V> Iter<'_, K, V> {
    fn push_left(&mut self, mut link: Option<usize>) {
        while let Some(idx) = link {
            self.stack.push(idx);
            link = self.tree.nodes[idx].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while let Some(idx) = self.stack.pop() {
            let node = &tree.nodes[idx];
            self.push_left(node.right);
            if let Some(value) = node.payload() {
                return Some((&node.key, value));
            }
        }
        None
    }
}

impl<'a, K, V> IntoIterator for &'a OrderStatTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
