//! Tie-break slot with virtual infinities.
//!
//! ## Design
//!
//! Every element in the tree is ordered by `(key, value)`. Range counting
//! needs boundary elements that sit *before* or *after* every real value
//! sharing a key, without inventing a real value that happens to compare
//! that way. `TieBreak` provides exactly that:
//!
//! ```text
//! Lowest  <  Value(v) for every v  <  Highest
//! ```
//!
//! Only `TieBreak::Value` is ever stored by public insertion. The markers live
//! in the tree only for the duration of a range count.

use std::cmp::Ordering;

/// The value half of a composite `(key, value)` position.
///
/// The derived ordering follows declaration order, so `Lowest` compares below
/// and `Highest` above every `Value`.
///
/// ## Example
///
/// ```
/// use stock_ledger::tree::TieBreak;
///
/// assert!(TieBreak::Lowest < TieBreak::Value(0));
/// assert!(TieBreak::Value(u64::MAX) < TieBreak::Highest);
/// assert!(TieBreak::Value(1) < TieBreak::Value(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TieBreak<V> {
    /// Compares below every real value.
    Lowest,
    /// A real value.
    Value(V),
    /// Compares above every real value.
    Highest,
}

impl<V> TieBreak<V> {
    /// Borrow the inner value, if any.
    #[inline]
    pub fn as_ref(&self) -> TieBreak<&V> {
        match self {
            TieBreak::Lowest => TieBreak::Lowest,
            TieBreak::Value(v) => TieBreak::Value(v),
            TieBreak::Highest => TieBreak::Highest,
        }
    }

    /// The real value, or `None` for a marker.
    #[inline]
    pub fn as_value(&self) -> Option<&V> {
        match self {
            TieBreak::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Check if this is one of the two markers
    #[inline]
    pub fn is_marker(&self) -> bool {
        !matches!(self, TieBreak::Value(_))
    }
}

impl<V: Clone> TieBreak<&V> {
    /// Clone the borrowed value into an owned slot.
    pub fn cloned(self) -> TieBreak<V> {
        match self {
            TieBreak::Lowest => TieBreak::Lowest,
            TieBreak::Value(v) => TieBreak::Value(v.clone()),
            TieBreak::Highest => TieBreak::Highest,
        }
    }
}

impl<V> From<V> for TieBreak<V> {
    fn from(value: V) -> Self {
        TieBreak::Value(value)
    }
}

/// Compare two composite positions lexicographically: key first, then the
/// tie-break slot.
#[inline]
pub(crate) fn cmp_composite<K: Ord, V: Ord>(
    key: &K,
    value: TieBreak<&V>,
    other_key: &K,
    other_value: TieBreak<&V>,
) -> Ordering {
    key.cmp(other_key).then_with(|| value.cmp(&other_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_ordering() {
        let values = [TieBreak::Value(i64::MIN), TieBreak::Value(0), TieBreak::Value(i64::MAX)];
        for v in values {
            assert!(TieBreak::Lowest < v);
            assert!(v < TieBreak::Highest);
        }
        assert!(TieBreak::<i64>::Lowest < TieBreak::Highest);
    }

    #[test]
    fn test_as_value() {
        assert_eq!(TieBreak::Value(5).as_value(), Some(&5));
        assert_eq!(TieBreak::<u8>::Lowest.as_value(), None);
        assert!(TieBreak::<u8>::Highest.is_marker());
        assert!(!TieBreak::Value(1u8).is_marker());
    }

    #[test]
    fn test_cloned_roundtrip() {
        let owned = TieBreak::Value(String::from("ACME"));
        assert_eq!(owned.as_ref().cloned(), owned);
    }

    #[test]
    fn test_cmp_composite_key_first() {
        // Key decides before the tie-break slot is consulted
        assert_eq!(
            cmp_composite(&1, TieBreak::Highest, &2, TieBreak::<&u8>::Lowest),
            Ordering::Less
        );
        assert_eq!(
            cmp_composite(&2, TieBreak::Value(&1u8), &2, TieBreak::Value(&9u8)),
            Ordering::Less
        );
        assert_eq!(
            cmp_composite(&2, TieBreak::Value(&1u8), &2, TieBreak::Value(&1u8)),
            Ordering::Equal
        );
    }
}
