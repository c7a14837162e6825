//! Price update records kept in each stock's history.

use std::fmt;

use crate::types::Price;

/// A single price change applied to a stock.
///
/// ## Ordering
///
/// Updates order by `timestamp` first, then by `delta`. A stock's history is
/// keyed by timestamp and never holds two updates with the same timestamp, so
/// in practice the timestamp alone identifies an update.
///
/// ## Example
///
/// ```
/// use stock_ledger::types::{Price, PriceUpdate};
///
/// let update = PriceUpdate::new(1_703_577_600_000, "-2.5".parse::<Price>().unwrap());
/// assert_eq!(update.to_string(), "1703577600000:-2.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriceUpdate {
    /// Unix timestamp in milliseconds
    pub timestamp: u64,

    /// Signed price change
    pub delta: Price,
}

impl PriceUpdate {
    pub fn new(timestamp: u64, delta: Price) -> Self {
        Self { timestamp, delta }
    }
}

impl fmt::Display for PriceUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.timestamp, self.delta)
    }
}
