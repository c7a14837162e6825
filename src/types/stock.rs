//! Stock records.
//!
//! ## Design
//!
//! A `Stock` owns its own price history as an [`OrderStatTree`] keyed by
//! update timestamp. The current price is always the initial price plus the
//! deltas of every update still in the history.

use std::fmt;

use crate::error::LedgerError;
use crate::tree::OrderStatTree;
use crate::types::{Price, PriceUpdate};

/// Stock identifier.
///
/// Orders lexicographically by its string. This order is the tie-break in the
/// price index, so two stocks at the same price are listed by identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StockId(String);

impl StockId {
    pub fn new(id: impl Into<String>) -> Self {
        StockId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StockId {
    fn from(id: &str) -> Self {
        StockId(id.to_string())
    }
}

impl From<String> for StockId {
    fn from(id: String) -> Self {
        StockId(id)
    }
}

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A tradable instrument with its current price and update history.
///
/// ## Example
///
/// ```
/// use stock_ledger::types::{Price, Stock, StockId};
///
/// let mut stock = Stock::new(StockId::from("ACME"), Price::from_raw(1_000), 0);
/// let price = stock.apply_update(10, Price::from_raw(-250)).unwrap();
///
/// assert_eq!(price, Price::from_raw(750));
/// assert_eq!(stock.update_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Stock {
    id: StockId,
    price: Price,
    created_at: u64,
    updates: OrderStatTree<u64, PriceUpdate>,
}

impl Stock {
    pub fn new(id: StockId, price: Price, created_at: u64) -> Self {
        Self {
            id,
            price,
            created_at,
            updates: OrderStatTree::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &StockId {
        &self.id
    }

    /// Current price
    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Timestamp the stock was added at
    #[inline]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Update history, keyed by timestamp
    #[inline]
    pub fn updates(&self) -> &OrderStatTree<u64, PriceUpdate> {
        &self.updates
    }

    #[inline]
    pub fn update_count(&self) -> usize {
        self.updates.len()
    }

    /// Updates in timestamp order
    pub fn history(&self) -> Vec<PriceUpdate> {
        self.updates.iter().map(|(_, update)| *update).collect()
    }

    /// Record an update and apply its delta.
    ///
    /// # Returns
    ///
    /// The new price
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DuplicateUpdate`] if the timestamp is already recorded
    /// - [`LedgerError::PriceOverflow`] if the new price does not fit
    pub fn apply_update(&mut self, timestamp: u64, delta: Price) -> Result<Price, LedgerError> {
        if self.updates.search(&timestamp).is_some() {
            return Err(LedgerError::DuplicateUpdate {
                id: self.id.to_string(),
                timestamp,
            });
        }
        let price = self.price.checked_add(delta).ok_or(LedgerError::PriceOverflow)?;

        self.updates.insert(timestamp, PriceUpdate::new(timestamp, delta));
        self.price = price;
        Ok(price)
    }

    /// Drop the update recorded at `timestamp` and revert its delta.
    ///
    /// # Returns
    ///
    /// The removed update
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UpdateNotFound`] if no update has that timestamp
    /// - [`LedgerError::PriceOverflow`] if the reverted price does not fit
    pub fn revert_update(&mut self, timestamp: u64) -> Result<PriceUpdate, LedgerError> {
        let update = *self
            .updates
            .search(&timestamp)
            .ok_or_else(|| LedgerError::UpdateNotFound {
                id: self.id.to_string(),
                timestamp,
            })?;
        let price = self.price.checked_sub(update.delta).ok_or(LedgerError::PriceOverflow)?;

        self.updates.delete(&timestamp, &update);
        self.price = price;
        Ok(update)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
