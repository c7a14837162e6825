//! Stock manager: a dual index over stock records.
//!
//! ## Architecture
//!
//! - **Slab**: Pre-allocated storage for [`Stock`] records
//! - **Id index**: `OrderStatTree<StockId, usize>` mapping identifier to slab key
//! - **Price index**: `OrderStatTree<Price, StockId>`, identifier as tie-break
//!
//! Every stock is present in both indexes exactly once. A price change removes
//! the stock from the price index under its old price and re-inserts it under
//! the new one.
//!
//! ## Example
//!
//! ```
//! use stock_ledger::ledger::StockManager;
//! use stock_ledger::types::Price;
//!
//! let mut manager = StockManager::with_capacity(16);
//! manager.add_stock("ACME", 0, "100".parse().unwrap()).unwrap();
//! manager.add_stock("BOLT", 0, "250".parse().unwrap()).unwrap();
//! manager.update_stock("ACME", 5, "-10".parse().unwrap()).unwrap();
//!
//! assert_eq!(manager.get_stock_price("ACME").unwrap().to_string(), "90");
//!
//! let ids = manager
//!     .get_stocks_in_price_range("50".parse().unwrap(), "200".parse().unwrap())
//!     .unwrap();
//! assert_eq!(ids, vec!["ACME"]);
//! ```

use slab::Slab;
use tracing::{debug, trace};

use crate::error::LedgerError;
use crate::tree::{OrderStatTree, TieBreak};
use crate::types::{Price, PriceUpdate, Stock, StockId};

/// Dual-indexed stock ledger.
#[derive(Debug, Default)]
pub struct StockManager {
    /// Stock storage
    stocks: Slab<Stock>,

    /// Identifier to slab key
    by_id: OrderStatTree<StockId, usize>,

    /// Price to identifier (identifier breaks ties)
    by_price: OrderStatTree<Price, StockId>,
}

impl StockManager {
    /// Create a new empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with pre-allocated capacity for `capacity` stocks
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stocks: Slab::with_capacity(capacity),
            by_id: OrderStatTree::with_capacity(capacity),
            by_price: OrderStatTree::with_capacity(capacity),
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    /// Number of stocks
    #[inline]
    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// Lowest and highest current price, `None` when empty
    pub fn price_bounds(&self) -> Option<(Price, Price)> {
        Some((*self.by_price.min_key()?, *self.by_price.max_key()?))
    }

    /// Stocks in identifier order
    pub fn stocks(&self) -> impl Iterator<Item = &Stock> + '_ {
        self.by_id.iter().map(move |(_, slot)| &self.stocks[*slot])
    }

    // ========================================================================
    // Stock management
    // ========================================================================

    /// Drop every stock.
    pub fn init_stocks(&mut self) {
        self.stocks.clear();
        self.by_id.clear();
        self.by_price.clear();
        debug!("ledger reset");
    }

    /// Add a new stock.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NonPositivePrice`] if `price <= 0`
    /// - [`LedgerError::StockExists`] if the identifier is taken
    pub fn add_stock(&mut self, id: &str, timestamp: u64, price: Price) -> Result<(), LedgerError> {
        if !price.is_positive() {
            return Err(LedgerError::NonPositivePrice(price));
        }
        let id = StockId::from(id);
        if self.by_id.search(&id).is_some() {
            return Err(LedgerError::StockExists(id.to_string()));
        }

        let slot = self.stocks.insert(Stock::new(id.clone(), price, timestamp));
        self.by_price.insert(price, id.clone());
        debug!(stock = %id, %price, timestamp, "stock added");
        self.by_id.insert(id, slot);
        Ok(())
    }

    /// Remove a stock and its history.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StockNotFound`] if the identifier is unknown
    pub fn remove_stock(&mut self, id: &str) -> Result<(), LedgerError> {
        let (id, slot) = self.lookup(id)?;

        let stock = self.stocks.remove(slot);
        self.by_id.delete(&id, &slot);
        self.by_price.delete(&stock.price(), &id);
        debug!(stock = %id, updates = stock.update_count(), "stock removed");
        Ok(())
    }

    /// Apply a timestamped price change.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::StockNotFound`] if the identifier is unknown
    /// - [`LedgerError::ZeroPriceChange`] if `delta` is zero
    /// - [`LedgerError::DuplicateUpdate`] if the stock already has an update at `timestamp`
    /// - [`LedgerError::PriceOverflow`] if the new price does not fit
    pub fn update_stock(&mut self, id: &str, timestamp: u64, delta: Price) -> Result<(), LedgerError> {
        let (id, slot) = self.lookup(id)?;
        if delta.is_zero() {
            return Err(LedgerError::ZeroPriceChange);
        }

        let stock = &mut self.stocks[slot];
        let old_price = stock.price();
        let new_price = stock.apply_update(timestamp, delta)?;

        self.reindex(&id, old_price, new_price);
        debug!(stock = %id, %old_price, %new_price, timestamp, "stock updated");
        Ok(())
    }

    /// Current price of a stock.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StockNotFound`] if the identifier is unknown
    pub fn get_stock_price(&self, id: &str) -> Result<Price, LedgerError> {
        let (_, slot) = self.lookup(id)?;
        Ok(self.stocks[slot].price())
    }

    /// Remove one update from a stock's history and revert its price change.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::StockNotFound`] if the identifier is unknown
    /// - [`LedgerError::UpdateNotFound`] if there is no update at `timestamp`
    pub fn remove_stock_timestamp(&mut self, id: &str, timestamp: u64) -> Result<(), LedgerError> {
        let (id, slot) = self.lookup(id)?;

        let stock = &mut self.stocks[slot];
        let old_price = stock.price();
        let update = stock.revert_update(timestamp)?;
        let new_price = stock.price();

        self.reindex(&id, old_price, new_price);
        debug!(stock = %id, reverted = %update.delta, %new_price, timestamp, "update removed");
        Ok(())
    }

    /// A stock's updates in timestamp order.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StockNotFound`] if the identifier is unknown
    pub fn stock_history(&self, id: &str) -> Result<Vec<PriceUpdate>, LedgerError> {
        let (_, slot) = self.lookup(id)?;
        Ok(self.stocks[slot].history())
    }

    // ========================================================================
    // Price range queries
    // ========================================================================

    /// Number of stocks priced in `[low, high]`.
    ///
    /// A reversed range holds no stocks.
    pub fn get_amount_stocks_in_price_range(&mut self, low: Price, high: Price) -> Result<usize, LedgerError> {
        let count = self
            .by_price
            .count_in_range(&low, &high, TieBreak::Lowest, TieBreak::Highest)?;
        trace!(%low, %high, count, "price range counted");
        Ok(count)
    }

    /// Identifiers of the stocks priced in `[low, high]`, ascending by price
    /// then identifier.
    pub fn get_stocks_in_price_range(&mut self, low: Price, high: Price) -> Result<Vec<String>, LedgerError> {
        let count = self.get_amount_stocks_in_price_range(low, high)?;
        let ids = self
            .by_price
            .nodes_in_range(&low, &high, TieBreak::Lowest, TieBreak::Highest, count)?;
        Ok(ids)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn lookup(&self, id: &str) -> Result<(StockId, usize), LedgerError> {
        let id = StockId::from(id);
        match self.by_id.search(&id) {
            Some(slot) => Ok((id, *slot)),
            None => Err(LedgerError::StockNotFound(id.to_string())),
        }
    }

    fn reindex(&mut self, id: &StockId, old_price: Price, new_price: Price) {
        self.by_price.delete(&old_price, id);
        self.by_price.insert(new_price, id.clone());
    }

    /// Check both indexes against the stock storage.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.by_id.validate().unwrap();
        self.by_price.validate().unwrap();
        assert_eq!(self.by_id.len(), self.stocks.len());
        assert_eq!(self.by_price.len(), self.stocks.len());
        for (_, stock) in self.stocks.iter() {
            assert!(self.by_price.contains(&stock.price(), stock.id()));
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn create_manager() -> StockManager {
        let mut manager = StockManager::with_capacity(8);
        manager.add_stock("ACME", 1, price("100")).unwrap();
        manager.add_stock("BOLT", 2, price("50")).unwrap();
        manager.add_stock("CORE", 3, price("100")).unwrap();
        manager
    }

    #[test]
    fn test_manager_new() {
        let manager = StockManager::new();

        assert!(manager.is_empty());
        assert_eq!(manager.len(), 0);
        assert!(manager.price_bounds().is_none());
    }

    #[test]
    fn test_add_stock() {
        let manager = create_manager();

        assert_eq!(manager.len(), 3);
        assert_eq!(manager.get_stock_price("BOLT"), Ok(price("50")));
        assert_eq!(manager.price_bounds(), Some((price("50"), price("100"))));
        manager.assert_consistent();
    }

    #[test]
    fn test_add_stock_rejects_bad_input() {
        let mut manager = create_manager();

        assert_eq!(
            manager.add_stock("ACME", 9, price("1")),
            Err(LedgerError::StockExists("ACME".into()))
        );
        assert_eq!(
            manager.add_stock("ZERO", 9, Price::ZERO),
            Err(LedgerError::NonPositivePrice(Price::ZERO))
        );
        assert_eq!(
            manager.add_stock("NEG", 9, price("-3")),
            Err(LedgerError::NonPositivePrice(price("-3")))
        );
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn test_empty_id_is_a_regular_stock() {
        let mut manager = create_manager();

        manager.add_stock("", 0, price("100")).unwrap();

        let ids = manager.get_stocks_in_price_range(price("100"), price("100")).unwrap();
        assert_eq!(ids, vec!["", "ACME", "CORE"]);
    }

    #[test]
    fn test_remove_stock() {
        let mut manager = create_manager();

        manager.remove_stock("ACME").unwrap();

        assert_eq!(manager.len(), 2);
        assert_eq!(
            manager.get_stock_price("ACME"),
            Err(LedgerError::StockNotFound("ACME".into()))
        );
        assert_eq!(
            manager.remove_stock("ACME"),
            Err(LedgerError::StockNotFound("ACME".into()))
        );
        manager.assert_consistent();
    }

    #[test]
    fn test_update_stock_reindexes_price() {
        let mut manager = create_manager();

        manager.update_stock("BOLT", 10, price("75.5")).unwrap();

        assert_eq!(manager.get_stock_price("BOLT"), Ok(price("125.5")));
        assert_eq!(manager.price_bounds(), Some((price("100"), price("125.5"))));
        assert_eq!(
            manager.get_stocks_in_price_range(price("120"), price("130")).unwrap(),
            vec!["BOLT"]
        );
        manager.assert_consistent();
    }

    #[test]
    fn test_update_stock_errors() {
        let mut manager = create_manager();

        assert_eq!(
            manager.update_stock("NOPE", 1, price("1")),
            Err(LedgerError::StockNotFound("NOPE".into()))
        );
        assert_eq!(
            manager.update_stock("ACME", 1, Price::ZERO),
            Err(LedgerError::ZeroPriceChange)
        );

        manager.update_stock("ACME", 1, price("1")).unwrap();
        assert_eq!(
            manager.update_stock("ACME", 1, price("2")),
            Err(LedgerError::DuplicateUpdate { id: "ACME".into(), timestamp: 1 })
        );
        assert_eq!(manager.get_stock_price("ACME"), Ok(price("101")));
        manager.assert_consistent();
    }

    #[test]
    fn test_remove_stock_timestamp() {
        let mut manager = create_manager();

        manager.update_stock("CORE", 5, price("-30")).unwrap();
        manager.update_stock("CORE", 6, price("10")).unwrap();
        assert_eq!(manager.get_stock_price("CORE"), Ok(price("80")));

        manager.remove_stock_timestamp("CORE", 5).unwrap();

        assert_eq!(manager.get_stock_price("CORE"), Ok(price("110")));
        let history = manager.stock_history("CORE").unwrap();
        assert_eq!(history, vec![PriceUpdate::new(6, price("10"))]);
        assert_eq!(
            manager.remove_stock_timestamp("CORE", 5),
            Err(LedgerError::UpdateNotFound { id: "CORE".into(), timestamp: 5 })
        );
        manager.assert_consistent();
    }

    #[test]
    fn test_price_may_drop_below_zero_through_updates() {
        let mut manager = create_manager();

        manager.update_stock("BOLT", 1, price("-60")).unwrap();

        assert_eq!(manager.get_stock_price("BOLT"), Ok(price("-10")));
        assert_eq!(manager.price_bounds(), Some((price("-10"), price("100"))));
    }

    #[test]
    fn test_price_range_queries() {
        let mut manager = create_manager();

        assert_eq!(manager.get_amount_stocks_in_price_range(price("50"), price("100")), Ok(3));
        assert_eq!(manager.get_amount_stocks_in_price_range(price("50.00000001"), price("100")), Ok(2));
        assert_eq!(manager.get_amount_stocks_in_price_range(price("101"), price("200")), Ok(0));
        assert_eq!(manager.get_amount_stocks_in_price_range(price("100"), price("50")), Ok(0));

        let ids = manager.get_stocks_in_price_range(price("0"), price("1000")).unwrap();
        assert_eq!(ids, vec!["BOLT", "ACME", "CORE"]);

        assert!(manager.get_stocks_in_price_range(price("100"), price("50")).unwrap().is_empty());
        manager.assert_consistent();
    }

    #[test]
    fn test_init_stocks_resets() {
        let mut manager = create_manager();

        manager.init_stocks();

        assert!(manager.is_empty());
        assert_eq!(manager.get_amount_stocks_in_price_range(price("0"), price("1000")), Ok(0));
        manager.add_stock("ACME", 1, price("1")).unwrap();
        manager.assert_consistent();
    }

    #[test]
    fn test_stocks_iterate_by_id() {
        let manager = create_manager();

        let ids: Vec<&str> = manager.stocks().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["ACME", "BOLT", "CORE"]);
    }
}
