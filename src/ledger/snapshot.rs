//! Ledger state root.
//!
//! ## Purpose
//!
//! A 32-byte SHA-256 digest of the ledger contents. Two ledgers that hold the
//! same stocks with the same prices and histories produce the same root,
//! regardless of the order the operations were applied in or of how the
//! underlying trees happen to be shaped.
//!
//! ## Encoding
//!
//! Stocks are hashed in identifier order. Each contributes:
//!
//! ```text
//! id_len (u64 LE) | id bytes | price (i64 LE) | created_at (u64 LE)
//! update_count (u64 LE) | { timestamp (u64 LE) | delta (i64 LE) }*
//! ```

use sha2::{Digest, Sha256};

use crate::ledger::StockManager;

impl StockManager {
    /// Compute the SHA-256 state root over every stock.
    ///
    /// # Example
    ///
    /// ```
    /// use stock_ledger::ledger::StockManager;
    ///
    /// let mut a = StockManager::new();
    /// let mut b = StockManager::new();
    /// a.add_stock("ACME", 0, "10".parse().unwrap()).unwrap();
    /// a.add_stock("BOLT", 0, "20".parse().unwrap()).unwrap();
    /// b.add_stock("BOLT", 0, "20".parse().unwrap()).unwrap();
    /// b.add_stock("ACME", 0, "10".parse().unwrap()).unwrap();
    ///
    /// assert_eq!(a.state_root(), b.state_root());
    /// ```
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        for stock in self.stocks() {
            let id = stock.id().as_str().as_bytes();
            hasher.update((id.len() as u64).to_le_bytes());
            hasher.update(id);
            hasher.update(stock.price().raw().to_le_bytes());
            hasher.update(stock.created_at().to_le_bytes());
            hasher.update((stock.update_count() as u64).to_le_bytes());
            for (_, update) in stock.updates() {
                hasher.update(update.timestamp.to_le_bytes());
                hasher.update(update.delta.raw().to_le_bytes());
            }
        }

        let result = hasher.finalize();
        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        root
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root())
    }
}
