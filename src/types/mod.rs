//! Core data types for the stock ledger
//!
//! ## Types
//!
//! - [`Price`]: Fixed-point price or price change (scaled by 10^8)
//! - [`StockId`]: Stock identifier, ordered by its string
//! - [`Stock`]: Current price plus update history
//! - [`PriceUpdate`]: One timestamped price change
//!
//! ## Fixed-Point Arithmetic
//!
//! All prices are stored as `i64` scaled by 10^8.
//! Example: 50000.12345678 is stored as 5_000_012_345_678i64

mod stock;
mod update;
pub mod price;

// Re-export all types at module level
pub use price::Price;
pub use stock::{Stock, StockId};
pub use update::PriceUpdate;
