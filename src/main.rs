//! Stock Ledger - Binary Entry Point
//!
//! Loads a small sample ledger, applies a few price updates, and answers a
//! price range query given on the command line.
//!
//! ```bash
//! cargo run -- --low 90 --high 200
//! RUST_LOG=stock_ledger=debug cargo run -- --low 0 --high 1000
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stock_ledger::{LedgerError, Price, StockManager};

/// Command-line configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "stock-ledger")]
#[command(version)]
#[command(about = "Stock price ledger on an order-statistics tree", long_about = None)]
struct CliConfig {
    /// Lower bound of the price range query (inclusive)
    #[arg(long, default_value = "0")]
    low: String,

    /// Upper bound of the price range query (inclusive)
    #[arg(long, default_value = "1000")]
    high: String,

    /// Pre-allocated stock capacity
    #[arg(short = 'c', long, default_value_t = 64)]
    capacity: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(short = 'l', long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: String,
}

const SAMPLE_STOCKS: &[(&str, &str)] = &[
    ("ACME", "101.25"),
    ("BOLT", "54.10"),
    ("CORE", "250"),
    ("DYNE", "101.25"),
    ("EPIC", "12.5"),
];

const SAMPLE_UPDATES: &[(&str, u64, &str)] = &[
    ("BOLT", 1_703_577_601_000, "46.15"),
    ("CORE", 1_703_577_602_000, "-125"),
    ("EPIC", 1_703_577_603_000, "0.75"),
];

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(config: &CliConfig) -> Result<(), LedgerError> {
    let low: Price = config.low.parse()?;
    let high: Price = config.high.parse()?;

    let mut manager = StockManager::with_capacity(config.capacity);
    for (id, price) in SAMPLE_STOCKS {
        manager.add_stock(id, 1_703_577_600_000, price.parse()?)?;
    }
    for (id, timestamp, delta) in SAMPLE_UPDATES {
        manager.update_stock(id, *timestamp, delta.parse()?)?;
    }

    println!("Stocks:");
    for stock in manager.stocks() {
        println!("  {:<6} {:>12}  ({} updates)", stock.id(), stock.price(), stock.update_count());
    }
    println!();

    let count = manager.get_amount_stocks_in_price_range(low, high)?;
    let ids = manager.get_stocks_in_price_range(low, high)?;
    println!("Price range [{low}, {high}]: {count} stocks");
    for id in &ids {
        println!("  {id}");
    }
    println!();
    println!("State root: {}", manager.state_root_hex());

    Ok(())
}

fn main() {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    println!("===========================================");
    println!("  Stock Ledger");
    println!("===========================================");
    println!();

    tracing::info!(?config, "starting");

    if let Err(e) = run(&config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
