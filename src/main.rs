//! Empties the operational tables of `data/local.db`.
//!
//! Usage: cargo run --bin clear_tables
//!
//! Set `RUST_LOG=debug` to see per-table row counts on stderr.

use anyhow::{Context, Result};
use rust_table_clear::{ClearConfig, TableClearer};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let clearer = TableClearer::new(ClearConfig::default());
    let stdout = std::io::stdout();
    clearer
        .run(&mut stdout.lock())
        .with_context(|| format!("clearing {}", clearer.config().db_path.display()))?;

    Ok(())
}
