//! wikiloot CLI: scrape item metadata from bg3.wiki into CSV tables.
//!
//! `parse` enriches an item table with rarity, weight, price, and
//! description; `discover` builds a catalog of item pages from listing pages.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
