//! flora — aggregate DataHerb flora metadata.
//!
//! Reads the per-herb files in `flora/`, pulls each herb's metadata from its
//! source repository, and writes `build/_flora/<herb>.md` plus
//! `build/flora.json`.

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
