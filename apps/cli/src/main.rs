//! Despachos CLI — staff office listing from the university directory.
//!
//! Fetches the personnel of a unit, scrapes each person's office code from
//! their directory profile, and writes the list as text, Markdown and CSV.

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
