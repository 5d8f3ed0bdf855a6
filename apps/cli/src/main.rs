//! cyclusgen CLI: build Cyclus simulation input from a reactor fleet table.
//!
//! Reads a PRIS-style fleet CSV, filters it to the requested countries, and
//! writes a complete input document with one prototype and deployment entry
//! per operating unit.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
