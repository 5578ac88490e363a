//! Command-line interface for browsing compliance benchmark definitions.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
