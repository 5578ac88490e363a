use std::path::PathBuf;

mod list;
mod show;
mod terminal;
mod tree;

use anyhow::Context;
use clap::ArgAction;
use compliance::Config;
use list::List;
use show::Show;
use tree::Tree;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML file controlling insertion rules
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load(path)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::default(),
        };

        self.command.run(config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Print the benchmark hierarchy as an indented tree
    Tree(Tree),

    /// List every node, children before parents
    List(List),

    /// Show all metadata of a single section or control
    Show(Show),
}

impl Command {
    fn run(self, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Tree(command) => command.run(config),
            Self::List(command) => command.run(config),
            Self::Show(command) => command.run(config),
        }
    }
}

/// Loads a definition file and builds its tree.
fn load(path: &std::path::Path, config: Config) -> anyhow::Result<compliance::Benchmark> {
    compliance::storage::load(path, config)
        .with_context(|| format!("failed to load benchmark from {}", path.display()))
}

/// An identifier given on the command line is not in the tree.
///
/// Commands report it on stderr and exit with status 1.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Node {0} not found")]
struct NodeNotFound(String);
