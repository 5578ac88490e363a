use std::path::PathBuf;

use clap::Parser;
use compliance::{Benchmark, Config, NodeKind, NodeRef};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Print the benchmark hierarchy as an indented tree")]
pub struct Tree {
    /// Path to the YAML benchmark definition
    file: PathBuf,

    /// Only descend this many levels below the root (0 prints the name only)
    #[arg(long)]
    depth: Option<usize>,
}

impl Tree {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: Config) -> anyhow::Result<()> {
        let benchmark = super::load(&self.file, config)?;
        println!("{}", self.render(&benchmark));
        Ok(())
    }

    /// Renders the hierarchy, one node per line.
    ///
    /// A node's level is the number of segments in its identifier, which is
    /// also its distance from the root.
    fn render(&self, benchmark: &Benchmark) -> String {
        let within =
            |node: &NodeRef<'_>| self.depth.is_none_or(|limit| node.id().depth() <= limit);

        let mut lines = vec![if benchmark.version().is_empty() {
            benchmark.name().to_string()
        } else {
            format!("{} {}", benchmark.name(), benchmark.version().dim())
        }];

        let mut stack: Vec<NodeRef<'_>> = benchmark
            .root()
            .children()
            .filter(|child| within(child))
            .collect();
        stack.reverse();

        while let Some(node) = stack.pop() {
            lines.push(format!("{}{}", "  ".repeat(node.id().depth()), line(node)));
            let start = stack.len();
            stack.extend(node.children().filter(|child| within(child)));
            stack[start..].reverse();
        }

        lines.join("\n")
    }
}

fn line(node: NodeRef<'_>) -> String {
    let id = match node.kind() {
        NodeKind::Control => node.id().as_str().info(),
        NodeKind::Section | NodeKind::Benchmark => node.id().to_string(),
    };
    match node.node().title() {
        Some(title) => format!("{id} {title}"),
        None => id,
    }
}
