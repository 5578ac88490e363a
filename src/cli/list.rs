use std::path::PathBuf;

use clap::Parser;
use compliance::{Benchmark, Config, Node};
use tracing::instrument;

use super::{NodeNotFound, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "List every node in post-order: children before their parents")]
pub struct List {
    /// Path to the YAML benchmark definition
    file: PathBuf,

    /// Only list the subtree rooted at this identifier
    #[arg(long, value_name = "ID")]
    from: Option<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "plain")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Plain,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: Config) -> anyhow::Result<()> {
        let benchmark = super::load(&self.file, config)?;

        match self.render(&benchmark) {
            Ok(output) => println!("{output}"),
            Err(error) if error.is::<NodeNotFound>() => {
                eprintln!("{error}");
                std::process::exit(1);
            }
            Err(error) => return Err(error),
        }

        Ok(())
    }

    /// Renders the selected subtree in post-order.
    fn render(&self, benchmark: &Benchmark) -> anyhow::Result<String> {
        let start = match &self.from {
            Some(id) => benchmark.find(id).ok_or_else(|| NodeNotFound(id.clone()))?,
            None => benchmark.root(),
        };

        let nodes: Vec<&Node> = start.post_order().map(|node| node.node()).collect();

        let output = match self.output {
            OutputFormat::Plain => nodes
                .into_iter()
                .map(|node| {
                    let kind = node.kind().to_string();
                    match node.title() {
                        Some(title) => format!("{}\t{}\t{title}", node.id(), kind.dim()),
                        None => format!("{}\t{}", node.id(), kind.dim()),
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => serde_json::to_string_pretty(&nodes)?,
        };

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::cli::fixture;

    fn list(from: Option<&str>, output: OutputFormat) -> anyhow::Result<String> {
        let (_dir, path) = fixture::definition();
        let benchmark = fixture::benchmark(&path);
        let list = List {
            file: path,
            from: from.map(str::to_string),
            output,
        };
        list.render(&benchmark)
    }

    fn ids(plain: &str) -> Vec<&str> {
        plain
            .lines()
            .filter_map(|line| line.split('\t').next())
            .collect()
    }

    #[test]
    fn lists_whole_tree_children_first() {
        let output = list(None, OutputFormat::Plain).unwrap();
        assert_eq!(
            ids(&output),
            [
                "1.1.1",
                "1.1.2",
                "1.1",
                "1",
                "2.1.1",
                "2.1",
                "2.2",
                "2",
                "Hardening Guide"
            ]
        );
    }

    #[test]
    fn from_lists_only_the_subtree() {
        let output = list(Some("2"), OutputFormat::Plain).unwrap();
        assert_eq!(ids(&output), ["2.1.1", "2.1", "2.2", "2"]);
    }

    #[test]
    fn plain_rows_carry_kind_and_title() {
        let output = list(Some("1.1"), OutputFormat::Plain).unwrap();
        let last = output.lines().last().unwrap();
        let columns: Vec<&str> = last.split('\t').collect();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], "1.1");
        assert!(columns[1].contains("section"));
        assert_eq!(columns[2], "Filesystem");
    }

    #[test]
    fn json_output_is_tagged_by_kind() {
        let output = list(Some("1.1"), OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        let nodes = value.as_array().unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["kind"], "control");
        assert_eq!(nodes[0]["id"], "1.1.1");
        assert_eq!(nodes[0]["level"], "1");
        assert_eq!(nodes[2]["kind"], "section");
        assert_eq!(nodes[2]["description"], "Mount options");
    }

    #[test]
    fn json_includes_the_root() {
        let output = list(None, OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        let root = value.as_array().unwrap().last().unwrap();
        assert_eq!(root["kind"], "benchmark");
        assert_eq!(root["name"], "Hardening Guide");
        assert_eq!(root["version"], "2.0.0");
    }

    #[test]
    fn unknown_from_is_not_found() {
        let error = list(Some("9.9"), OutputFormat::Plain).unwrap_err();
        assert_eq!(
            error.downcast_ref::<NodeNotFound>(),
            Some(&NodeNotFound("9.9".to_string()))
        );
        assert_eq!(error.to_string(), "Node 9.9 not found");
    }
}
