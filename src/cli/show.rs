use std::path::PathBuf;

use clap::Parser;
use compliance::{Benchmark, Config, Node};
use tracing::instrument;

use super::{NodeNotFound, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Display detailed information about a section or control")]
pub struct Show {
    /// Path to the YAML benchmark definition
    file: PathBuf,

    /// The dotted identifier of the node to display
    id: String,
}

impl Show {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: Config) -> anyhow::Result<()> {
        let benchmark = super::load(&self.file, config)?;

        match self.render(&benchmark) {
            Ok(output) => println!("{output}"),
            Err(missing) => {
                eprintln!("{missing}");
                std::process::exit(1);
            }
        }

        Ok(())
    }

    fn render(&self, benchmark: &Benchmark) -> Result<String, NodeNotFound> {
        let node = benchmark
            .find(&self.id)
            .ok_or_else(|| NodeNotFound(self.id.clone()))?;

        let mut lines = vec![
            format!("# {} {}", node.id(), node.node().title().unwrap_or_default()),
            node.kind().to_string().dim(),
        ];

        match node.node() {
            Node::Benchmark(header) => field(&mut lines, "Version", Some(&header.version)),
            Node::Section(section) => {
                field(&mut lines, "Description", section.description.as_ref());
            }
            Node::Control(control) => {
                field(&mut lines, "Level", control.level.as_ref());
                field(&mut lines, "Assessment", control.assessment.as_ref());
                field(&mut lines, "Description", control.description.as_ref());
                field(&mut lines, "Rationale", control.rationale.as_ref());
                field(&mut lines, "Audit", control.audit.as_ref());
                field(&mut lines, "Remediation", control.remediation.as_ref());
            }
        }

        let children: Vec<String> = node.children().map(|child| child.id().to_string()).collect();
        if !children.is_empty() {
            lines.push(String::new());
            lines.push("Children".dim());
            lines.push(format!("  {}", children.join(", ")));
        }

        Ok(lines.join("\n"))
    }
}

/// Appends a labelled, indented block; empty values are skipped.
fn field(lines: &mut Vec<String>, label: &str, value: Option<&String>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        lines.push(String::new());
        lines.push(label.dim());
        lines.extend(value.lines().map(|line| format!("  {line}")));
    }
}
