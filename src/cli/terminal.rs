//! Colour handling for command output.
//!
//! Styling is applied only when stdout is a colour-capable terminal, so
//! piped output (`compliance list ... | cut -f1`) stays plain text.

use owo_colors::{OwoColorize, colors::css};

fn stdout_has_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Styles used when rendering benchmark nodes.
pub trait Colorize {
    /// Highlights a control identifier so it stands out from section headings.
    fn info(&self) -> String;
    /// De-emphasises secondary text such as node kinds, versions and field
    /// labels.
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn info(&self) -> String {
        if stdout_has_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if stdout_has_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}
