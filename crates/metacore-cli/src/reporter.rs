//! Terminal rendering of a failed translation.
//!
//! Each leaf of the error tree becomes one `file:line:col - kind error: message`
//! line. Without the source text only the file is shown.

use colored::Colorize;
use metacore_common::{Diagnostic, DiagnosticKind, LineMap};
use std::path::Path;

/// Renders diagnostics for the terminal.
pub struct Reporter {
    color: bool,
    file: String,
    source: Option<(LineMap, String)>,
}

impl Reporter {
    pub fn new(color: bool, file: &Path) -> Self {
        Reporter {
            color,
            file: file.display().to_string(),
            source: None,
        }
    }

    /// Resolve spans against `text`, which is shown as `file`.
    pub fn with_source(mut self, file: &Path, text: String) -> Self {
        self.file = file.display().to_string();
        self.source = Some((LineMap::build(&text), text));
        self
    }

    /// The headline followed by one line per underlying leaf diagnostic.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        out.push_str(&self.paint_headline(&diagnostic.message_text));

        let leaves = diagnostic.leaves();
        if leaves.len() == 1 && std::ptr::eq(leaves[0], diagnostic) {
            return out;
        }

        for leaf in &leaves {
            out.push('\n');
            out.push_str(&self.format_leaf(leaf));
        }

        out.push('\n');
        out.push('\n');
        let summary = match leaves.len() {
            1 => "Found 1 error.".to_string(),
            count => format!("Found {count} errors."),
        };
        out.push_str(&summary);
        out
    }

    fn format_leaf(&self, leaf: &Diagnostic) -> String {
        let mut line = String::from("  ");
        line.push_str(&self.format_location(leaf));
        line.push_str(" - ");
        line.push_str(&self.paint_kind(leaf.kind));
        line.push_str(": ");
        line.push_str(&leaf.message_text);
        line
    }

    fn format_location(&self, leaf: &Diagnostic) -> String {
        let location = match &self.source {
            Some((line_map, text)) if !leaf.span.is_dummy() => {
                let position = line_map.offset_to_position(leaf.span.start, text);
                format!("{}:{position}", self.file)
            }
            _ => self.file.clone(),
        };
        if self.color {
            location.cyan().to_string()
        } else {
            location
        }
    }

    fn paint_kind(&self, kind: DiagnosticKind) -> String {
        let text = format!("{kind} error");
        if !self.color {
            return text;
        }
        match kind {
            DiagnosticKind::Documentation => text.yellow().to_string(),
            _ => text.red().to_string(),
        }
    }

    fn paint_headline(&self, message: &str) -> String {
        if self.color {
            message.red().bold().to_string()
        } else {
            message.to_string()
        }
    }
}
