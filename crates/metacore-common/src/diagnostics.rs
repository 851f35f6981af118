//! Diagnostic infrastructure.
//!
//! Every stage of the pipeline reports failures as `Diagnostic` values. A
//! diagnostic may bundle other diagnostics as its `underlying` causes, so a
//! single failed translation is represented as a tree whose leaves are the
//! concrete problems found in the model.

use crate::position::LineMap;
use crate::span::Span;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;

// =============================================================================
// Diagnostic Kind
// =============================================================================

/// What went wrong, broadly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Dangling reference, cyclic inheritance, malformed type or default.
    Structural,
    /// Serialization conflict, missing type discriminator, bad contract call.
    Consistency,
    /// A non-optional property is never guaranteed to be assigned.
    Initialization,
    /// Unresolved or malformed documentation cross-reference.
    Documentation,
    /// Only groups underlying diagnostics.
    Aggregate,
}

impl DiagnosticKind {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::Structural => "structural",
            DiagnosticKind::Consistency => "consistency",
            DiagnosticKind::Initialization => "initialization",
            DiagnosticKind::Documentation => "documentation",
            DiagnosticKind::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A message about a source node, optionally caused by other diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub underlying: Vec<Diagnostic>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message_text: message.into(),
            underlying: Vec::new(),
        }
    }

    pub fn structural(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Structural, span, message)
    }

    pub fn consistency(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Consistency, span, message)
    }

    pub fn initialization(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Initialization, span, message)
    }

    pub fn documentation(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Documentation, span, message)
    }

    /// Bundle `underlying` under a common message.
    pub fn aggregate(span: Span, message: impl Into<String>, underlying: Vec<Diagnostic>) -> Self {
        Self {
            kind: DiagnosticKind::Aggregate,
            span,
            message_text: message.into(),
            underlying,
        }
    }

    /// The diagnostics at the bottom of the tree.
    ///
    /// A diagnostic without underlying causes is its own leaf.
    pub fn leaves(&self) -> Vec<&Diagnostic> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(diagnostic) = stack.pop() {
            if diagnostic.underlying.is_empty() {
                out.push(diagnostic);
            } else {
                // Reverse so that leaves come out in declaration order
                stack.extend(diagnostic.underlying.iter().rev());
            }
        }
        out
    }

    /// Render the tree with one line per diagnostic, indented by depth, and
    /// with line/column positions when the source is known.
    pub fn render(&self, source: Option<(&LineMap, &str)>) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, source);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize, source: Option<(&LineMap, &str)>) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        if let Some((line_map, text)) = source
            && !self.span.is_dummy()
        {
            let position = line_map.offset_to_position(self.span.start, text);
            out.push_str(&position.to_string());
            out.push_str(": ");
        }
        out.push_str(&self.message_text);
        out.push('\n');
        for cause in &self.underlying {
            cause.render_into(out, depth + 1, source);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.render(None);
        f.write_str(rendered.trim_end())
    }
}

/// Convert a non-empty error list into `Err`, an empty one into `Ok(value)`.
///
/// Stages collect everything they find and then decide once.
pub fn into_result<T>(value: T, errors: Vec<Diagnostic>) -> Result<T, Vec<Diagnostic>> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

/// Drop every diagnostic repeating an earlier one with the same kind, span
/// and message, keeping the first.
///
/// Inherited members are flattened into each descendant, so a problem in an
/// ancestor is otherwise found once per descendant.
pub fn dedup(diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: FxHashSet<(DiagnosticKind, Span, String)> = FxHashSet::default();
    diagnostics.retain(|diagnostic| {
        seen.insert((diagnostic.kind, diagnostic.span, diagnostic.message_text.clone()))
    });
}
