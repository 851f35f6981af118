//! Descriptions with typed cross-references.
//!
//! Docstrings arrive as a generic rich-text tree whose cross-references are
//! plain role markers. Which role means what is configured through
//! [`DocRoles`], which is passed into the translation explicitly.

use crate::types::{Link, SymbolId};
use metacore_common::{Diagnostic, Span};
use metacore_parse::{DocNode, ParsedDescription};
use rustc_hash::FxHashMap;

// =============================================================================
// Roles
// =============================================================================

/// What a role marker in a docstring refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A whole symbol, e.g. `:class:`.Something``.
    Symbol,
    /// A property of a class or a literal of an enumeration.
    Attribute,
    /// An argument of the documented method or function.
    Argument,
}

impl ReferenceKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "symbol" => Some(Self::Symbol),
            "attribute" => Some(Self::Attribute),
            "argument" => Some(Self::Argument),
            _ => None,
        }
    }
}

/// Mapping from role names to reference kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocRoles {
    roles: FxHashMap<String, ReferenceKind>,
}

impl Default for DocRoles {
    fn default() -> Self {
        Self::empty()
            .with("class", ReferenceKind::Symbol)
            .with("attr", ReferenceKind::Attribute)
            .with("paramref", ReferenceKind::Argument)
    }
}

impl DocRoles {
    /// No roles at all; every role marker is an error.
    pub fn empty() -> Self {
        Self {
            roles: FxHashMap::default(),
        }
    }

    pub fn with(mut self, role: impl Into<String>, kind: ReferenceKind) -> Self {
        self.roles.insert(role.into(), kind);
        self
    }

    pub fn kind_of(&self, role: &str) -> Option<ReferenceKind> {
        self.roles.get(role).copied()
    }
}

// =============================================================================
// Description Tree
// =============================================================================

/// A reference to a property or an enumeration literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeReference {
    Property { symbol: SymbolId, property: String },
    EnumerationLiteral { symbol: SymbolId, literal: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DocElement {
    Text(String),
    Literal(String),
    Emphasis(Vec<DocElement>),
    Paragraph(Vec<DocElement>),
    BulletList(Vec<Vec<DocElement>>),
    Note(Vec<DocElement>),
    SymbolReference {
        text: String,
        symbol: Link<SymbolId>,
        span: Span,
    },
    /// The placeholder holds the dotted path with any leading `~` stripped.
    AttributeReference {
        text: String,
        reference: Link<AttributeReference>,
        span: Span,
    },
    /// Checked against the documented arguments after resolution.
    ArgumentReference {
        text: String,
        argument: String,
        span: Span,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Description {
    pub elements: Vec<DocElement>,
    pub span: Span,
}

impl Description {
    /// All elements in document order, depth first.
    pub fn walk(&self) -> Vec<&DocElement> {
        let mut out = Vec::new();
        collect(&self.elements, &mut out);
        out
    }

    /// Cross-reference and text leaves, for resolving in place.
    pub(crate) fn leaves_mut(&mut self) -> Vec<&mut DocElement> {
        let mut out = Vec::new();
        collect_leaves_mut(&mut self.elements, &mut out);
        out
    }

    /// Names of all arguments referenced in the description.
    pub fn argument_references(&self) -> impl Iterator<Item = (&str, Span)> {
        self.walk().into_iter().filter_map(|element| match element {
            DocElement::ArgumentReference { argument, span, .. } => {
                Some((argument.as_str(), *span))
            }
            _ => None,
        })
    }

    /// Plain text of the description, with references rendered as their
    /// raw text.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for element in self.walk() {
            match element {
                DocElement::Text(text)
                | DocElement::Literal(text)
                | DocElement::SymbolReference { text, .. }
                | DocElement::AttributeReference { text, .. }
                | DocElement::ArgumentReference { text, .. } => out.push_str(text),
                _ => {}
            }
        }
        out
    }
}

fn collect_leaves_mut<'a>(elements: &'a mut [DocElement], out: &mut Vec<&'a mut DocElement>) {
    for element in elements {
        match element {
            DocElement::Emphasis(children)
            | DocElement::Paragraph(children)
            | DocElement::Note(children) => collect_leaves_mut(children, out),
            DocElement::BulletList(items) => {
                for item in items {
                    collect_leaves_mut(item, out);
                }
            }
            _ => out.push(element),
        }
    }
}

fn collect<'a>(elements: &'a [DocElement], out: &mut Vec<&'a DocElement>) {
    for element in elements {
        out.push(element);
        match element {
            DocElement::Emphasis(children)
            | DocElement::Paragraph(children)
            | DocElement::Note(children) => collect(children, out),
            DocElement::BulletList(items) => {
                for item in items {
                    collect(item, out);
                }
            }
            _ => {}
        }
    }
}

// =============================================================================
// Translation
// =============================================================================

/// Translate a parsed description, leaving cross-references as placeholders.
pub(crate) fn translate_description(
    parsed: &ParsedDescription,
    roles: &DocRoles,
    errors: &mut Vec<Diagnostic>,
) -> Description {
    Description {
        elements: translate_nodes(&parsed.nodes, parsed.span, roles, errors),
        span: parsed.span,
    }
}

pub(crate) fn translate_optional(
    parsed: Option<&ParsedDescription>,
    roles: &DocRoles,
    errors: &mut Vec<Diagnostic>,
) -> Option<Description> {
    parsed.map(|parsed| translate_description(parsed, roles, errors))
}

fn translate_nodes(
    nodes: &[DocNode],
    description_span: Span,
    roles: &DocRoles,
    errors: &mut Vec<Diagnostic>,
) -> Vec<DocElement> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let element = match node {
            DocNode::Text { text } => DocElement::Text(text.clone()),
            DocNode::Literal { text } => DocElement::Literal(text.clone()),
            DocNode::Emphasis { children } => {
                DocElement::Emphasis(translate_nodes(children, description_span, roles, errors))
            }
            DocNode::Paragraph { children } => {
                DocElement::Paragraph(translate_nodes(children, description_span, roles, errors))
            }
            DocNode::Note { children } => {
                DocElement::Note(translate_nodes(children, description_span, roles, errors))
            }
            DocNode::BulletList { items } => DocElement::BulletList(
                items
                    .iter()
                    .map(|item| translate_nodes(item, description_span, roles, errors))
                    .collect(),
            ),
            DocNode::Role { role, text, span } => {
                let span = if span.is_dummy() { description_span } else { *span };
                match roles.kind_of(role) {
                    Some(ReferenceKind::Symbol) => DocElement::SymbolReference {
                        text: text.clone(),
                        symbol: Link::Placeholder(text.clone()),
                        span,
                    },
                    Some(ReferenceKind::Attribute) => {
                        let path = text.strip_prefix('~').unwrap_or(text);
                        DocElement::AttributeReference {
                            text: text.clone(),
                            reference: Link::Placeholder(path.to_string()),
                            span,
                        }
                    }
                    Some(ReferenceKind::Argument) => DocElement::ArgumentReference {
                        text: text.clone(),
                        argument: text.clone(),
                        span,
                    },
                    None => {
                        errors.push(Diagnostic::documentation(
                            span,
                            format!("The role {role:?} of the reference {text:?} is not supported"),
                        ));
                        DocElement::Text(text.clone())
                    }
                }
            }
        };
        out.push(element);
    }
    out
}
