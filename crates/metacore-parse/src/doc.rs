//! Docstrings, pre-parsed into a generic rich-text tree.

use metacore_common::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDescription {
    pub nodes: Vec<DocNode>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocNode {
    Text {
        text: String,
    },
    Literal {
        text: String,
    },
    Emphasis {
        children: Vec<DocNode>,
    },
    Paragraph {
        children: Vec<DocNode>,
    },
    BulletList {
        items: Vec<Vec<DocNode>>,
    },
    Note {
        children: Vec<DocNode>,
    },
    /// An inline cross-reference marker such as `:class:`.Something``.
    Role {
        role: String,
        text: String,
        #[serde(default)]
        span: Span,
    },
}

impl ParsedDescription {
    pub fn new(nodes: Vec<DocNode>) -> Self {
        Self {
            nodes,
            span: Span::dummy(),
        }
    }

    /// A description made of a single paragraph.
    pub fn paragraph(children: Vec<DocNode>) -> Self {
        Self::new(vec![DocNode::Paragraph { children }])
    }

    /// A single paragraph of plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::paragraph(vec![DocNode::text(text)])
    }
}

impl DocNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn role(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            text: text.into(),
            span: Span::dummy(),
        }
    }
}
