//! Type annotations as written in the meta-model.

use metacore_common::Span;
use serde::{Deserialize, Serialize};

/// A type annotation before any identifier has been looked up.
///
/// `Subscripted` covers the parametrized forms such as `List[T]`,
/// `Optional[T]` and `Ref[T]`. Whether the identifier and the number of
/// subscripts make sense is decided during translation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedTypeAnnotation {
    Atomic {
        identifier: String,
        #[serde(default)]
        span: Span,
    },
    Subscripted {
        identifier: String,
        subscripts: Vec<ParsedTypeAnnotation>,
        #[serde(default)]
        span: Span,
    },
    /// The receiver of a method, `self`.
    SelfType {
        #[serde(default)]
        span: Span,
    },
}

impl ParsedTypeAnnotation {
    pub fn atomic(identifier: impl Into<String>) -> Self {
        Self::Atomic {
            identifier: identifier.into(),
            span: Span::dummy(),
        }
    }

    pub fn subscripted(
        identifier: impl Into<String>,
        subscripts: Vec<ParsedTypeAnnotation>,
    ) -> Self {
        Self::Subscripted {
            identifier: identifier.into(),
            subscripts,
            span: Span::dummy(),
        }
    }

    pub fn list(item: ParsedTypeAnnotation) -> Self {
        Self::subscripted("List", vec![item])
    }

    pub fn optional(value: ParsedTypeAnnotation) -> Self {
        Self::subscripted("Optional", vec![value])
    }

    pub fn reference(value: ParsedTypeAnnotation) -> Self {
        Self::subscripted("Ref", vec![value])
    }

    pub fn self_type() -> Self {
        Self::SelfType { span: Span::dummy() }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Atomic { span, .. }
            | Self::Subscripted { span, .. }
            | Self::SelfType { span } => *span,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Subscripted { identifier, .. } if identifier == "Optional")
    }
}

impl std::fmt::Display for ParsedTypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atomic { identifier, .. } => f.write_str(identifier),
            Self::Subscripted {
                identifier,
                subscripts,
                ..
            } => {
                write!(f, "{identifier}[")?;
                for (i, subscript) in subscripts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{subscript}")?;
                }
                f.write_str("]")
            }
            Self::SelfType { .. } => f.write_str("self"),
        }
    }
}
