//! Contract expressions.
//!
//! Bodies of invariants, pre-/postconditions, snapshots and constructor
//! statements arrive as a small expression tree. The tree is never
//! evaluated; it is only inspected (function calls, length constraints,
//! patterns) and re-emitted by code generators.

use metacore_common::Span;
use serde::{Deserialize, Serialize};

// =============================================================================
// Expression Nodes
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
}

/// A literal value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Constant {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl Comparator {
    /// The comparator with its operands swapped: `a < b` iff `b > a`.
    pub fn flip(self) -> Self {
        match self {
            Comparator::Lt => Comparator::Gt,
            Comparator::Le => Comparator::Ge,
            Comparator::Eq => Comparator::Eq,
            Comparator::Ne => Comparator::Ne,
            Comparator::Gt => Comparator::Lt,
            Comparator::Ge => Comparator::Le,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }
}

/// A piece of a joined (formatted) string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JoinedPart {
    Text { text: String },
    Formatted { value: Expr },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprKind {
    Constant {
        value: Constant,
    },
    Name {
        identifier: String,
    },
    Member {
        instance: Box<Expr>,
        name: String,
    },
    FunctionCall {
        name: String,
        arguments: Vec<Expr>,
    },
    /// A call on a member, e.g. `self.check()`.
    MethodCall {
        member: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Comparison {
        left: Box<Expr>,
        op: Comparator,
        right: Box<Expr>,
    },
    IsNone {
        value: Box<Expr>,
    },
    IsNotNone {
        value: Box<Expr>,
    },
    And {
        values: Vec<Expr>,
    },
    Or {
        values: Vec<Expr>,
    },
    Not {
        operand: Box<Expr>,
    },
    Implication {
        antecedent: Box<Expr>,
        consequent: Box<Expr>,
    },
    /// `then if condition else otherwise`
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    ListLiteral {
        items: Vec<Expr>,
    },
    JoinedStr {
        parts: Vec<JoinedPart>,
    },
}

// =============================================================================
// Construction
// =============================================================================

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::dummy(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn constant(value: Constant) -> Self {
        Self::new(ExprKind::Constant { value })
    }

    pub fn bool(value: bool) -> Self {
        Self::constant(Constant::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::constant(Constant::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::constant(Constant::Float(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::constant(Constant::Str(value.into()))
    }

    pub fn none() -> Self {
        Self::constant(Constant::None)
    }

    pub fn name(identifier: impl Into<String>) -> Self {
        Self::new(ExprKind::Name {
            identifier: identifier.into(),
        })
    }

    pub fn member(instance: Expr, name: impl Into<String>) -> Self {
        Self::new(ExprKind::Member {
            instance: Box::new(instance),
            name: name.into(),
        })
    }

    /// `self.<name>`
    pub fn self_member(name: impl Into<String>) -> Self {
        Self::member(Self::name("self"), name)
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Self::new(ExprKind::FunctionCall {
            name: name.into(),
            arguments,
        })
    }

    pub fn method_call(member: Expr, arguments: Vec<Expr>) -> Self {
        Self::new(ExprKind::MethodCall {
            member: Box::new(member),
            arguments,
        })
    }

    pub fn compare(left: Expr, op: Comparator, right: Expr) -> Self {
        Self::new(ExprKind::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn is_none(value: Expr) -> Self {
        Self::new(ExprKind::IsNone {
            value: Box::new(value),
        })
    }

    pub fn is_not_none(value: Expr) -> Self {
        Self::new(ExprKind::IsNotNone {
            value: Box::new(value),
        })
    }

    pub fn and(values: Vec<Expr>) -> Self {
        Self::new(ExprKind::And { values })
    }

    pub fn or(values: Vec<Expr>) -> Self {
        Self::new(ExprKind::Or { values })
    }

    pub fn not(operand: Expr) -> Self {
        Self::new(ExprKind::Not {
            operand: Box::new(operand),
        })
    }

    pub fn implies(antecedent: Expr, consequent: Expr) -> Self {
        Self::new(ExprKind::Implication {
            antecedent: Box::new(antecedent),
            consequent: Box::new(consequent),
        })
    }

    pub fn conditional(then: Expr, condition: Expr, otherwise: Expr) -> Self {
        Self::new(ExprKind::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    pub fn list(items: Vec<Expr>) -> Self {
        Self::new(ExprKind::ListLiteral { items })
    }

    pub fn joined(parts: Vec<JoinedPart>) -> Self {
        Self::new(ExprKind::JoinedStr { parts })
    }
}

// =============================================================================
// Inspection Helpers
// =============================================================================

impl Expr {
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name { identifier } => Some(identifier),
            _ => None,
        }
    }

    /// The property name if the expression is `self.<name>`.
    pub fn as_self_member(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Member { instance, name } if instance.as_name() == Some("self") => {
                Some(name)
            }
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match &self.kind {
            ExprKind::Constant {
                value: Constant::Int(value),
            } => Some(*value),
            _ => None,
        }
    }
}

// =============================================================================
// Visitor
// =============================================================================

/// Read-only traversal over an expression tree.
///
/// Override the hooks you care about and call the matching `walk_*`
/// function to keep descending.
pub trait Visitor {
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_function_call(&mut self, _call: &Expr, _name: &str, arguments: &[Expr]) {
        for argument in arguments {
            self.visit_expr(argument);
        }
    }
}

/// Visit every direct child of `expr`.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Constant { .. } | ExprKind::Name { .. } => {}
        ExprKind::Member { instance, .. } => visitor.visit_expr(instance),
        ExprKind::FunctionCall { name, arguments } => {
            visitor.visit_function_call(expr, name, arguments);
        }
        ExprKind::MethodCall { member, arguments } => {
            visitor.visit_expr(member);
            for argument in arguments {
                visitor.visit_expr(argument);
            }
        }
        ExprKind::Comparison { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::IsNone { value } | ExprKind::IsNotNone { value } => visitor.visit_expr(value),
        ExprKind::And { values } | ExprKind::Or { values } => {
            for value in values {
                visitor.visit_expr(value);
            }
        }
        ExprKind::Not { operand } => visitor.visit_expr(operand),
        ExprKind::Implication {
            antecedent,
            consequent,
        } => {
            visitor.visit_expr(antecedent);
            visitor.visit_expr(consequent);
        }
        ExprKind::Conditional {
            condition,
            then,
            otherwise,
        } => {
            visitor.visit_expr(condition);
            visitor.visit_expr(then);
            visitor.visit_expr(otherwise);
        }
        ExprKind::ListLiteral { items } => {
            for item in items {
                visitor.visit_expr(item);
            }
        }
        ExprKind::JoinedStr { parts } => {
            for part in parts {
                if let JoinedPart::Formatted { value } = part {
                    visitor.visit_expr(value);
                }
            }
        }
    }
}
