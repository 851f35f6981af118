//! Constraints representable in common schemas such as JSON Schema or XSD,
//! inferred from the invariants of a symbol.
//!
//! The inference is not exhaustive: only invariants comparing `len` of a
//! property against an integer constant, and pattern verifications applied to
//! a property, are understood. Both forms may be guarded by the property being
//! set (`self.p is None or ...`, `(self.p is not None) ⇒ ...`). Constraints
//! are inferred for optional properties as well.

use crate::types::{Symbol, SymbolTable};
use indexmap::IndexMap;
use metacore_common::Diagnostic;
use metacore_common::diagnostics::into_result;
use metacore_parse::{Comparator, Expr, ExprKind};
use serde::Serialize;
use tracing::trace;

/// Inclusive bounds on the length of a property value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LenConstraint {
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bound {
    Min(i64),
    Max(i64),
    Exact(i64),
    /// No length satisfies `len(self.p) <op> N`, e.g. `< i64::MIN`.
    Unsatisfiable { op: Comparator, constant: i64 },
}

// =============================================================================
// Matching
// =============================================================================

/// Strip a guard on the property being set, returning the guarded property
/// and the consequent.
fn match_conditional_on_property(expr: &Expr) -> Option<(&str, &Expr)> {
    match &expr.kind {
        ExprKind::Or { values } => match values.as_slice() {
            [guard, consequent] => {
                let ExprKind::IsNone { value } = &guard.kind else {
                    return None;
                };
                Some((value.as_self_member()?, consequent))
            }
            _ => None,
        },
        ExprKind::Implication {
            antecedent,
            consequent,
        } => {
            let ExprKind::IsNotNone { value } = &antecedent.kind else {
                return None;
            };
            Some((value.as_self_member()?, &**consequent))
        }
        _ => None,
    }
}

/// `f(self.p)`, returning `f` and `p`.
fn match_single_arg_function_on_property(expr: &Expr) -> Option<(&str, &str)> {
    let ExprKind::FunctionCall { name, arguments } = &expr.kind else {
        return None;
    };
    let [argument] = arguments.as_slice() else {
        return None;
    };
    Some((name.as_str(), argument.as_self_member()?))
}

fn match_len_on_property(expr: &Expr) -> Option<&str> {
    match match_single_arg_function_on_property(expr)? {
        ("len", property) => Some(property),
        _ => None,
    }
}

/// `len(self.p) <op> N` or `N <op> len(self.p)`. A `!=` comparison matches
/// without yielding a bound.
fn match_len_bound(expr: &Expr) -> Option<(&str, Option<Bound>)> {
    let ExprKind::Comparison { left, op, right } = &expr.kind else {
        return None;
    };

    let (property, op, constant) = if let (Some(property), Some(constant)) =
        (match_len_on_property(left), right.as_int())
    {
        (property, *op, constant)
    } else if let (Some(constant), Some(property)) =
        (left.as_int(), match_len_on_property(right))
    {
        // Normalize to `len(self.p) <op> N`
        (property, op.flip(), constant)
    } else {
        return None;
    };

    let unsatisfiable = Bound::Unsatisfiable { op, constant };
    let bound = match op {
        Comparator::Lt => Some(constant.checked_sub(1).map_or(unsatisfiable, Bound::Max)),
        Comparator::Le => Some(Bound::Max(constant)),
        Comparator::Eq => Some(Bound::Exact(constant)),
        Comparator::Gt => Some(constant.checked_add(1).map_or(unsatisfiable, Bound::Min)),
        Comparator::Ge => Some(Bound::Min(constant)),
        Comparator::Ne => None,
    };
    Some((property, bound))
}

fn unguarded<'e>(body: &'e Expr) -> &'e Expr {
    match match_conditional_on_property(body) {
        Some((_, consequent)) => consequent,
        None => body,
    }
}

// =============================================================================
// Length
// =============================================================================

/// Infer the constraints on `len` for every property of the symbol.
///
/// Contradicting bounds are reported as consistency errors.
pub fn infer_len_constraints(
    symbol: &Symbol,
) -> Result<IndexMap<String, LenConstraint>, Vec<Diagnostic>> {
    let mut bounds: IndexMap<&str, Vec<Bound>> = IndexMap::new();

    for invariant in symbol.invariants() {
        if let Some((property, Some(bound))) = match_len_bound(unguarded(&invariant.body)) {
            bounds.entry(property).or_default().push(bound);
        }
    }

    let mut result = IndexMap::new();
    let mut errors = Vec::new();
    let conflict = |property: &str, detail: String| {
        Diagnostic::consistency(
            symbol.span(),
            format!("The property {property} has conflicting invariants on the length: {detail}."),
        )
    };

    for (property, property_bounds) in bounds {
        let mut min_len: Option<i64> = None;
        let mut max_len: Option<i64> = None;
        let mut exact_len: Option<i64> = None;
        let errors_before = errors.len();

        for bound in property_bounds {
            match bound {
                Bound::Min(value) => {
                    min_len = Some(min_len.map_or(value, |known| known.max(value)));
                }
                Bound::Max(value) => {
                    max_len = Some(max_len.map_or(value, |known| known.min(value)));
                }
                Bound::Exact(value) => {
                    if let Some(known) = exact_len.filter(|known| *known != value) {
                        errors.push(conflict(
                            property,
                            format!(
                                "the exact length, {known}, \
                                 contradicts another exactly expected length {value}"
                            ),
                        ));
                    }
                    exact_len = Some(value);
                }
                Bound::Unsatisfiable { op, constant } => errors.push(conflict(
                    property,
                    format!("no length satisfies len(self.{property}) {} {constant}", op.as_str()),
                )),
            }
        }

        if let Some(exact) = exact_len {
            if let Some(min) = min_len.filter(|min| *min > exact) {
                errors.push(conflict(
                    property,
                    format!(
                        "the minimum length, {min}, \
                         contradicts the exactly expected length {exact}"
                    ),
                ));
            }
            if let Some(max) = max_len.filter(|max| *max < exact) {
                errors.push(conflict(
                    property,
                    format!(
                        "the maximum length, {max}, \
                         contradicts the exactly expected length {exact}"
                    ),
                ));
            }
        }

        if let (Some(min), Some(max)) = (min_len, max_len) {
            if min > max {
                errors.push(conflict(
                    property,
                    format!("the minimum length, {min}, contradicts the maximum length {max}"),
                ));
            }
        }

        if errors.len() > errors_before {
            continue;
        }

        if !symbol.properties().iter().any(|candidate| candidate.name == property) {
            continue;
        }

        let constraint = match exact_len {
            Some(exact) => LenConstraint {
                min_value: Some(exact),
                max_value: Some(exact),
            },
            None => LenConstraint {
                min_value: min_len,
                max_value: max_len,
            },
        };
        trace!(symbol = %symbol.name(), property, ?constraint, "inferred len constraint");
        result.insert(property.to_string(), constraint);
    }

    into_result(result, errors)
}

// =============================================================================
// Patterns
// =============================================================================

/// Patterns every property of the symbol has to match, in the order of the
/// invariants.
pub fn infer_pattern_constraints(
    symbol: &Symbol,
    table: &SymbolTable,
) -> IndexMap<String, Vec<String>> {
    let mut result: IndexMap<String, Vec<String>> = IndexMap::new();

    for invariant in symbol.invariants() {
        let Some((function, property)) =
            match_single_arg_function_on_property(unguarded(&invariant.body))
        else {
            continue;
        };
        let Some(pattern) = table
            .verification_function_by_name(function)
            .and_then(|function| function.pattern())
        else {
            continue;
        };
        if !symbol.properties().iter().any(|candidate| candidate.name == property) {
            continue;
        }
        result
            .entry(property.to_string())
            .or_default()
            .push(pattern.to_string());
    }

    result
}
