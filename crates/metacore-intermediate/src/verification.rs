//! Understanding of verification function bodies.
//!
//! Only one shape of body is understood: a sequence of string assignments to
//! local names followed by a pattern match on the argument, e.g.
//!
//! ```text
//! digit = "[0-9]"
//! pattern = f"^{digit}+$"
//! return match(pattern, text) is not None
//! ```

use crate::types::Verification;
use metacore_common::{Diagnostic, Span};
use metacore_parse::{
    Constant, Expr, ExprKind, FunctionBody, FunctionStatement, JoinedPart, ParsedFunction,
};
use rustc_hash::FxHashMap;

/// Determine what the verification function does.
pub fn understand_verification(parsed: &ParsedFunction) -> Result<Verification, Diagnostic> {
    let statements = match &parsed.body {
        FunctionBody::ImplementationSpecific => return Ok(Verification::ImplementationSpecific),
        FunctionBody::Understood { statements } => statements,
    };

    let not_understood = || {
        Diagnostic::structural(
            parsed.span,
            format!(
                "We do not know how to interpret the verification function {} as it does not \
                 match our pre-defined interpretation rules",
                parsed.name
            ),
        )
    };

    let Some((last, assignments)) = statements.split_last() else {
        return Err(not_understood());
    };

    let mut locals: FxHashMap<&str, String> = FxHashMap::default();
    for statement in assignments {
        let FunctionStatement::Assign { target, value, span } = statement else {
            return Err(not_understood());
        };
        let expanded = expand_string(value, &locals, *span)?;
        locals.insert(target.as_str(), expanded);
    }

    let FunctionStatement::Return { value, span } = last else {
        return Err(not_understood());
    };

    let call = match &value.kind {
        ExprKind::IsNotNone { value } => value.as_ref(),
        _ => value,
    };

    let ExprKind::FunctionCall { name, arguments } = &call.kind else {
        return Err(not_understood());
    };
    if name != "match" {
        return Err(not_understood());
    }
    let [pattern, argument] = arguments.as_slice() else {
        return Err(not_understood());
    };

    let is_own_argument = argument
        .as_name()
        .is_some_and(|name| parsed.arguments.iter().any(|candidate| candidate.name == name));
    if !is_own_argument {
        return Err(Diagnostic::structural(
            argument.span,
            format!(
                "Expected the pattern of the verification function {} to be matched against \
                 one of its arguments",
                parsed.name
            ),
        ));
    }

    let pattern = expand_string(pattern, &locals, *span)?;
    Ok(Verification::Pattern { pattern })
}

/// Expand a string constant, a local name or a joined string.
fn expand_string(
    expr: &Expr,
    locals: &FxHashMap<&str, String>,
    span: Span,
) -> Result<String, Diagnostic> {
    let span = if expr.span.is_dummy() { span } else { expr.span };
    match &expr.kind {
        ExprKind::Constant {
            value: Constant::Str(text),
        } => Ok(text.clone()),
        ExprKind::Name { identifier } => locals.get(identifier.as_str()).cloned().ok_or_else(|| {
            Diagnostic::structural(
                span,
                format!("The name {identifier} is not defined before it is used in the pattern"),
            )
        }),
        ExprKind::JoinedStr { parts } => {
            let mut out = String::new();
            for part in parts {
                match part {
                    JoinedPart::Text { text } => out.push_str(text),
                    JoinedPart::Formatted { value } => {
                        out.push_str(&expand_string(value, locals, span)?);
                    }
                }
            }
            Ok(out)
        }
        _ => Err(Diagnostic::structural(
            span,
            "Expected only string constants, names and joined strings in the pattern",
        )),
    }
}
