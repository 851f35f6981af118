//! Understanding and in-lining of constructors.
//!
//! A constructor body may only call the constructors of direct bases and
//! assign constructor arguments to properties of the same name. Each body is
//! first normalized into [`Statement`]s; then, walking the ontology from the
//! most general class down, calls to ancestor constructors are replaced by the
//! ancestor's already in-lined statements.

use crate::hierarchy::Ontology;
use crate::types::{AssignArgument, Link, StructuralDefault};
use metacore_common::diagnostics::into_result;
use metacore_common::{Diagnostic, Span};
use metacore_parse::{
    Expr, ExprKind, ParsedArgument, ParsedClass, ParsedConstructor, ParsedStatement,
    ParsedSymbolTable, ParsedTypeAnnotation, SuperArgument,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

/// A statement of an understood constructor body.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    CallSuperConstructor { super_name: String, span: Span },
    AssignArgument(AssignArgument),
}

/// Understood constructor bodies of all classes, by class name.
#[derive(Debug, Default)]
pub struct ConstructorTable {
    bodies: FxHashMap<String, Vec<Statement>>,
}

impl ConstructorTable {
    pub fn find(&self, class: &str) -> Option<&[Statement]> {
        self.bodies.get(class).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Arguments of a constructor, without the receiver.
pub(crate) fn explicit_arguments(
    constructor: &ParsedConstructor,
) -> impl Iterator<Item = &ParsedArgument> {
    constructor.arguments.iter().filter(|argument| {
        !matches!(argument.type_annotation, ParsedTypeAnnotation::SelfType { .. })
    })
}

fn is_defined_property(class: &ParsedClass, ancestors: &[&ParsedClass], name: &str) -> bool {
    class.find_property(name).is_some()
        || ancestors
            .iter()
            .any(|ancestor| ancestor.find_property(name).is_some())
}

// =============================================================================
// Understanding
// =============================================================================

/// Understand the constructors of every class in the ontology.
///
/// Errors are grouped per class under a common message.
pub fn understand_all(
    parsed: &ParsedSymbolTable,
    ontology: &Ontology<'_>,
) -> Result<ConstructorTable, Vec<Diagnostic>> {
    let mut table = ConstructorTable::default();
    let mut errors = Vec::new();

    for class in ontology.classes() {
        match understand(parsed, ontology, class) {
            Ok(body) => {
                trace!(class = %class.name, statements = body.len(), "understood constructor");
                table.bodies.insert(class.name.clone(), body);
            }
            Err(underlying) => errors.push(Diagnostic::aggregate(
                class.span,
                format!("Failed to understand the constructor of the class {}", class.name),
                underlying,
            )),
        }
    }

    debug!(constructors = table.len(), errors = errors.len(), "constructors understood");
    into_result(table, errors)
}

/// Understand the constructor of a single class.
pub fn understand(
    parsed: &ParsedSymbolTable,
    ontology: &Ontology<'_>,
    class: &ParsedClass,
) -> Result<Vec<Statement>, Vec<Diagnostic>> {
    let ancestors = ontology.list_ancestors(&class.name);

    let Some(constructor) = &class.constructor else {
        // Without a constructor the class inherits the default one, which
        // only works if no ancestor needs arguments.
        let mut errors = Vec::new();
        for ancestor in ancestors {
            let Some(ancestor_constructor) = &ancestor.constructor else {
                continue;
            };
            if explicit_arguments(ancestor_constructor).next().is_some() {
                let names: Vec<&str> = ancestor_constructor
                    .arguments
                    .iter()
                    .map(|argument| argument.name.as_str())
                    .collect();
                errors.push(Diagnostic::structural(
                    class.span,
                    format!(
                        "The class {} does not specify a constructor, but the ancestor class {} \
                         specifies a constructor with arguments: {}",
                        class.name,
                        ancestor.name,
                        names.join(", ")
                    ),
                ));
            }
        }
        return into_result(Vec::new(), errors);
    };

    if constructor.is_implementation_specific {
        return Ok(Vec::new());
    }

    let own_arguments: FxHashSet<&str> = explicit_arguments(constructor)
        .map(|argument| argument.name.as_str())
        .collect();

    let mut body = Vec::with_capacity(constructor.body.len());
    let mut errors = Vec::new();

    for statement in &constructor.body {
        match statement {
            ParsedStatement::CallSuperConstructor {
                super_name,
                arguments,
                span,
            } => match understand_super_call(
                parsed,
                class,
                &own_arguments,
                super_name,
                arguments,
                *span,
            ) {
                Ok(()) => body.push(Statement::CallSuperConstructor {
                    super_name: super_name.clone(),
                    span: *span,
                }),
                Err(mut call_errors) => errors.append(&mut call_errors),
            },
            ParsedStatement::AssignProperty {
                property,
                value,
                span,
            } => {
                if !is_defined_property(class, ancestors, property) {
                    errors.push(Diagnostic::structural(
                        *span,
                        format!(
                            "The property has not been previously defined in {}: {}",
                            class.name, property
                        ),
                    ));
                    continue;
                }
                match understand_assignment(parsed, class, &own_arguments, property, value, *span) {
                    Ok(assignment) => body.push(Statement::AssignArgument(assignment)),
                    Err(error) => errors.push(error),
                }
            }
            ParsedStatement::Unsupported { text, span } => errors.push(Diagnostic::structural(
                *span,
                format!(
                    "Unexpected statement in the body of the constructor: {text}; \
                     only calls to super constructors and property assignments expected"
                ),
            )),
        }
    }

    into_result(body, errors)
}

fn understand_super_call(
    parsed: &ParsedSymbolTable,
    class: &ParsedClass,
    own_arguments: &FxHashSet<&str>,
    super_name: &str,
    arguments: &[SuperArgument],
    span: Span,
) -> Result<(), Vec<Diagnostic>> {
    if !class.inheritances.iter().any(|base| base == super_name) {
        return Err(vec![Diagnostic::structural(
            span,
            format!(
                "Expected a super class in the call to a super constructor, \
                 but {} does not inherit from {}",
                class.name, super_name
            ),
        )]);
    }

    let Some(super_class) = parsed.find_class(super_name) else {
        return Err(vec![Diagnostic::structural(
            span,
            format!("The super class {super_name} is not defined"),
        )]);
    };

    let Some(super_constructor) = &super_class.constructor else {
        return Err(vec![Diagnostic::structural(
            span,
            format!("The super class {super_name} does not define a constructor"),
        )]);
    };

    let expected: Vec<&str> = explicit_arguments(super_constructor)
        .map(|argument| argument.name.as_str())
        .collect();

    let mut errors = Vec::new();

    // Map each expected argument to the expression it is given
    let mut given: Vec<(&str, &Expr)> = Vec::with_capacity(arguments.len());
    let mut positional = 0usize;

    for argument in arguments {
        if argument.double_star {
            errors.push(Diagnostic::structural(
                argument.value.span,
                "Expected a call to a super constructor to provide only explicit keyword \
                 arguments, but got a double-star keyword argument",
            ));
            continue;
        }

        let key = match &argument.keyword {
            Some(keyword) => {
                if !expected.contains(&keyword.as_str()) {
                    errors.push(Diagnostic::structural(
                        argument.value.span,
                        format!(
                            "The constructor of {super_name} does not expect the argument {keyword}"
                        ),
                    ));
                    continue;
                }
                keyword.as_str()
            }
            None => {
                let Some(&key) = expected.get(positional) else {
                    errors.push(Diagnostic::structural(
                        span,
                        format!(
                            "The constructor of {} expected {} argument(s), \
                             but the call provides {} positional argument(s)",
                            super_name,
                            expected.len(),
                            arguments
                                .iter()
                                .filter(|a| a.keyword.is_none() && !a.double_star)
                                .count()
                        ),
                    ));
                    break;
                };
                positional += 1;
                key
            }
        };

        if given.iter().any(|(known, _)| *known == key) {
            errors.push(Diagnostic::structural(
                argument.value.span,
                format!(
                    "The argument {key} is passed more than once \
                     to the constructor of {super_name}"
                ),
            ));
            continue;
        }
        given.push((key, &argument.value));
    }

    for (key, value) in &given {
        let Some(name) = value.as_name() else {
            errors.push(Diagnostic::structural(
                value.span,
                format!(
                    "Expected only names in the arguments to the super constructor, \
                     but got an expression for the argument {key}"
                ),
            ));
            continue;
        };

        if !own_arguments.contains(name) {
            errors.push(Diagnostic::structural(
                value.span,
                format!(
                    "Expected all the arguments to the constructor of {} to be propagation \
                     of the original constructor arguments, but the name {} is not an argument \
                     of the constructor of {}",
                    super_name, name, class.name
                ),
            ));
        } else if name != *key {
            errors.push(Diagnostic::structural(
                value.span,
                format!(
                    "Expected the arguments to the super constructor to be passed with the same \
                     names, but the argument {key} is passed as the name {name}"
                ),
            ));
        }
    }

    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|name| !given.iter().any(|(key, _)| key == name))
        .collect();
    if !missing.is_empty() {
        errors.push(Diagnostic::structural(
            span,
            format!(
                "The call to the constructor of {} is missing one or more arguments: {}",
                super_name,
                missing.join(", ")
            ),
        ));
    }

    into_result((), errors)
}

fn understand_assignment(
    parsed: &ParsedSymbolTable,
    class: &ParsedClass,
    own_arguments: &FxHashSet<&str>,
    property: &str,
    value: &Expr,
    span: Span,
) -> Result<AssignArgument, Diagnostic> {
    let assign = |default| {
        if own_arguments.contains(property) {
            Ok(AssignArgument {
                name: property.to_string(),
                argument: property.to_string(),
                default,
                span,
            })
        } else {
            Err(Diagnostic::structural(
                span,
                format!(
                    "The property {property} is assigned the argument {property}, \
                     but the constructor of {} has no such argument",
                    class.name
                ),
            ))
        }
    };

    match &value.kind {
        ExprKind::Name { identifier } if identifier == property => assign(None),
        ExprKind::Name { identifier } => Err(Diagnostic::structural(
            value.span,
            format!(
                "Expected the property {property} to be assigned exactly the argument \
                 with the same name, but got: {identifier}"
            ),
        )),
        ExprKind::Conditional {
            condition,
            then,
            otherwise,
        } if is_guarded_argument(condition, then, property) => {
            match understand_structural_default(parsed, otherwise) {
                Some(default) => assign(Some(default)),
                None => Err(Diagnostic::structural(
                    otherwise.span,
                    format!(
                        "The default value of the property {property} is not supported; \
                         expected an empty list or an enumeration literal"
                    ),
                )),
            }
        }
        _ => Err(Diagnostic::structural(
            value.span,
            format!(
                "Expected a name or a defaulting conditional as the value assigned \
                 to the property {property}, but got an unsupported expression"
            ),
        )),
    }
}

/// `<property> if <property> is not None else ...`
fn is_guarded_argument(condition: &Expr, then: &Expr, property: &str) -> bool {
    let ExprKind::IsNotNone { value } = &condition.kind else {
        return false;
    };
    value.as_name() == Some(property) && then.as_name() == Some(property)
}

fn understand_structural_default(
    parsed: &ParsedSymbolTable,
    otherwise: &Expr,
) -> Option<StructuralDefault> {
    match &otherwise.kind {
        ExprKind::ListLiteral { items } if items.is_empty() => Some(StructuralDefault::EmptyList),
        ExprKind::Member { instance, name } => {
            let enumeration_name = instance.as_name()?;
            let enumeration = parsed.find_enumeration(enumeration_name)?;
            enumeration.has_literal(name).then(|| StructuralDefault::EnumLiteral {
                enumeration: Link::Placeholder(enumeration_name.to_string()),
                literal: name.clone(),
            })
        }
        _ => None,
    }
}

// =============================================================================
// In-lining
// =============================================================================

/// In-line the constructors of all classes in topological order.
///
/// Must only be called with the ontology the table was understood against:
/// every ancestor is then in-lined before its descendants.
pub fn in_line_constructors(
    ontology: &Ontology<'_>,
    table: &ConstructorTable,
) -> FxHashMap<String, Vec<AssignArgument>> {
    let mut result: FxHashMap<String, Vec<AssignArgument>> = FxHashMap::default();

    for class in ontology.classes() {
        let mut in_lined = Vec::new();
        for statement in table.find(&class.name).unwrap_or_default() {
            match statement {
                Statement::CallSuperConstructor { super_name, .. } => {
                    if let Some(ancestor_statements) = result.get(super_name) {
                        in_lined.extend(ancestor_statements.iter().cloned());
                    }
                }
                Statement::AssignArgument(assignment) => in_lined.push(assignment.clone()),
            }
        }
        trace!(class = %class.name, statements = in_lined.len(), "in-lined constructor");
        result.insert(class.name.clone(), in_lined);
    }

    result
}
