//! Consistency checks on the resolved symbol table.

use crate::doc::Description;
use crate::lookups::{collect_interfaces_in_properties, map_interface_implementers};
use crate::types::{Argument, Class, StructuralDefault, Symbol, SymbolTable};
use metacore_common::Diagnostic;
use metacore_common::diagnostics::{dedup, into_result};
use metacore_parse::{Expr, Visitor};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Run all checks and report every violation.
pub(crate) fn validate(table: &SymbolTable) -> Result<(), Vec<Diagnostic>> {
    let mut errors = Vec::new();

    check_type_discriminators(table, &mut errors);
    check_contract_calls(table, &mut errors);
    for (_, class) in table.classes() {
        errors.extend(check_all_non_optional_properties_initialized(class));
    }
    check_argument_references(table, &mut errors);

    debug!(errors = errors.len(), "validation done");
    into_result((), errors)
}

// =============================================================================
// Type discriminators
// =============================================================================

/// An interface used as a property type with more than one implementer can
/// only be de-serialized if every implementer carries its model type.
fn check_type_discriminators(table: &SymbolTable, errors: &mut Vec<Diagnostic>) {
    let used = collect_interfaces_in_properties(table);
    let implementers = map_interface_implementers(table);

    for (interface_id, interface) in table.interfaces() {
        if !used.contains(&interface_id) {
            continue;
        }
        let Some(classes) = implementers.get(&interface_id) else {
            continue;
        };
        if classes.len() < 2 {
            continue;
        }
        for class in classes.iter().filter_map(|id| table.get(*id)).filter_map(Symbol::as_class) {
            if !class.serialization.with_model_type {
                errors.push(Diagnostic::consistency(
                    class.span,
                    format!(
                        "The class {} needs to have serialization setting with_model_type set \
                         since it is among the concrete classes of the abstract class {}. \
                         Otherwise, the abstract class {} can not be de/serialized properly.",
                        class.name, interface.name, interface.name
                    ),
                ));
            }
        }
    }
}

// =============================================================================
// Contract calls
// =============================================================================

struct ContractChecker<'t> {
    table: &'t SymbolTable,
    errors: Vec<Diagnostic>,
}

impl ContractChecker<'_> {
    fn report(&mut self, call: &Expr, message: String) {
        self.errors.push(Diagnostic::consistency(call.span, message));
    }
}

impl Visitor for ContractChecker<'_> {
    fn visit_function_call(&mut self, call: &Expr, name: &str, arguments: &[Expr]) {
        let expected = if let Some(function) = self.table.verification_function_by_name(name) {
            function.arguments.len()
        } else if name == "len" {
            1
        } else {
            self.report(call, format!("The handling of the function is not implemented: {name:?}"));
            return;
        };

        if arguments.len() != expected {
            self.report(
                call,
                format!(
                    "Expected exactly {expected} arguments to a function call to {name:?}, \
                     but got: {}",
                    arguments.len()
                ),
            );
        }

        for argument in arguments {
            self.visit_expr(argument);
        }
    }
}

fn check_contract_calls(table: &SymbolTable, errors: &mut Vec<Diagnostic>) {
    let mut checker = ContractChecker {
        table,
        errors: Vec::new(),
    };

    for function in &table.verification_functions {
        for body in function.contracts.bodies() {
            checker.visit_expr(body);
        }
    }

    for (_, symbol) in table.iter() {
        match symbol {
            Symbol::Enumeration(_) => {}
            Symbol::Interface(interface) => {
                for signature in &interface.signatures {
                    for body in signature.contracts.bodies() {
                        checker.visit_expr(body);
                    }
                }
            }
            Symbol::Class(class) => {
                for method in &class.methods {
                    for body in method.contracts.bodies() {
                        checker.visit_expr(body);
                    }
                }
                for body in class.constructor.contracts.bodies() {
                    checker.visit_expr(body);
                }
            }
        }
        for invariant in symbol.invariants() {
            checker.visit_expr(&invariant.body);
        }
    }

    // Inherited contracts and invariants are checked once per descendant
    dedup(&mut checker.errors);
    errors.append(&mut checker.errors);
}

// =============================================================================
// Initialization
// =============================================================================

/// Every non-optional property must be set by the in-lined constructor,
/// either from a non-optional argument or with a structural default.
///
/// Classes with an implementation-specific constructor are exempt.
pub fn check_all_non_optional_properties_initialized(class: &Class) -> Vec<Diagnostic> {
    if class.is_implementation_specific || class.constructor.is_implementation_specific {
        return Vec::new();
    }

    let properties = class.properties_by_name();
    let mut initialized: FxHashSet<&str> = FxHashSet::default();

    for statement in &class.constructor.statements {
        let Some(property) = properties.get(statement.name.as_str()) else {
            continue;
        };

        if property.type_annotation.is_optional() {
            initialized.insert(property.name.as_str());
            continue;
        }

        let argument_is_mandatory = class
            .constructor
            .argument_by_name(&statement.argument)
            .is_some_and(|argument| !argument.type_annotation.is_optional());

        let has_structural_default = matches!(
            statement.default,
            Some(StructuralDefault::EmptyList | StructuralDefault::EnumLiteral { .. })
        );

        if argument_is_mandatory || has_structural_default {
            initialized.insert(property.name.as_str());
        }
    }

    class
        .properties
        .iter()
        .filter(|property| !property.type_annotation.is_optional())
        .filter(|property| !initialized.contains(property.name.as_str()))
        .map(|property| {
            Diagnostic::initialization(
                property.span,
                format!(
                    "The property {:?} is not properly initialized \
                     in the constructor of the class {:?}.",
                    property.name, class.name
                ),
            )
        })
        .collect()
}

// =============================================================================
// Argument references in docstrings
// =============================================================================

fn check_argument_references(table: &SymbolTable, errors: &mut Vec<Diagnostic>) {
    let mut check = |name: &str, description: Option<&Description>, arguments: &[Argument]| {
        let Some(description) = description else {
            return;
        };
        for (argument, span) in description.argument_references() {
            if !arguments.iter().any(|candidate| candidate.name == argument) {
                errors.push(Diagnostic::documentation(
                    span,
                    format!(
                        "The argument referenced in the docstring \
                         is not an argument of {name:?}: {argument:?}"
                    ),
                ));
            }
        }
    };

    for function in &table.verification_functions {
        check(&function.name, function.description.as_ref(), &function.arguments);
    }

    for (_, symbol) in table.iter() {
        match symbol {
            Symbol::Enumeration(_) => {}
            Symbol::Interface(interface) => {
                for signature in &interface.signatures {
                    check(&signature.name, signature.description.as_ref(), &signature.arguments);
                }
            }
            Symbol::Class(class) => {
                for method in &class.methods {
                    check(&method.name, method.description.as_ref(), &method.arguments);
                }
                check(
                    "__init__",
                    class.constructor.description.as_ref(),
                    &class.constructor.arguments,
                );
            }
        }
    }
}
