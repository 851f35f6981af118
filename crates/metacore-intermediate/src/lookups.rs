//! Lookups derived from a resolved symbol table.

use crate::doc::{Description, DocElement};
use crate::types::{
    Argument, Class, Enumeration, Interface, Link, StructuralDefault, Symbol, SymbolId, SymbolKind,
    SymbolTable, TypeAnnotation,
};
use metacore_common::{Diagnostic, Span};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

// =============================================================================
// Typed getters
// =============================================================================

impl SymbolTable {
    /// Find a symbol which must exist, e.g. because an earlier stage checked it.
    pub fn must_find(&self, name: &str) -> Result<&Symbol, Diagnostic> {
        self.find(name).ok_or_else(|| {
            Diagnostic::structural(
                Span::dummy(),
                format!("The symbol {name} could not be found in the symbol table"),
            )
        })
    }

    pub fn must_find_class(&self, name: &str) -> Result<&Class, Diagnostic> {
        let symbol = self.must_find(name)?;
        symbol.as_class().ok_or_else(|| unexpected_kind(symbol, SymbolKind::Class))
    }

    pub fn must_find_interface(&self, name: &str) -> Result<&Interface, Diagnostic> {
        let symbol = self.must_find(name)?;
        symbol
            .as_interface()
            .ok_or_else(|| unexpected_kind(symbol, SymbolKind::Interface))
    }

    pub fn must_find_enumeration(&self, name: &str) -> Result<&Enumeration, Diagnostic> {
        let symbol = self.must_find(name)?;
        symbol
            .as_enumeration()
            .ok_or_else(|| unexpected_kind(symbol, SymbolKind::Enumeration))
    }

    /// The class every `Ref[...]` is resolved through.
    pub fn ref_association(&self) -> Option<&Class> {
        self.get(self.ref_association).and_then(Symbol::as_class)
    }
}

fn unexpected_kind(symbol: &Symbol, expected: SymbolKind) -> Diagnostic {
    Diagnostic::structural(
        symbol.span(),
        format!(
            "Expected the symbol {} to be of kind {expected}, but it is of kind {}",
            symbol.name(),
            symbol.kind()
        ),
    )
}

// =============================================================================
// Interfaces
// =============================================================================

/// Concrete classes implementing each interface, directly or through the
/// interfaces it is inherited by. Classes are listed in table order.
pub fn map_interface_implementers(table: &SymbolTable) -> FxHashMap<SymbolId, Vec<SymbolId>> {
    let mut implementers: FxHashMap<SymbolId, Vec<SymbolId>> = FxHashMap::default();

    for (class_id, class) in table.classes() {
        let mut stack: Vec<SymbolId> = class.interfaces.iter().filter_map(Link::id).collect();
        let mut seen: FxHashSet<SymbolId> = FxHashSet::default();

        while let Some(interface_id) = stack.pop() {
            if !seen.insert(interface_id) {
                continue;
            }
            implementers.entry(interface_id).or_default().push(class_id);
            if let Some(interface) = table.get(interface_id).and_then(Symbol::as_interface) {
                stack.extend(interface.inheritances.iter().filter_map(Link::id));
            }
        }
    }

    implementers
}

/// Interfaces used as a type of some property, possibly nested in a list,
/// an optional or a reference.
pub fn collect_interfaces_in_properties(table: &SymbolTable) -> FxHashSet<SymbolId> {
    table
        .iter()
        .flat_map(|(_, symbol)| symbol.properties())
        .flat_map(|property| property.type_annotation.our_atomic_links())
        .filter_map(Link::id)
        .filter(|id| matches!(table.get(*id), Some(Symbol::Interface(_))))
        .collect()
}

// =============================================================================
// Unresolved references
// =============================================================================

/// A placeholder which is still reachable from the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Symbol or verification function holding the placeholder.
    pub owner: String,
    pub what: &'static str,
    pub text: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: unresolved {} {:?}", self.owner, self.what, self.text)
    }
}

impl SymbolTable {
    /// Every placeholder reachable from the table. Empty once the
    /// translation succeeded.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut out = Vec::new();

        for (_, symbol) in self.iter() {
            let owner = symbol.name();
            let mut report = |what: &'static str, text: &str| {
                out.push(UnresolvedReference {
                    owner: owner.to_string(),
                    what,
                    text: text.to_string(),
                });
            };

            for annotation in symbol_type_annotations(symbol) {
                unresolved_in_annotation(annotation, &mut report);
            }
            for argument in symbol_arguments(symbol) {
                unresolved_in_argument(argument, &mut report);
            }
            for description in symbol_descriptions(symbol) {
                unresolved_in_description(description, &mut report);
            }
            for property in symbol.properties() {
                if let Link::Placeholder(text) = &property.implemented_for {
                    report("property owner", text);
                }
            }

            match symbol {
                Symbol::Enumeration(enumeration) => {
                    for subset in &enumeration.is_superset_of {
                        if let Link::Placeholder(text) = subset {
                            report("subset enumeration", text);
                        }
                    }
                }
                Symbol::Interface(interface) => {
                    for base in &interface.inheritances {
                        if let Link::Placeholder(text) = base {
                            report("inheritance", text);
                        }
                    }
                }
                Symbol::Class(class) => {
                    for interface in &class.interfaces {
                        if let Link::Placeholder(text) = interface {
                            report("interface", text);
                        }
                    }
                    for statement in &class.constructor.statements {
                        if let Some(StructuralDefault::EnumLiteral {
                            enumeration: Link::Placeholder(text),
                            ..
                        }) = &statement.default
                        {
                            report("structural default", text);
                        }
                    }
                }
            }
        }

        for function in &self.verification_functions {
            let mut report = |what: &'static str, text: &str| {
                out.push(UnresolvedReference {
                    owner: function.name.clone(),
                    what,
                    text: text.to_string(),
                });
            };
            for argument in &function.arguments {
                unresolved_in_annotation(&argument.type_annotation, &mut report);
                unresolved_in_argument(argument, &mut report);
            }
            if let Some(returns) = &function.returns {
                unresolved_in_annotation(returns, &mut report);
            }
            let descriptions = function
                .description
                .iter()
                .chain(contract_descriptions(&function.contracts));
            for description in descriptions {
                unresolved_in_description(description, &mut report);
            }
        }

        if let Some(description) = &self.meta_model.description {
            let mut report = |what: &'static str, text: &str| {
                out.push(UnresolvedReference {
                    owner: "<meta-model>".to_string(),
                    what,
                    text: text.to_string(),
                });
            };
            unresolved_in_description(description, &mut report);
        }

        out
    }
}

fn unresolved_in_annotation(
    annotation: &TypeAnnotation,
    report: &mut impl FnMut(&'static str, &str),
) {
    for link in annotation.our_atomic_links() {
        if let Link::Placeholder(text) = link {
            report("type annotation", text);
        }
    }
}

fn unresolved_in_argument(argument: &Argument, report: &mut impl FnMut(&'static str, &str)) {
    if let Some(Link::Placeholder(_)) = &argument.default {
        report("default value", &argument.name);
    }
}

fn unresolved_in_description(
    description: &Description,
    report: &mut impl FnMut(&'static str, &str),
) {
    for element in description.walk() {
        match element {
            DocElement::SymbolReference {
                symbol: Link::Placeholder(text),
                ..
            } => report("symbol reference", text),
            DocElement::AttributeReference {
                reference: Link::Placeholder(text),
                ..
            } => report("attribute reference", text),
            _ => {}
        }
    }
}

// =============================================================================
// Traversal helpers
// =============================================================================

/// Type annotations of properties, arguments and return values.
pub(crate) fn symbol_type_annotations(symbol: &Symbol) -> Vec<&TypeAnnotation> {
    let mut out = Vec::new();
    for property in symbol.properties() {
        out.push(&property.type_annotation);
    }
    for argument in symbol_arguments(symbol) {
        out.push(&argument.type_annotation);
    }
    match symbol {
        Symbol::Enumeration(_) => {}
        Symbol::Interface(interface) => {
            out.extend(
                interface
                    .signatures
                    .iter()
                    .filter_map(|signature| signature.returns.as_ref()),
            );
        }
        Symbol::Class(class) => {
            out.extend(class.methods.iter().filter_map(|method| method.returns.as_ref()));
        }
    }
    out
}

/// Arguments of methods, signatures and the constructor.
pub(crate) fn symbol_arguments(symbol: &Symbol) -> Vec<&Argument> {
    match symbol {
        Symbol::Enumeration(_) => Vec::new(),
        Symbol::Interface(interface) => interface
            .signatures
            .iter()
            .flat_map(|signature| &signature.arguments)
            .collect(),
        Symbol::Class(class) => class
            .methods
            .iter()
            .flat_map(|method| &method.arguments)
            .chain(&class.constructor.arguments)
            .collect(),
    }
}

fn contract_descriptions(
    contracts: &crate::types::Contracts,
) -> impl Iterator<Item = &Description> {
    contracts
        .preconditions
        .iter()
        .chain(&contracts.postconditions)
        .filter_map(|contract| contract.description.as_ref())
}

/// Every description attached to the symbol or one of its members.
pub(crate) fn symbol_descriptions(symbol: &Symbol) -> Vec<&Description> {
    let mut out: Vec<&Description> = symbol.description().into_iter().collect();
    out.extend(symbol.properties().iter().filter_map(|property| property.description.as_ref()));
    out.extend(symbol.invariants().iter().filter_map(|invariant| invariant.description.as_ref()));
    match symbol {
        Symbol::Enumeration(enumeration) => {
            out.extend(
                enumeration
                    .literals
                    .iter()
                    .filter_map(|literal| literal.description.as_ref()),
            );
        }
        Symbol::Interface(interface) => {
            for signature in &interface.signatures {
                out.extend(signature.description.as_ref());
                out.extend(contract_descriptions(&signature.contracts));
            }
        }
        Symbol::Class(class) => {
            for method in &class.methods {
                out.extend(method.description.as_ref());
                out.extend(contract_descriptions(&method.contracts));
            }
            out.extend(class.constructor.description.as_ref());
            out.extend(contract_descriptions(&class.constructor.contracts));
        }
    }
    out
}
