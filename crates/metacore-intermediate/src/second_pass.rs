//! Second pass of the translation: resolution of placeholders.
//!
//! A read-only [`SymbolRegistry`] is snapshotted from the table built by the
//! first pass. Each sweep then walks the symbols mutably and replaces the
//! placeholders it is responsible for, looking targets up only in the
//! registry. All sweeps run even if an earlier one failed so that every
//! error of the pass is reported at once.

use crate::doc::{AttributeReference, Description, DocElement};
use crate::lookups::map_interface_implementers;
use crate::types::{
    Argument, DefaultValue, Link, StructuralDefault, Symbol, SymbolId, SymbolKind, SymbolTable,
    TypeAnnotation,
};
use metacore_common::diagnostics::{dedup, into_result};
use metacore_common::{Diagnostic, Span, is_identifier};
use metacore_parse::{ExprKind, ParsedDefault};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

// =============================================================================
// Registry
// =============================================================================

/// What the sweeps need to know about the symbols, detached from the table
/// so that the table can be mutated while looking things up.
struct SymbolRegistry {
    ids: FxHashMap<String, SymbolId>,
    names: Vec<String>,
    kinds: Vec<SymbolKind>,
    /// `(name, value)` of every literal, empty for non-enumerations.
    literals: Vec<Vec<(String, String)>>,
    /// Property names, empty for enumerations.
    properties: Vec<Vec<String>>,
}

impl SymbolRegistry {
    fn snapshot(table: &SymbolTable) -> Self {
        let len = table.symbols.len();
        let mut registry = Self {
            ids: FxHashMap::default(),
            names: Vec::with_capacity(len),
            kinds: Vec::with_capacity(len),
            literals: Vec::with_capacity(len),
            properties: Vec::with_capacity(len),
        };

        for (id, symbol) in table.iter() {
            registry.ids.insert(symbol.name().to_string(), id);
            registry.names.push(symbol.name().to_string());
            registry.kinds.push(symbol.kind());
            registry.literals.push(match symbol {
                Symbol::Enumeration(enumeration) => enumeration
                    .literals
                    .iter()
                    .map(|literal| (literal.name.clone(), literal.value.clone()))
                    .collect(),
                _ => Vec::new(),
            });
            registry.properties.push(
                symbol
                    .properties()
                    .iter()
                    .map(|property| property.name.clone())
                    .collect(),
            );
        }

        registry
    }

    fn id_of(&self, name: &str) -> Option<SymbolId> {
        self.ids.get(name).copied()
    }

    fn name(&self, id: SymbolId) -> &str {
        self.names.get(id.index()).map_or("<unknown>", String::as_str)
    }

    fn kind(&self, id: SymbolId) -> Option<SymbolKind> {
        self.kinds.get(id.index()).copied()
    }

    fn literal(&self, id: SymbolId, name: &str) -> Option<&str> {
        self.literals
            .get(id.index())?
            .iter()
            .find(|(literal, _)| literal == name)
            .map(|(_, value)| value.as_str())
    }

    fn literals(&self, id: SymbolId) -> &[(String, String)] {
        self.literals.get(id.index()).map_or(&[], Vec::as_slice)
    }

    fn has_property(&self, id: SymbolId, name: &str) -> bool {
        self.properties
            .get(id.index())
            .is_some_and(|properties| properties.iter().any(|property| property == name))
    }
}

/// Resolve every placeholder of the table in place.
pub(crate) fn resolve(table: &mut SymbolTable) -> Result<(), Vec<Diagnostic>> {
    let registry = SymbolRegistry::snapshot(table);
    let mut errors = Vec::new();

    resolve_type_annotations(table, &registry, &mut errors);
    resolve_descriptions(table, &registry, &mut errors);
    resolve_defaults(table, &registry, &mut errors);
    resolve_enumeration_supersets(table, &registry, &mut errors);
    resolve_inheritances(table, &registry, &mut errors);
    resolve_property_owners(table, &registry, &mut errors);
    dedup(&mut errors);

    if errors.is_empty() {
        let mut implementers = map_interface_implementers(table);
        for (index, symbol) in table.symbols.values_mut().enumerate() {
            if let Symbol::Interface(interface) = symbol {
                interface.implementers = implementers
                    .remove(&SymbolId(index as u32))
                    .unwrap_or_default();
            }
        }
    }

    debug!(errors = errors.len(), "second pass done");
    into_result((), errors)
}

// =============================================================================
// Sweep 1: type annotations
// =============================================================================

fn resolve_type_annotations(
    table: &mut SymbolTable,
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    let before = errors.len();

    for symbol in table.symbols.values_mut() {
        for annotation in type_annotations_mut(symbol) {
            resolve_annotation(annotation, registry, errors);
        }
    }

    for function in &mut table.verification_functions {
        for argument in &mut function.arguments {
            resolve_annotation(&mut argument.type_annotation, registry, errors);
        }
        if let Some(returns) = &mut function.returns {
            resolve_annotation(returns, registry, errors);
        }
    }

    debug!(errors = errors.len() - before, "type annotations resolved");
}

fn resolve_annotation(
    annotation: &mut TypeAnnotation,
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    for (link, span) in annotation.our_atomic_links_mut() {
        let Link::Placeholder(identifier) = link else {
            continue;
        };

        if !is_identifier(identifier) {
            errors.push(Diagnostic::structural(
                span,
                format!("The symbol is invalid: {identifier:?}"),
            ));
            continue;
        }

        match registry.id_of(identifier) {
            Some(id) => {
                trace!(identifier = %identifier, ?id, "resolved type annotation");
                *link = Link::Resolved(id);
            }
            None => errors.push(Diagnostic::structural(
                span,
                format!(
                    "The symbol with identifier {identifier:?} \
                     is not available in the symbol table."
                ),
            )),
        }
    }
}

fn type_annotations_mut(symbol: &mut Symbol) -> Vec<&mut TypeAnnotation> {
    let mut out = Vec::new();
    match symbol {
        Symbol::Enumeration(_) => {}
        Symbol::Interface(interface) => {
            for property in &mut interface.properties {
                out.push(&mut property.type_annotation);
            }
            for signature in &mut interface.signatures {
                for argument in &mut signature.arguments {
                    out.push(&mut argument.type_annotation);
                }
                if let Some(returns) = &mut signature.returns {
                    out.push(returns);
                }
            }
        }
        Symbol::Class(class) => {
            for property in &mut class.properties {
                out.push(&mut property.type_annotation);
            }
            for method in &mut class.methods {
                for argument in &mut method.arguments {
                    out.push(&mut argument.type_annotation);
                }
                if let Some(returns) = &mut method.returns {
                    out.push(returns);
                }
            }
            for argument in &mut class.constructor.arguments {
                out.push(&mut argument.type_annotation);
            }
        }
    }
    out
}

// =============================================================================
// Sweep 2: documentation references
// =============================================================================

fn resolve_descriptions(
    table: &mut SymbolTable,
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    let before = errors.len();

    for (index, symbol) in table.symbols.values_mut().enumerate() {
        let context = Some(SymbolId(index as u32));
        for description in descriptions_mut(symbol) {
            resolve_description(description, context, registry, errors);
        }
    }

    for function in &mut table.verification_functions {
        let contracts = &mut function.contracts;
        let descriptions = function.description.iter_mut().chain(
            contracts
                .preconditions
                .iter_mut()
                .chain(contracts.postconditions.iter_mut())
                .filter_map(|contract| contract.description.as_mut()),
        );
        for description in descriptions {
            resolve_description(description, None, registry, errors);
        }
    }

    if let Some(description) = &mut table.meta_model.description {
        resolve_description(description, None, registry, errors);
    }

    debug!(errors = errors.len() - before, "documentation references resolved");
}

fn descriptions_mut(symbol: &mut Symbol) -> Vec<&mut Description> {
    fn push_contracts<'a>(
        contracts: &'a mut crate::types::Contracts,
        out: &mut Vec<&'a mut Description>,
    ) {
        let conditions = contracts
            .preconditions
            .iter_mut()
            .chain(contracts.postconditions.iter_mut());
        for contract in conditions {
            out.extend(contract.description.as_mut());
        }
    }

    let mut out = Vec::new();
    match symbol {
        Symbol::Enumeration(enumeration) => {
            out.extend(enumeration.description.as_mut());
            for literal in &mut enumeration.literals {
                out.extend(literal.description.as_mut());
            }
        }
        Symbol::Interface(interface) => {
            out.extend(interface.description.as_mut());
            for property in &mut interface.properties {
                out.extend(property.description.as_mut());
            }
            for signature in &mut interface.signatures {
                out.extend(signature.description.as_mut());
                push_contracts(&mut signature.contracts, &mut out);
            }
            for invariant in &mut interface.invariants {
                out.extend(invariant.description.as_mut());
            }
        }
        Symbol::Class(class) => {
            out.extend(class.description.as_mut());
            for property in &mut class.properties {
                out.extend(property.description.as_mut());
            }
            for method in &mut class.methods {
                out.extend(method.description.as_mut());
                push_contracts(&mut method.contracts, &mut out);
            }
            out.extend(class.constructor.description.as_mut());
            push_contracts(&mut class.constructor.contracts, &mut out);
            for invariant in &mut class.invariants {
                out.extend(invariant.description.as_mut());
            }
        }
    }
    out
}

fn resolve_description(
    description: &mut Description,
    context: Option<SymbolId>,
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    for element in description.leaves_mut() {
        match element {
            DocElement::SymbolReference {
                symbol: link @ Link::Placeholder(_),
                span,
                ..
            } => {
                if let Link::Placeholder(raw) = &*link {
                    match resolve_symbol_reference(raw, *span, registry) {
                        Ok(id) => *link = Link::Resolved(id),
                        Err(error) => errors.push(error),
                    }
                }
            }
            DocElement::AttributeReference {
                reference: link @ Link::Placeholder(_),
                span,
                ..
            } => {
                if let Link::Placeholder(path) = &*link {
                    match resolve_attribute_reference(path, context, *span, registry) {
                        Ok(reference) => *link = Link::Resolved(reference),
                        Err(error) => errors.push(error),
                    }
                }
            }
            _ => {}
        }
    }
}

fn resolve_symbol_reference(
    raw: &str,
    span: Span,
    registry: &SymbolRegistry,
) -> Result<SymbolId, Diagnostic> {
    let Some(identifier) = raw.strip_prefix('.') else {
        return Err(Diagnostic::documentation(
            span,
            format!(
                "The identifier of the symbol reference is invalid: {raw}; \
                 expected an identifier starting with a dot"
            ),
        ));
    };

    if !is_identifier(identifier) {
        return Err(Diagnostic::documentation(
            span,
            format!("The identifier of the symbol reference is invalid: {identifier}"),
        ));
    }

    let id = registry.id_of(identifier).ok_or_else(|| {
        Diagnostic::documentation(
            span,
            format!(
                "The identifier of the symbol reference \
                 could not be found in the symbol table: {identifier}"
            ),
        )
    })?;
    trace!(identifier, ?id, "resolved symbol reference");
    Ok(id)
}

fn resolve_attribute_reference(
    path: &str,
    context: Option<SymbolId>,
    span: Span,
    registry: &SymbolRegistry,
) -> Result<AttributeReference, Diagnostic> {
    let parts: Vec<&str> = path.split('.').collect();

    if parts.iter().any(|part| !is_identifier(part)) {
        return Err(Diagnostic::documentation(
            span,
            format!(
                "Invalid reference to a property or a literal; each part of the path \
                 needs to be an identifier, but it is not: {path}"
            ),
        ));
    }

    let (symbol, attribute) = match parts.as_slice() {
        [attribute] => {
            let Some(symbol) = context else {
                return Err(Diagnostic::documentation(
                    span,
                    format!(
                        "The attribute reference can not be resolved as there is \
                         no encompassing symbol in the given context: {path}"
                    ),
                ));
            };
            (symbol, *attribute)
        }
        [symbol_name, attribute] => {
            let Some(symbol) = registry.id_of(symbol_name) else {
                return Err(Diagnostic::documentation(
                    span,
                    format!("Dangling reference to a non-existing symbol: {path}"),
                ));
            };
            (symbol, *attribute)
        }
        _ => {
            return Err(Diagnostic::documentation(
                span,
                format!(
                    "We did not implement the resolution of such a reference \
                     to a property or a literal: {path}"
                ),
            ));
        }
    };

    match registry.kind(symbol) {
        Some(SymbolKind::Enumeration) => {
            if registry.literal(symbol, attribute).is_none() {
                return Err(Diagnostic::documentation(
                    span,
                    format!(
                        "Dangling reference to a non-existing literal \
                         in the enumeration {}: {path}",
                        registry.name(symbol)
                    ),
                ));
            }
            Ok(AttributeReference::EnumerationLiteral {
                symbol,
                literal: attribute.to_string(),
            })
        }
        Some(SymbolKind::Interface | SymbolKind::Class) => {
            if !registry.has_property(symbol, attribute) {
                return Err(Diagnostic::documentation(
                    span,
                    format!(
                        "Dangling reference to a non-existing property of a class {}: {path}",
                        registry.name(symbol)
                    ),
                ));
            }
            Ok(AttributeReference::Property {
                symbol,
                property: attribute.to_string(),
            })
        }
        None => Err(Diagnostic::documentation(
            span,
            format!("Dangling reference to a non-existing symbol: {path}"),
        )),
    }
}

// =============================================================================
// Sweep 3: default values
// =============================================================================

fn resolve_defaults(
    table: &mut SymbolTable,
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    let before = errors.len();

    for symbol in table.symbols.values_mut() {
        match symbol {
            Symbol::Enumeration(_) => {}
            Symbol::Interface(interface) => {
                for signature in &mut interface.signatures {
                    resolve_argument_defaults(&mut signature.arguments, registry, errors);
                }
            }
            Symbol::Class(class) => {
                for method in &mut class.methods {
                    resolve_argument_defaults(&mut method.arguments, registry, errors);
                }
                resolve_argument_defaults(&mut class.constructor.arguments, registry, errors);

                for statement in &mut class.constructor.statements {
                    let Some(StructuralDefault::EnumLiteral {
                        enumeration,
                        literal,
                    }) = &mut statement.default
                    else {
                        continue;
                    };
                    let Link::Placeholder(name) = &*enumeration else {
                        continue;
                    };
                    match registry.id_of(name) {
                        Some(id) if registry.literal(id, literal).is_some() => {
                            *enumeration = Link::Resolved(id);
                        }
                        _ => errors.push(Diagnostic::structural(
                            statement.span,
                            format!(
                                "The default value {name}.{literal} of the property {} \
                                 does not refer to a literal of an enumeration",
                                statement.name
                            ),
                        )),
                    }
                }
            }
        }
    }

    for function in &mut table.verification_functions {
        resolve_argument_defaults(&mut function.arguments, registry, errors);
    }

    debug!(errors = errors.len() - before, "default values resolved");
}

fn resolve_argument_defaults(
    arguments: &mut [Argument],
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    for argument in arguments {
        let Some(default) = &mut argument.default else {
            continue;
        };
        let Link::Placeholder(parsed) = &*default else {
            continue;
        };
        match resolve_default(parsed, registry) {
            Ok(value) => *default = Link::Resolved(value),
            Err(error) => errors.push(error),
        }
    }
}

/// A default is either a constant or an enumeration literal `E.L`.
fn resolve_default(
    parsed: &ParsedDefault,
    registry: &SymbolRegistry,
) -> Result<DefaultValue, Diagnostic> {
    let expr = &parsed.expr;
    match &expr.kind {
        ExprKind::Constant { value } => {
            return Ok(DefaultValue::Constant {
                value: value.clone(),
                span: expr.span,
            });
        }
        ExprKind::Member { instance, name } => {
            if let Some(id) = instance.as_name().and_then(|symbol| registry.id_of(symbol)) {
                if registry.kind(id) == Some(SymbolKind::Enumeration)
                    && registry.literal(id, name).is_some()
                {
                    return Ok(DefaultValue::EnumerationLiteral {
                        enumeration: id,
                        literal: name.clone(),
                        span: expr.span,
                    });
                }
            }
        }
        _ => {}
    }

    Err(Diagnostic::structural(
        expr.span,
        "Unsupported default value expression; expected a constant or a literal of an enumeration",
    ))
}

// =============================================================================
// Sweep 4: enumeration supersets
// =============================================================================

fn resolve_enumeration_supersets(
    table: &mut SymbolTable,
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    let before = errors.len();

    for (index, symbol) in table.symbols.values_mut().enumerate() {
        let Symbol::Enumeration(enumeration) = symbol else {
            continue;
        };
        let own = SymbolId(index as u32);

        for link in &mut enumeration.is_superset_of {
            let Link::Placeholder(subset_name) = &*link else {
                continue;
            };

            let Some(subset) = registry.id_of(subset_name) else {
                errors.push(Diagnostic::structural(
                    enumeration.span,
                    format!(
                        "The subset enumeration in is_superset_of \
                         has not been defined: {subset_name}"
                    ),
                ));
                continue;
            };

            if let Some(kind) = registry
                .kind(subset)
                .filter(|kind| *kind != SymbolKind::Enumeration)
            {
                errors.push(Diagnostic::structural(
                    enumeration.span,
                    format!(
                        "An element, {subset_name}, of is_superset_of \
                         is not an enumeration, but: {kind}"
                    ),
                ));
                continue;
            }

            for (literal, subset_value) in registry.literals(subset) {
                match registry.literal(own, literal) {
                    None => errors.push(Diagnostic::structural(
                        enumeration.span,
                        format!(
                            "The literal {literal} from the subset enumeration {subset_name} \
                             is missing in the enumeration {}",
                            enumeration.name
                        ),
                    )),
                    Some(value) if value != subset_value => errors.push(Diagnostic::structural(
                        enumeration.span,
                        format!(
                            "The value {subset_value:?} of the literal {literal} from the subset \
                             enumeration {subset_name} does not equal the value {value:?} of the \
                             literal {literal} in the enumeration {}",
                            enumeration.name
                        ),
                    )),
                    Some(_) => {}
                }
            }

            trace!(enumeration = %enumeration.name, subset = %subset_name, "resolved subset");
            *link = Link::Resolved(subset);
        }
    }

    debug!(errors = errors.len() - before, "enumeration supersets resolved");
}

// =============================================================================
// Sweep 5: interfaces and inheritances
// =============================================================================

fn resolve_inheritances(
    table: &mut SymbolTable,
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    let before = errors.len();

    for symbol in table.symbols.values_mut() {
        let (name, span, links) = match symbol {
            Symbol::Enumeration(_) => continue,
            Symbol::Interface(interface) => {
                (&interface.name, interface.span, &mut interface.inheritances)
            }
            Symbol::Class(class) => (&class.name, class.span, &mut class.interfaces),
        };

        for link in links {
            let Link::Placeholder(base) = &*link else {
                continue;
            };
            match registry.id_of(base) {
                Some(id) if registry.kind(id) == Some(SymbolKind::Interface) => {
                    *link = Link::Resolved(id);
                }
                Some(_) => errors.push(Diagnostic::structural(
                    span,
                    format!(
                        "The symbol {name} inherits from {base}, \
                         which is not an abstract class"
                    ),
                )),
                None => errors.push(Diagnostic::structural(
                    span,
                    format!("The symbol {name} inherits from {base}, which is not defined"),
                )),
            }
        }
    }

    debug!(errors = errors.len() - before, "inheritances resolved");
}

// =============================================================================
// Sweep 6: property owners
// =============================================================================

fn resolve_property_owners(
    table: &mut SymbolTable,
    registry: &SymbolRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    let before = errors.len();

    for symbol in table.symbols.values_mut() {
        let properties = match symbol {
            Symbol::Enumeration(_) => continue,
            Symbol::Interface(interface) => &mut interface.properties,
            Symbol::Class(class) => &mut class.properties,
        };

        for property in properties {
            let Link::Placeholder(owner) = &property.implemented_for else {
                continue;
            };
            match registry.id_of(owner) {
                Some(id) => property.implemented_for = Link::Resolved(id),
                None => errors.push(Diagnostic::structural(
                    property.span,
                    format!(
                        "The symbol {owner} declaring the property {} \
                         is not available in the symbol table",
                        property.name
                    ),
                )),
            }
        }
    }

    debug!(errors = errors.len() - before, "property owners resolved");
}
