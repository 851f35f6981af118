//! Class hierarchy as an ontology.
//!
//! The classes of a parsed model are linearized so that every ancestor comes
//! before its descendants. Later stages rely on this order: constructors are
//! in-lined and serialization settings propagated by walking it front to back.

use metacore_common::Diagnostic;
use metacore_common::diagnostics::into_result;
use metacore_parse::{ParsedClass, ParsedSymbol, ParsedSymbolTable};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Ancestors of a class, most general first.
pub type Ancestors<'a> = SmallVec<[&'a ParsedClass; 4]>;

/// The linearized class hierarchy of a parsed model.
#[derive(Debug)]
pub struct Ontology<'a> {
    /// Classes in topological order: ancestors precede descendants.
    classes: Vec<&'a ParsedClass>,
    ancestors: FxHashMap<&'a str, Ancestors<'a>>,
    descendants: FxHashMap<&'a str, Vec<&'a ParsedClass>>,
}

impl<'a> Ontology<'a> {
    pub fn classes(&self) -> &[&'a ParsedClass] {
        &self.classes
    }

    /// Ancestors of the class with the given name, each listed once, most
    /// general first. Unknown classes have no ancestors.
    pub fn list_ancestors(&self, name: &str) -> &[&'a ParsedClass] {
        self.ancestors.get(name).map_or(&[], |ancestors| ancestors.as_slice())
    }

    /// Descendants of the class with the given name in topological order.
    pub fn list_descendants(&self, name: &str) -> &[&'a ParsedClass] {
        self.descendants.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether each class has at least one descendant.
    pub fn map_descendability(&self) -> FxHashMap<&'a str, bool> {
        self.classes
            .iter()
            .map(|class| {
                let has_descendants = self
                    .descendants
                    .get(class.name.as_str())
                    .is_some_and(|descendants| !descendants.is_empty());
                (class.name.as_str(), has_descendants)
            })
            .collect()
    }

    /// Position of the class in the topological order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|class| class.name == name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Linearize the classes of the parsed symbol table.
///
/// Duplicate symbol names, dangling or invalid bases, cycles and properties
/// or methods redefined in a descendant are all reported together.
pub fn map_symbol_table_to_ontology(
    parsed: &ParsedSymbolTable,
) -> Result<Ontology<'_>, Vec<Diagnostic>> {
    let mut errors = Vec::new();

    // =========================================================================
    // Symbol names and inheritance edges
    // =========================================================================

    let mut seen_names: FxHashSet<&str> = FxHashSet::default();
    for symbol in &parsed.symbols {
        if !seen_names.insert(symbol.name()) {
            errors.push(Diagnostic::structural(
                symbol.span(),
                format!("The symbol {} has been defined more than once", symbol.name()),
            ));
        }
    }

    let by_name: FxHashMap<&str, &ParsedSymbol> = parsed
        .symbols
        .iter()
        .map(|symbol| (symbol.name(), symbol))
        .collect();

    let classes: Vec<&ParsedClass> = parsed.classes().collect();

    for class in &classes {
        for base in &class.inheritances {
            match by_name.get(base.as_str()) {
                None => errors.push(Diagnostic::structural(
                    class.span,
                    format!(
                        "The class {} inherits from {}, but {} is not defined",
                        class.name, base, base
                    ),
                )),
                Some(ParsedSymbol::Enumeration(_)) => errors.push(Diagnostic::structural(
                    class.span,
                    format!(
                        "The class {} inherits from {}, but {} is an enumeration",
                        class.name, base, base
                    ),
                )),
                Some(ParsedSymbol::Class(parent)) if !parent.is_abstract => {
                    errors.push(Diagnostic::structural(
                        class.span,
                        format!(
                            "The class {} inherits from the concrete class {}; \
                             only abstract classes can be inherited from",
                            class.name, base
                        ),
                    ));
                }
                Some(ParsedSymbol::Class(_)) => {}
            }
        }
    }

    if !errors.is_empty() {
        debug!(errors = errors.len(), "invalid inheritance edges");
        return Err(errors);
    }

    // =========================================================================
    // Topological order
    // =========================================================================

    let class_by_name: FxHashMap<&str, &ParsedClass> = classes
        .iter()
        .map(|class| (class.name.as_str(), *class))
        .collect();

    let mut marks: FxHashMap<&str, Mark> = FxHashMap::default();
    let mut order: Vec<&ParsedClass> = Vec::with_capacity(classes.len());
    let mut in_cycle: FxHashSet<&str> = FxHashSet::default();

    for &class in &classes {
        visit(
            class,
            &class_by_name,
            &mut marks,
            &mut order,
            &mut in_cycle,
            &mut errors,
        );
    }

    if !errors.is_empty() {
        debug!(errors = errors.len(), "cycles in the inheritance");
        return Err(errors);
    }

    // =========================================================================
    // Ancestors and descendants
    // =========================================================================

    let mut ancestors: FxHashMap<&str, Ancestors<'_>> = FxHashMap::default();
    for class in &order {
        let mut own: Ancestors<'_> = SmallVec::new();
        for base in &class.inheritances {
            let Some(parent) = class_by_name.get(base.as_str()) else {
                continue;
            };
            let inherited = ancestors.get(base.as_str()).cloned().unwrap_or_default();
            for ancestor in inherited.into_iter().chain(std::iter::once(*parent)) {
                if !own.iter().any(|known| known.name == ancestor.name) {
                    own.push(ancestor);
                }
            }
        }
        trace!(class = %class.name, ancestors = own.len(), "linearized");
        ancestors.insert(class.name.as_str(), own);
    }

    let mut descendants: FxHashMap<&str, Vec<&ParsedClass>> = FxHashMap::default();
    for &class in &order {
        for ancestor in ancestors.get(class.name.as_str()).into_iter().flatten() {
            descendants
                .entry(ancestor.name.as_str())
                .or_default()
                .push(class);
        }
    }

    // =========================================================================
    // Redefinitions
    // =========================================================================

    for class in &order {
        let class_ancestors = ancestors.get(class.name.as_str()).map_or(&[][..], |a| a.as_slice());

        for property in &class.properties {
            if let Some(ancestor) = class_ancestors
                .iter()
                .find(|ancestor| ancestor.find_property(&property.name).is_some())
            {
                errors.push(Diagnostic::structural(
                    property.span,
                    format!(
                        "The property has already been defined in the ancestor class {}: {}",
                        ancestor.name, property.name
                    ),
                ));
            }
        }

        for method in &class.methods {
            if let Some(ancestor) = class_ancestors.iter().find(|ancestor| {
                ancestor
                    .methods
                    .iter()
                    .any(|candidate| candidate.name == method.name)
            }) {
                errors.push(Diagnostic::structural(
                    method.span,
                    format!(
                        "The method has already been defined in the ancestor class {}: {}",
                        ancestor.name, method.name
                    ),
                ));
            }
        }
    }

    debug!(classes = order.len(), "ontology built");

    into_result(
        Ontology {
            classes: order,
            ancestors,
            descendants,
        },
        errors,
    )
}

fn visit<'a>(
    class: &'a ParsedClass,
    class_by_name: &FxHashMap<&'a str, &'a ParsedClass>,
    marks: &mut FxHashMap<&'a str, Mark>,
    order: &mut Vec<&'a ParsedClass>,
    in_cycle: &mut FxHashSet<&'a str>,
    errors: &mut Vec<Diagnostic>,
) {
    match marks.get(class.name.as_str()) {
        Some(Mark::Done) => return,
        Some(Mark::Visiting) => {
            if in_cycle.insert(class.name.as_str()) {
                errors.push(Diagnostic::structural(
                    class.span,
                    format!(
                        "Expected no cycles in the inheritance, \
                         but the class {} has been observed in a cycle",
                        class.name
                    ),
                ));
            }
            return;
        }
        None => {}
    }

    marks.insert(class.name.as_str(), Mark::Visiting);
    for base in &class.inheritances {
        if let Some(&parent) = class_by_name.get(base.as_str()) {
            visit(parent, class_by_name, marks, order, in_cycle, errors);
        }
    }
    marks.insert(class.name.as_str(), Mark::Done);
    order.push(class);
}
