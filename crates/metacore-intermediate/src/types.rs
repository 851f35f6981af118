//! Intermediate representation of a meta-model.
//!
//! Symbols live in a single insertion-ordered arena, the [`SymbolTable`].
//! Cross-references between symbols are [`SymbolId`] handles into that arena.
//! During the first pass of the translation the handles are not known yet, so
//! every forward reference is a [`Link::Placeholder`] holding the raw text;
//! the second pass replaces each of them with a [`Link::Resolved`] value.

use crate::doc::Description;
use indexmap::IndexMap;
use metacore_common::Span;
use metacore_parse::{Constant, Expr, ParsedDefault};
use serde::Serialize;
use std::fmt;

// =============================================================================
// Handles and Links
// =============================================================================

/// Index of a symbol in [`SymbolTable::symbols`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A reference which is either still pending or already resolved.
///
/// `P` is whatever the first pass could capture about the target, usually
/// its textual identifier.
#[derive(Clone, Debug, PartialEq)]
pub enum Link<T, P = String> {
    Placeholder(P),
    Resolved(T),
}

impl<T, P> Link<T, P> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Link::Resolved(value) => Some(value),
            Link::Placeholder(_) => None,
        }
    }

    pub fn placeholder(&self) -> Option<&P> {
        match self {
            Link::Placeholder(pending) => Some(pending),
            Link::Resolved(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Link::Placeholder(_))
    }
}

impl<P> Link<SymbolId, P> {
    pub fn id(&self) -> Option<SymbolId> {
        self.resolved().copied()
    }
}

// =============================================================================
// Type Annotations
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinAtomicType {
    Bool,
    Int,
    Float,
    Str,
}

impl BuiltinAtomicType {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "str" => Some(Self::Str),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeAnnotation {
    BuiltinAtomic {
        a_type: BuiltinAtomicType,
        span: Span,
    },
    /// A reference to an enumeration, interface or class of the model.
    OurAtomic {
        symbol: Link<SymbolId>,
        span: Span,
    },
    List {
        items: Box<TypeAnnotation>,
        span: Span,
    },
    Optional {
        value: Box<TypeAnnotation>,
        span: Span,
    },
    /// An indirect reference resolved through the reference association.
    Ref {
        value: Box<TypeAnnotation>,
        span: Span,
    },
}

impl TypeAnnotation {
    pub fn span(&self) -> Span {
        match self {
            Self::BuiltinAtomic { span, .. }
            | Self::OurAtomic { span, .. }
            | Self::List { span, .. }
            | Self::Optional { span, .. }
            | Self::Ref { span, .. } => *span,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional { .. })
    }

    /// Strip a top-level `Optional`.
    pub fn beneath_optional(&self) -> &TypeAnnotation {
        match self {
            Self::Optional { value, .. } => value,
            other => other,
        }
    }

    /// Every `OurAtomic` link in the annotation, outermost first.
    pub fn our_atomic_links(&self) -> Vec<&Link<SymbolId>> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(annotation) = stack.pop() {
            match annotation {
                Self::BuiltinAtomic { .. } => {}
                Self::OurAtomic { symbol, .. } => out.push(symbol),
                Self::List { items: inner, .. }
                | Self::Optional { value: inner, .. }
                | Self::Ref { value: inner, .. } => stack.push(inner),
            }
        }
        out
    }

    pub(crate) fn our_atomic_links_mut(&mut self) -> Vec<(&mut Link<SymbolId>, Span)> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(annotation) = stack.pop() {
            match annotation {
                Self::BuiltinAtomic { .. } => {}
                Self::OurAtomic { symbol, span } => out.push((symbol, *span)),
                Self::List { items: inner, .. }
                | Self::Optional { value: inner, .. }
                | Self::Ref { value: inner, .. } => stack.push(inner),
            }
        }
        out
    }
}

// =============================================================================
// Properties, Arguments and Defaults
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: String,
    pub type_annotation: TypeAnnotation,
    pub description: Option<Description>,
    /// The symbol which textually declared the property.
    pub implemented_for: Link<SymbolId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: String,
    pub type_annotation: TypeAnnotation,
    pub default: Option<Link<DefaultValue, ParsedDefault>>,
    pub span: Span,
}

/// A resolved default value of an argument.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    Constant {
        value: Constant,
        span: Span,
    },
    EnumerationLiteral {
        enumeration: SymbolId,
        literal: String,
        span: Span,
    },
}

fn find_argument<'a>(arguments: &'a [Argument], name: &str) -> Option<&'a Argument> {
    arguments.iter().find(|argument| argument.name == name)
}

// =============================================================================
// Contracts, Methods and Signatures
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contracts {
    pub preconditions: Vec<Contract>,
    pub snapshots: Vec<Snapshot>,
    pub postconditions: Vec<Contract>,
}

impl Contracts {
    /// Append `other` after `self`.
    pub fn stack(&mut self, other: Contracts) {
        self.preconditions.extend(other.preconditions);
        self.snapshots.extend(other.snapshots);
        self.postconditions.extend(other.postconditions);
    }

    /// Bodies of preconditions, postconditions and snapshots.
    pub fn bodies(&self) -> impl Iterator<Item = &Expr> {
        self.preconditions
            .iter()
            .chain(&self.postconditions)
            .map(|contract| &contract.body)
            .chain(self.snapshots.iter().map(|snapshot| &snapshot.body))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Contract {
    pub args: Vec<String>,
    pub description: Option<Description>,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub args: Vec<String>,
    pub name: String,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Invariant {
    pub description: Option<Description>,
    pub body: Expr,
    pub span: Span,
}

/// A method declared by an abstract class.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub returns: Option<TypeAnnotation>,
    pub description: Option<Description>,
    pub contracts: Contracts,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub returns: Option<TypeAnnotation>,
    pub description: Option<Description>,
    pub contracts: Contracts,
    pub is_implementation_specific: bool,
    pub span: Span,
}

impl Signature {
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        find_argument(&self.arguments, name)
    }
}

impl Method {
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        find_argument(&self.arguments, name)
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Default applied when the constructor argument is `None`.
#[derive(Clone, Debug, PartialEq)]
pub enum StructuralDefault {
    EmptyList,
    EnumLiteral {
        enumeration: Link<SymbolId>,
        literal: String,
    },
}

/// `self.<name> = <argument>`, possibly with a structural default.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignArgument {
    /// Name of the assigned property.
    pub name: String,
    /// Name of the constructor argument.
    pub argument: String,
    pub default: Option<StructuralDefault>,
    pub span: Span,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Constructor {
    pub arguments: Vec<Argument>,
    pub contracts: Contracts,
    pub is_implementation_specific: bool,
    pub description: Option<Description>,
    /// In-lined statements; no calls to ancestor constructors remain.
    pub statements: Vec<AssignArgument>,
}

impl Constructor {
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        find_argument(&self.arguments, name)
    }
}

// =============================================================================
// Symbols
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Serialization {
    pub with_model_type: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumerationLiteral {
    pub name: String,
    pub value: String,
    pub description: Option<Description>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enumeration {
    pub name: String,
    pub literals: Vec<EnumerationLiteral>,
    /// Enumerations whose literals must all be present here.
    pub is_superset_of: Vec<Link<SymbolId>>,
    pub description: Option<Description>,
    pub span: Span,
}

impl Enumeration {
    pub fn literal_by_name(&self, name: &str) -> Option<&EnumerationLiteral> {
        self.literals.iter().find(|literal| literal.name == name)
    }
}

/// An abstract class of the model.
#[derive(Clone, Debug, PartialEq)]
pub struct Interface {
    pub name: String,
    pub inheritances: Vec<Link<SymbolId>>,
    pub signatures: Vec<Signature>,
    pub properties: Vec<Property>,
    pub invariants: Vec<Invariant>,
    pub serialization: Serialization,
    /// Concrete classes implementing this interface, directly or through
    /// inherited interfaces. Filled in once the interfaces are resolved.
    pub implementers: Vec<SymbolId>,
    pub description: Option<Description>,
    pub span: Span,
}

impl Interface {
    pub fn property_by_name(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }
}

/// A concrete class of the model.
#[derive(Clone, Debug, PartialEq)]
pub struct Class {
    pub name: String,
    pub interfaces: Vec<Link<SymbolId>>,
    pub is_implementation_specific: bool,
    /// Properties of the ancestors followed by the own ones.
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub constructor: Constructor,
    pub invariants: Vec<Invariant>,
    pub serialization: Serialization,
    pub description: Option<Description>,
    pub span: Span,
}

impl Class {
    pub fn property_by_name(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn properties_by_name(&self) -> IndexMap<&str, &Property> {
        self.properties
            .iter()
            .map(|property| (property.name.as_str(), property))
            .collect()
    }

    pub fn method_by_name(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Symbol {
    Enumeration(Enumeration),
    Interface(Interface),
    Class(Class),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Enumeration,
    Interface,
    Class,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Enumeration => "enumeration",
            SymbolKind::Interface => "interface",
            SymbolKind::Class => "class",
        })
    }
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Enumeration(enumeration) => &enumeration.name,
            Symbol::Interface(interface) => &interface.name,
            Symbol::Class(class) => &class.name,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Enumeration(_) => SymbolKind::Enumeration,
            Symbol::Interface(_) => SymbolKind::Interface,
            Symbol::Class(_) => SymbolKind::Class,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Symbol::Enumeration(enumeration) => enumeration.span,
            Symbol::Interface(interface) => interface.span,
            Symbol::Class(class) => class.span,
        }
    }

    pub fn description(&self) -> Option<&Description> {
        match self {
            Symbol::Enumeration(enumeration) => enumeration.description.as_ref(),
            Symbol::Interface(interface) => interface.description.as_ref(),
            Symbol::Class(class) => class.description.as_ref(),
        }
    }

    /// Properties of a class or an interface; enumerations have none.
    pub fn properties(&self) -> &[Property] {
        match self {
            Symbol::Enumeration(_) => &[],
            Symbol::Interface(interface) => &interface.properties,
            Symbol::Class(class) => &class.properties,
        }
    }

    pub fn invariants(&self) -> &[Invariant] {
        match self {
            Symbol::Enumeration(_) => &[],
            Symbol::Interface(interface) => &interface.invariants,
            Symbol::Class(class) => &class.invariants,
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Symbol::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&Interface> {
        match self {
            Symbol::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&Enumeration> {
        match self {
            Symbol::Enumeration(enumeration) => Some(enumeration),
            _ => None,
        }
    }
}

// =============================================================================
// Verification Functions
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    /// The body has to be written by hand for every target.
    ImplementationSpecific,
    /// The function checks its argument against a regular expression.
    Pattern { pattern: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct VerificationFunction {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub returns: Option<TypeAnnotation>,
    pub description: Option<Description>,
    pub contracts: Contracts,
    pub verification: Verification,
    pub span: Span,
}

impl VerificationFunction {
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        find_argument(&self.arguments, name)
    }

    pub fn pattern(&self) -> Option<&str> {
        match &self.verification {
            Verification::Pattern { pattern } => Some(pattern),
            Verification::ImplementationSpecific => None,
        }
    }
}

// =============================================================================
// Symbol Table
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetaModel {
    pub book_url: String,
    pub book_version: String,
    pub description: Option<Description>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTable {
    /// Symbols keyed by name, in declaration order.
    pub symbols: IndexMap<String, Symbol>,
    pub verification_functions: Vec<VerificationFunction>,
    /// The class every `Ref[...]` is resolved through.
    pub ref_association: SymbolId,
    pub meta_model: MetaModel,
}

impl SymbolTable {
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get_index(id.index()).map(|(_, symbol)| symbol)
    }

    pub fn id_of(&self, name: &str) -> Option<SymbolId> {
        self.symbols
            .get_index_of(name)
            .map(|index| SymbolId(index as u32))
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn find_class(&self, name: &str) -> Option<&Class> {
        self.find(name).and_then(Symbol::as_class)
    }

    pub fn find_interface(&self, name: &str) -> Option<&Interface> {
        self.find(name).and_then(Symbol::as_interface)
    }

    pub fn find_enumeration(&self, name: &str) -> Option<&Enumeration> {
        self.find(name).and_then(Symbol::as_enumeration)
    }

    /// Name of the symbol behind `id`, or `"<unknown>"` for a foreign handle.
    pub fn name_of(&self, id: SymbolId) -> &str {
        self.symbols
            .get_index(id.index())
            .map_or("<unknown>", |(name, _)| name.as_str())
    }

    pub fn verification_function_by_name(&self, name: &str) -> Option<&VerificationFunction> {
        self.verification_functions
            .iter()
            .find(|function| function.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .values()
            .enumerate()
            .map(|(index, symbol)| (SymbolId(index as u32), symbol))
    }

    pub fn classes(&self) -> impl Iterator<Item = (SymbolId, &Class)> {
        self.iter()
            .filter_map(|(id, symbol)| symbol.as_class().map(|class| (id, class)))
    }

    pub fn interfaces(&self) -> impl Iterator<Item = (SymbolId, &Interface)> {
        self.iter().filter_map(|(id, symbol)| {
            symbol.as_interface().map(|interface| (id, interface))
        })
    }
}
