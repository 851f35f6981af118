//! Parsed symbols.
//!
//! These are the loosely-linked definitions a parser hands over: inheritance,
//! type references and defaults are still bare identifiers or unevaluated
//! expressions. The builder-style methods are used to assemble models in code
//! (tests, embedders) instead of going through JSON.

use crate::doc::ParsedDescription;
use crate::expr::Expr;
use crate::type_annotation::ParsedTypeAnnotation;
use metacore_common::Span;
use serde::{Deserialize, Serialize};

// =============================================================================
// Symbol Table
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedSymbolTable {
    pub symbols: Vec<ParsedSymbol>,
    #[serde(default)]
    pub verification_functions: Vec<ParsedFunction>,
    /// Name of the class every `Ref[...]` property is resolved through.
    pub ref_association: String,
    #[serde(default)]
    pub meta_model: ParsedMetaModel,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedMetaModel {
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    #[serde(default)]
    pub book_url: String,
    #[serde(default)]
    pub book_version: String,
}

impl ParsedSymbolTable {
    pub fn new(ref_association: impl Into<String>) -> Self {
        Self {
            symbols: Vec::new(),
            verification_functions: Vec::new(),
            ref_association: ref_association.into(),
            meta_model: ParsedMetaModel::default(),
        }
    }

    pub fn symbol(mut self, symbol: impl Into<ParsedSymbol>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    pub fn verification_function(mut self, function: ParsedFunction) -> Self {
        self.verification_functions.push(function);
        self
    }

    pub fn meta_model(mut self, meta_model: ParsedMetaModel) -> Self {
        self.meta_model = meta_model;
        self
    }

    /// First symbol with the given name.
    pub fn find(&self, name: &str) -> Option<&ParsedSymbol> {
        self.symbols.iter().find(|symbol| symbol.name() == name)
    }

    pub fn find_class(&self, name: &str) -> Option<&ParsedClass> {
        self.find(name).and_then(ParsedSymbol::as_class)
    }

    pub fn find_enumeration(&self, name: &str) -> Option<&ParsedEnumeration> {
        self.find(name).and_then(ParsedSymbol::as_enumeration)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ParsedClass> {
        self.symbols.iter().filter_map(ParsedSymbol::as_class)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedSymbol {
    Enumeration(ParsedEnumeration),
    Class(ParsedClass),
}

impl ParsedSymbol {
    pub fn name(&self) -> &str {
        match self {
            ParsedSymbol::Enumeration(enumeration) => &enumeration.name,
            ParsedSymbol::Class(class) => &class.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParsedSymbol::Enumeration(enumeration) => enumeration.span,
            ParsedSymbol::Class(class) => class.span,
        }
    }

    pub fn as_class(&self) -> Option<&ParsedClass> {
        match self {
            ParsedSymbol::Class(class) => Some(class),
            ParsedSymbol::Enumeration(_) => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&ParsedEnumeration> {
        match self {
            ParsedSymbol::Enumeration(enumeration) => Some(enumeration),
            ParsedSymbol::Class(_) => None,
        }
    }
}

impl From<ParsedClass> for ParsedSymbol {
    fn from(class: ParsedClass) -> Self {
        ParsedSymbol::Class(class)
    }
}

impl From<ParsedEnumeration> for ParsedSymbol {
    fn from(enumeration: ParsedEnumeration) -> Self {
        ParsedSymbol::Enumeration(enumeration)
    }
}

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedEnumeration {
    pub name: String,
    pub literals: Vec<ParsedLiteral>,
    #[serde(default)]
    pub is_superset_of: Vec<String>,
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedLiteral {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    #[serde(default)]
    pub span: Span,
}

impl ParsedEnumeration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            literals: Vec::new(),
            is_superset_of: Vec::new(),
            description: None,
            span: Span::dummy(),
        }
    }

    pub fn literal(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.literals.push(ParsedLiteral {
            name: name.into(),
            value: value.into(),
            description: None,
            span: Span::dummy(),
        });
        self
    }

    pub fn superset_of(mut self, subset: impl Into<String>) -> Self {
        self.is_superset_of.push(subset.into());
        self
    }

    pub fn described(mut self, description: ParsedDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn has_literal(&self, name: &str) -> bool {
        self.literals.iter().any(|literal| literal.name == name)
    }
}

// =============================================================================
// Classes
// =============================================================================

/// A class of the meta-model. Abstract classes act as interfaces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedClass {
    pub name: String,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_implementation_specific: bool,
    #[serde(default)]
    pub inheritances: Vec<String>,
    #[serde(default)]
    pub properties: Vec<ParsedProperty>,
    #[serde(default)]
    pub methods: Vec<ParsedMethod>,
    #[serde(default)]
    pub constructor: Option<ParsedConstructor>,
    #[serde(default)]
    pub invariants: Vec<ParsedInvariant>,
    #[serde(default)]
    pub serialization: Option<ParsedSerialization>,
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSerialization {
    #[serde(default)]
    pub with_model_type: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedProperty {
    pub name: String,
    pub type_annotation: ParsedTypeAnnotation,
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    #[serde(default)]
    pub span: Span,
}

impl ParsedClass {
    pub fn concrete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            is_implementation_specific: false,
            inheritances: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructor: None,
            invariants: Vec::new(),
            serialization: None,
            description: None,
            span: Span::dummy(),
        }
    }

    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::concrete(name)
        }
    }

    pub fn inherits(mut self, base: impl Into<String>) -> Self {
        self.inheritances.push(base.into());
        self
    }

    pub fn property(mut self, property: ParsedProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: ParsedMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn constructor(mut self, constructor: ParsedConstructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn invariant(mut self, invariant: ParsedInvariant) -> Self {
        self.invariants.push(invariant);
        self
    }

    pub fn with_model_type(mut self, value: bool) -> Self {
        self.serialization = Some(ParsedSerialization {
            with_model_type: Some(value),
        });
        self
    }

    pub fn described(mut self, description: ParsedDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn implementation_specific(mut self) -> Self {
        self.is_implementation_specific = true;
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn find_property(&self, name: &str) -> Option<&ParsedProperty> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// The explicitly declared serialization setting, if any.
    pub fn declared_with_model_type(&self) -> Option<bool> {
        self.serialization.and_then(|setting| setting.with_model_type)
    }
}

impl ParsedProperty {
    pub fn new(name: impl Into<String>, type_annotation: ParsedTypeAnnotation) -> Self {
        Self {
            name: name.into(),
            type_annotation,
            description: None,
            span: Span::dummy(),
        }
    }

    pub fn described(mut self, description: ParsedDescription) -> Self {
        self.description = Some(description);
        self
    }
}

// =============================================================================
// Arguments, Methods and Contracts
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedArgument {
    pub name: String,
    pub type_annotation: ParsedTypeAnnotation,
    #[serde(default)]
    pub default: Option<ParsedDefault>,
    #[serde(default)]
    pub span: Span,
}

/// An unevaluated default value of an argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedDefault {
    pub expr: Expr,
}

impl ParsedArgument {
    pub fn new(name: impl Into<String>, type_annotation: ParsedTypeAnnotation) -> Self {
        Self {
            name: name.into(),
            type_annotation,
            default: None,
            span: Span::dummy(),
        }
    }

    /// The receiver argument of a method.
    pub fn receiver() -> Self {
        Self::new("self", ParsedTypeAnnotation::self_type())
    }

    pub fn with_default(mut self, expr: Expr) -> Self {
        self.default = Some(ParsedDefault { expr });
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedContracts {
    #[serde(default)]
    pub preconditions: Vec<ParsedContract>,
    #[serde(default)]
    pub snapshots: Vec<ParsedSnapshot>,
    #[serde(default)]
    pub postconditions: Vec<ParsedContract>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedContract {
    pub args: Vec<String>,
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedSnapshot {
    pub args: Vec<String>,
    pub name: String,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedInvariant {
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    pub body: Expr,
    #[serde(default)]
    pub span: Span,
}

impl ParsedContract {
    pub fn new(args: Vec<&str>, body: Expr) -> Self {
        Self {
            args: args.into_iter().map(str::to_string).collect(),
            description: None,
            body,
        }
    }
}

impl ParsedSnapshot {
    pub fn new(args: Vec<&str>, name: impl Into<String>, body: Expr) -> Self {
        Self {
            args: args.into_iter().map(str::to_string).collect(),
            name: name.into(),
            body,
        }
    }
}

impl ParsedInvariant {
    pub fn new(body: Expr) -> Self {
        Self {
            description: None,
            body,
            span: Span::dummy(),
        }
    }

    pub fn described(mut self, description: ParsedDescription) -> Self {
        self.description = Some(description);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedMethod {
    pub name: String,
    pub arguments: Vec<ParsedArgument>,
    #[serde(default)]
    pub returns: Option<ParsedTypeAnnotation>,
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    #[serde(default)]
    pub contracts: ParsedContracts,
    #[serde(default)]
    pub is_implementation_specific: bool,
    #[serde(default)]
    pub span: Span,
}

impl ParsedMethod {
    /// A method taking only the receiver.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: vec![ParsedArgument::receiver()],
            returns: None,
            description: None,
            contracts: ParsedContracts::default(),
            is_implementation_specific: false,
            span: Span::dummy(),
        }
    }

    pub fn argument(mut self, argument: ParsedArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn returns(mut self, returns: ParsedTypeAnnotation) -> Self {
        self.returns = Some(returns);
        self
    }

    pub fn precondition(mut self, contract: ParsedContract) -> Self {
        self.contracts.preconditions.push(contract);
        self
    }

    pub fn snapshot(mut self, snapshot: ParsedSnapshot) -> Self {
        self.contracts.snapshots.push(snapshot);
        self
    }

    pub fn postcondition(mut self, contract: ParsedContract) -> Self {
        self.contracts.postconditions.push(contract);
        self
    }

    pub fn described(mut self, description: ParsedDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn implementation_specific(mut self) -> Self {
        self.is_implementation_specific = true;
        self
    }
}

// =============================================================================
// Constructors
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedConstructor {
    pub arguments: Vec<ParsedArgument>,
    #[serde(default)]
    pub body: Vec<ParsedStatement>,
    #[serde(default)]
    pub contracts: ParsedContracts,
    #[serde(default)]
    pub is_implementation_specific: bool,
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedStatement {
    /// `Ancestor.__init__(self, ...)`
    CallSuperConstructor {
        super_name: String,
        arguments: Vec<SuperArgument>,
        #[serde(default)]
        span: Span,
    },
    /// `self.<property> = <value>`
    AssignProperty {
        property: String,
        value: Expr,
        #[serde(default)]
        span: Span,
    },
    /// Anything the parser could not classify.
    Unsupported {
        text: String,
        #[serde(default)]
        span: Span,
    },
}

impl ParsedStatement {
    pub fn span(&self) -> Span {
        match self {
            ParsedStatement::CallSuperConstructor { span, .. }
            | ParsedStatement::AssignProperty { span, .. }
            | ParsedStatement::Unsupported { span, .. } => *span,
        }
    }
}

/// An argument passed to an ancestor constructor.
///
/// Positional arguments have no keyword. A keyword-less argument marked as
/// `double_star` is a `**kwargs` splat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuperArgument {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub double_star: bool,
    pub value: Expr,
}

impl SuperArgument {
    pub fn keyword(keyword: impl Into<String>, value: Expr) -> Self {
        Self {
            keyword: Some(keyword.into()),
            double_star: false,
            value,
        }
    }

    pub fn positional(value: Expr) -> Self {
        Self {
            keyword: None,
            double_star: false,
            value,
        }
    }

    pub fn double_star(value: Expr) -> Self {
        Self {
            keyword: None,
            double_star: true,
            value,
        }
    }
}

impl ParsedConstructor {
    /// A constructor taking only the receiver with an empty body.
    pub fn new() -> Self {
        Self {
            arguments: vec![ParsedArgument::receiver()],
            body: Vec::new(),
            contracts: ParsedContracts::default(),
            is_implementation_specific: false,
            description: None,
            span: Span::dummy(),
        }
    }

    pub fn argument(mut self, argument: ParsedArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn statement(mut self, statement: ParsedStatement) -> Self {
        self.body.push(statement);
        self
    }

    /// `Ancestor.__init__(self, keyword=keyword, ...)` forwarding the
    /// arguments of the same names.
    pub fn call_super_forwarding(self, super_name: impl Into<String>, names: &[&str]) -> Self {
        let arguments = names
            .iter()
            .map(|name| SuperArgument::keyword(*name, Expr::name(*name)))
            .collect();
        self.call_super(super_name, arguments)
    }

    pub fn call_super(
        mut self,
        super_name: impl Into<String>,
        arguments: Vec<SuperArgument>,
    ) -> Self {
        self.body.push(ParsedStatement::CallSuperConstructor {
            super_name: super_name.into(),
            arguments,
            span: Span::dummy(),
        });
        self
    }

    /// `self.<property> = <property>`
    pub fn assign(self, property: impl Into<String>) -> Self {
        let property = property.into();
        let value = Expr::name(property.clone());
        self.assign_expr(property, value)
    }

    pub fn assign_expr(mut self, property: impl Into<String>, value: Expr) -> Self {
        self.body.push(ParsedStatement::AssignProperty {
            property: property.into(),
            value,
            span: Span::dummy(),
        });
        self
    }

    pub fn precondition(mut self, contract: ParsedContract) -> Self {
        self.contracts.preconditions.push(contract);
        self
    }

    pub fn implementation_specific(mut self) -> Self {
        self.is_implementation_specific = true;
        self
    }
}

// =============================================================================
// Verification Functions
// =============================================================================

/// A standalone function callable from contracts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedFunction {
    pub name: String,
    pub arguments: Vec<ParsedArgument>,
    pub returns: Option<ParsedTypeAnnotation>,
    #[serde(default)]
    pub description: Option<ParsedDescription>,
    #[serde(default)]
    pub contracts: ParsedContracts,
    pub body: FunctionBody,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionBody {
    ImplementationSpecific,
    Understood { statements: Vec<FunctionStatement> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionStatement {
    Assign {
        target: String,
        value: Expr,
        #[serde(default)]
        span: Span,
    },
    Return {
        value: Expr,
        #[serde(default)]
        span: Span,
    },
}

impl ParsedFunction {
    pub fn implementation_specific(
        name: impl Into<String>,
        arguments: Vec<ParsedArgument>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments,
            returns: Some(ParsedTypeAnnotation::atomic("bool")),
            description: None,
            contracts: ParsedContracts::default(),
            body: FunctionBody::ImplementationSpecific,
            span: Span::dummy(),
        }
    }

    pub fn understood(
        name: impl Into<String>,
        arguments: Vec<ParsedArgument>,
        statements: Vec<FunctionStatement>,
    ) -> Self {
        Self {
            body: FunctionBody::Understood { statements },
            ..Self::implementation_specific(name, arguments)
        }
    }

    pub fn described(mut self, description: ParsedDescription) -> Self {
        self.description = Some(description);
        self
    }
}

impl FunctionStatement {
    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Self::Assign {
            target: target.into(),
            value,
            span: Span::dummy(),
        }
    }

    pub fn returns(value: Expr) -> Self {
        Self::Return {
            value,
            span: Span::dummy(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Assign { span, .. } | Self::Return { span, .. } => *span,
        }
    }
}
