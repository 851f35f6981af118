//! First pass of the translation.
//!
//! Every parsed symbol is turned into its intermediate counterpart. Whatever
//! refers to another symbol becomes a [`Link::Placeholder`]: the target might
//! be declared later, so nothing is looked up here.

use crate::construction::explicit_arguments;
use crate::doc::{Description, DocRoles, translate_optional};
use crate::hierarchy::Ontology;
use crate::types::{
    Argument, AssignArgument, BuiltinAtomicType, Class, Constructor, Contract, Contracts,
    Enumeration, EnumerationLiteral, Interface, Invariant, Link, MetaModel, Method, Property,
    Serialization, Signature, Snapshot, Symbol, SymbolId, SymbolTable, TypeAnnotation,
    VerificationFunction,
};
use crate::verification::understand_verification;
use indexmap::IndexMap;
use metacore_common::Diagnostic;
use metacore_common::diagnostics::{dedup, into_result};
use metacore_parse::{
    ParsedArgument, ParsedClass, ParsedContract, ParsedContracts, ParsedDescription,
    ParsedEnumeration, ParsedFunction, ParsedInvariant, ParsedMethod, ParsedProperty,
    ParsedSymbol, ParsedSymbolTable, ParsedTypeAnnotation,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Everything the earlier stages established about the parsed model.
pub(crate) struct FirstPassInput<'p, 'o> {
    pub parsed: &'p ParsedSymbolTable,
    pub ontology: &'o Ontology<'p>,
    pub serializations: &'o FxHashMap<String, Serialization>,
    pub in_lined: &'o FxHashMap<String, Vec<AssignArgument>>,
    pub roles: &'o DocRoles,
}

/// Build the symbol table with all cross-references left as placeholders.
pub(crate) fn build_symbol_table(
    input: &FirstPassInput<'_, '_>,
) -> Result<SymbolTable, Vec<Diagnostic>> {
    let mut builder = Builder {
        roles: input.roles,
        errors: Vec::new(),
    };

    let mut symbols: IndexMap<String, Symbol> = IndexMap::with_capacity(input.parsed.symbols.len());
    for parsed_symbol in &input.parsed.symbols {
        let symbol = match parsed_symbol {
            ParsedSymbol::Enumeration(enumeration) => {
                Symbol::Enumeration(builder.enumeration(enumeration))
            }
            ParsedSymbol::Class(class) if class.is_abstract => {
                Symbol::Interface(builder.interface(class, input))
            }
            ParsedSymbol::Class(class) => Symbol::Class(builder.class(class, input)),
        };
        trace!(symbol = %parsed_symbol.name(), "built");
        symbols.insert(parsed_symbol.name().to_string(), symbol);
    }

    let ref_association = match symbols.get_full(input.parsed.ref_association.as_str()) {
        Some((index, _, Symbol::Class(_))) => Some(SymbolId(index as u32)),
        Some((_, _, other)) => {
            builder.errors.push(Diagnostic::structural(
                other.span(),
                format!(
                    "Expected the reference association {} to be a concrete class, but it is an {}",
                    other.name(),
                    other.kind()
                ),
            ));
            None
        }
        None => {
            builder.errors.push(Diagnostic::structural(
                metacore_common::Span::dummy(),
                format!(
                    "The reference association {} is not defined in the symbol table",
                    input.parsed.ref_association
                ),
            ));
            None
        }
    };

    let verification_functions: Vec<VerificationFunction> = input
        .parsed
        .verification_functions
        .iter()
        .filter_map(|function| builder.verification_function(function))
        .collect();

    let meta_model = MetaModel {
        book_url: input.parsed.meta_model.book_url.clone(),
        book_version: input.parsed.meta_model.book_version.clone(),
        description: translate_optional(
            input.parsed.meta_model.description.as_ref(),
            input.roles,
            &mut builder.errors,
        ),
    };

    dedup(&mut builder.errors);
    debug!(
        symbols = symbols.len(),
        verification_functions = verification_functions.len(),
        errors = builder.errors.len(),
        "first pass done"
    );

    let Some(ref_association) = ref_association else {
        return Err(builder.errors);
    };

    into_result(
        SymbolTable {
            symbols,
            verification_functions,
            ref_association,
            meta_model,
        },
        builder.errors,
    )
}

struct Builder<'r> {
    roles: &'r DocRoles,
    errors: Vec<Diagnostic>,
}

impl Builder<'_> {
    fn description(&mut self, parsed: Option<&ParsedDescription>) -> Option<Description> {
        translate_optional(parsed, self.roles, &mut self.errors)
    }

    // =========================================================================
    // Type annotations and arguments
    // =========================================================================

    fn type_annotation(&mut self, parsed: &ParsedTypeAnnotation) -> Option<TypeAnnotation> {
        match parsed {
            ParsedTypeAnnotation::Atomic { identifier, span } => {
                Some(match BuiltinAtomicType::from_identifier(identifier) {
                    Some(a_type) => TypeAnnotation::BuiltinAtomic { a_type, span: *span },
                    None => TypeAnnotation::OurAtomic {
                        symbol: Link::Placeholder(identifier.clone()),
                        span: *span,
                    },
                })
            }
            ParsedTypeAnnotation::Subscripted {
                identifier,
                subscripts,
                span,
            } => {
                if !matches!(identifier.as_str(), "List" | "Optional" | "Ref") {
                    self.errors.push(Diagnostic::structural(
                        *span,
                        format!("The subscripted type annotation {parsed} is not supported"),
                    ));
                    return None;
                }
                let [subscript] = subscripts.as_slice() else {
                    self.errors.push(Diagnostic::structural(
                        *span,
                        format!(
                            "Expected exactly one subscript for the {identifier} type annotation, \
                             but got {}: {parsed}",
                            subscripts.len()
                        ),
                    ));
                    return None;
                };
                let inner = Box::new(self.type_annotation(subscript)?);
                Some(match identifier.as_str() {
                    "List" => TypeAnnotation::List { items: inner, span: *span },
                    "Optional" => TypeAnnotation::Optional { value: inner, span: *span },
                    _ => TypeAnnotation::Ref { value: inner, span: *span },
                })
            }
            ParsedTypeAnnotation::SelfType { span } => {
                self.errors.push(Diagnostic::structural(
                    *span,
                    "Unexpected self type annotation outside of a method receiver",
                ));
                None
            }
        }
    }

    /// Translate the arguments, dropping the receiver.
    fn arguments(&mut self, parsed: &[ParsedArgument]) -> Vec<Argument> {
        parsed
            .iter()
            .filter(|argument| {
                !matches!(argument.type_annotation, ParsedTypeAnnotation::SelfType { .. })
            })
            .filter_map(|argument| {
                let type_annotation = self.type_annotation(&argument.type_annotation)?;
                Some(Argument {
                    name: argument.name.clone(),
                    type_annotation,
                    default: argument
                        .default
                        .as_ref()
                        .map(|default| Link::Placeholder(default.clone())),
                    span: argument.span,
                })
            })
            .collect()
    }

    fn returns(&mut self, parsed: Option<&ParsedTypeAnnotation>) -> Option<TypeAnnotation> {
        parsed.and_then(|returns| self.type_annotation(returns))
    }

    // =========================================================================
    // Contracts
    // =========================================================================

    fn contract(&mut self, parsed: &ParsedContract) -> Contract {
        Contract {
            args: parsed.args.clone(),
            description: self.description(parsed.description.as_ref()),
            body: parsed.body.clone(),
        }
    }

    fn contracts(&mut self, parsed: &ParsedContracts) -> Contracts {
        Contracts {
            preconditions: parsed
                .preconditions
                .iter()
                .map(|pre| self.contract(pre))
                .collect(),
            snapshots: parsed
                .snapshots
                .iter()
                .map(|snapshot| Snapshot {
                    args: snapshot.args.clone(),
                    name: snapshot.name.clone(),
                    body: snapshot.body.clone(),
                })
                .collect(),
            postconditions: parsed
                .postconditions
                .iter()
                .map(|post| self.contract(post))
                .collect(),
        }
    }

    fn invariant(&mut self, parsed: &ParsedInvariant) -> Invariant {
        Invariant {
            description: self.description(parsed.description.as_ref()),
            body: parsed.body.clone(),
            span: parsed.span,
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn property(&mut self, parsed: &ParsedProperty, owner: &ParsedClass) -> Option<Property> {
        let type_annotation = self.type_annotation(&parsed.type_annotation)?;
        Some(Property {
            name: parsed.name.clone(),
            type_annotation,
            description: self.description(parsed.description.as_ref()),
            implemented_for: Link::Placeholder(owner.name.clone()),
            span: parsed.span,
        })
    }

    fn method(&mut self, parsed: &ParsedMethod) -> Method {
        Method {
            name: parsed.name.clone(),
            arguments: self.arguments(&parsed.arguments),
            returns: self.returns(parsed.returns.as_ref()),
            description: self.description(parsed.description.as_ref()),
            contracts: self.contracts(&parsed.contracts),
            is_implementation_specific: parsed.is_implementation_specific,
            span: parsed.span,
        }
    }

    fn signature(&mut self, parsed: &ParsedMethod) -> Signature {
        Signature {
            name: parsed.name.clone(),
            arguments: self.arguments(&parsed.arguments),
            returns: self.returns(parsed.returns.as_ref()),
            description: self.description(parsed.description.as_ref()),
            contracts: self.contracts(&parsed.contracts),
            span: parsed.span,
        }
    }

    /// Properties of the ancestors followed by the own ones.
    fn flattened_properties(
        &mut self,
        class: &ParsedClass,
        ancestors: &[&ParsedClass],
    ) -> Vec<Property> {
        let mut properties = Vec::new();
        for owner in ancestors.iter().copied().chain(std::iter::once(class)) {
            for parsed in &owner.properties {
                if let Some(property) = self.property(parsed, owner) {
                    properties.push(property);
                }
            }
        }
        properties
    }

    fn flattened_invariants(
        &mut self,
        class: &ParsedClass,
        ancestors: &[&ParsedClass],
    ) -> Vec<Invariant> {
        ancestors
            .iter()
            .copied()
            .chain(std::iter::once(class))
            .flat_map(|owner| owner.invariants.iter())
            .map(|parsed| self.invariant(parsed))
            .collect()
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    fn enumeration(&mut self, parsed: &ParsedEnumeration) -> Enumeration {
        Enumeration {
            name: parsed.name.clone(),
            literals: parsed
                .literals
                .iter()
                .map(|literal| EnumerationLiteral {
                    name: literal.name.clone(),
                    value: literal.value.clone(),
                    description: self.description(literal.description.as_ref()),
                    span: literal.span,
                })
                .collect(),
            is_superset_of: parsed
                .is_superset_of
                .iter()
                .map(|subset| Link::Placeholder(subset.clone()))
                .collect(),
            description: self.description(parsed.description.as_ref()),
            span: parsed.span,
        }
    }

    fn interface(&mut self, parsed: &ParsedClass, input: &FirstPassInput<'_, '_>) -> Interface {
        let ancestors = input.ontology.list_ancestors(&parsed.name);

        let signatures = ancestors
            .iter()
            .copied()
            .chain(std::iter::once(parsed))
            .flat_map(|owner| owner.methods.iter())
            .map(|method| self.signature(method))
            .collect();

        Interface {
            name: parsed.name.clone(),
            inheritances: parsed
                .inheritances
                .iter()
                .map(|base| Link::Placeholder(base.clone()))
                .collect(),
            signatures,
            properties: self.flattened_properties(parsed, ancestors),
            invariants: self.flattened_invariants(parsed, ancestors),
            serialization: input
                .serializations
                .get(&parsed.name)
                .copied()
                .unwrap_or_default(),
            implementers: Vec::new(),
            description: self.description(parsed.description.as_ref()),
            span: parsed.span,
        }
    }

    fn class(&mut self, parsed: &ParsedClass, input: &FirstPassInput<'_, '_>) -> Class {
        let ancestors = input.ontology.list_ancestors(&parsed.name);

        let mut contracts = Contracts::default();
        for ancestor in ancestors {
            if let Some(constructor) = &ancestor.constructor {
                let ancestor_contracts = self.contracts(&constructor.contracts);
                contracts.stack(ancestor_contracts);
            }
        }

        let constructor = match &parsed.constructor {
            Some(own) => {
                let own_contracts = self.contracts(&own.contracts);
                contracts.stack(own_contracts);
                let receiverless: Vec<ParsedArgument> = explicit_arguments(own).cloned().collect();
                Constructor {
                    arguments: self.arguments(&receiverless),
                    contracts,
                    is_implementation_specific: own.is_implementation_specific,
                    description: self.description(own.description.as_ref()),
                    statements: input.in_lined.get(&parsed.name).cloned().unwrap_or_default(),
                }
            }
            None => Constructor {
                contracts,
                statements: input.in_lined.get(&parsed.name).cloned().unwrap_or_default(),
                ..Constructor::default()
            },
        };

        let methods = ancestors
            .iter()
            .copied()
            .chain(std::iter::once(parsed))
            .flat_map(|owner| owner.methods.iter())
            .map(|method| self.method(method))
            .collect();

        Class {
            name: parsed.name.clone(),
            interfaces: parsed
                .inheritances
                .iter()
                .map(|base| Link::Placeholder(base.clone()))
                .collect(),
            is_implementation_specific: parsed.is_implementation_specific,
            properties: self.flattened_properties(parsed, ancestors),
            methods,
            constructor,
            invariants: self.flattened_invariants(parsed, ancestors),
            serialization: input
                .serializations
                .get(&parsed.name)
                .copied()
                .unwrap_or_default(),
            description: self.description(parsed.description.as_ref()),
            span: parsed.span,
        }
    }

    fn verification_function(&mut self, parsed: &ParsedFunction) -> Option<VerificationFunction> {
        let verification = match understand_verification(parsed) {
            Ok(verification) => verification,
            Err(error) => {
                self.errors.push(error);
                return None;
            }
        };
        Some(VerificationFunction {
            name: parsed.name.clone(),
            arguments: self.arguments(&parsed.arguments),
            returns: self.returns(parsed.returns.as_ref()),
            description: self.description(parsed.description.as_ref()),
            contracts: self.contracts(&parsed.contracts),
            verification,
            span: parsed.span,
        })
    }
}
