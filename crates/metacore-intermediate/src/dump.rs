//! Human-readable JSON dump of a resolved symbol table.
//!
//! Links are rendered as the names of their targets, so the dump stays stable
//! when symbols are reordered.

use crate::doc::Description;
use crate::types::{
    Argument, AssignArgument, Contracts, DefaultValue, Link, Property, StructuralDefault, Symbol,
    SymbolId, SymbolTable, TypeAnnotation, Verification,
};
use metacore_parse::Constant;
use serde_json::{Value, json};

/// Render the table as pretty-printed JSON.
pub fn dump(table: &SymbolTable) -> String {
    format!("{:#}", dump_value(table))
}

/// The table as a JSON value.
pub fn dump_value(table: &SymbolTable) -> Value {
    let dumper = Dumper { table };
    json!({
        "symbols": table.symbols.values().map(|symbol| dumper.symbol(symbol)).collect::<Vec<_>>(),
        "verification_functions": table
            .verification_functions
            .iter()
            .map(|function| {
                let verification = match &function.verification {
                    Verification::ImplementationSpecific => {
                        json!({ "kind": "implementation_specific" })
                    }
                    Verification::Pattern { pattern } => {
                        json!({ "kind": "pattern", "pattern": pattern })
                    }
                };
                json!({
                    "name": function.name,
                    "arguments": dumper.arguments(&function.arguments),
                    "returns": dumper.returns(function.returns.as_ref()),
                    "description": description(function.description.as_ref()),
                    "contracts": dumper.contracts(&function.contracts),
                    "verification": verification,
                })
            })
            .collect::<Vec<_>>(),
        "ref_association": table.name_of(table.ref_association),
        "meta_model": {
            "book_url": table.meta_model.book_url,
            "book_version": table.meta_model.book_version,
            "description": description(table.meta_model.description.as_ref()),
        },
    })
}

fn description(description: Option<&Description>) -> Value {
    description.map_or(Value::Null, |description| Value::String(description.plain_text()))
}

fn constant(value: &Constant) -> Value {
    match value {
        Constant::Bool(value) => json!(value),
        Constant::Int(value) => json!(value),
        Constant::Float(value) => json!(value),
        Constant::Str(value) => json!(value),
        Constant::None => Value::Null,
    }
}

struct Dumper<'t> {
    table: &'t SymbolTable,
}

impl Dumper<'_> {
    fn links(&self, links: &[Link<SymbolId>]) -> Vec<Value> {
        links.iter().map(|link| self.link(link)).collect()
    }

    fn returns(&self, returns: Option<&TypeAnnotation>) -> Option<String> {
        returns.map(|returns| self.type_annotation(returns))
    }

    fn link(&self, link: &Link<SymbolId>) -> Value {
        match link {
            Link::Resolved(id) => json!(self.table.name_of(*id)),
            Link::Placeholder(text) => json!({ "placeholder": text }),
        }
    }

    fn type_annotation(&self, annotation: &TypeAnnotation) -> String {
        match annotation {
            TypeAnnotation::BuiltinAtomic { a_type, .. } => a_type.as_str().to_string(),
            TypeAnnotation::OurAtomic { symbol, .. } => match symbol {
                Link::Resolved(id) => self.table.name_of(*id).to_string(),
                Link::Placeholder(text) => format!("?{text}"),
            },
            TypeAnnotation::List { items, .. } => format!("List[{}]", self.type_annotation(items)),
            TypeAnnotation::Optional { value, .. } => {
                format!("Optional[{}]", self.type_annotation(value))
            }
            TypeAnnotation::Ref { value, .. } => format!("Ref[{}]", self.type_annotation(value)),
        }
    }

    fn arguments(&self, arguments: &[Argument]) -> Vec<Value> {
        arguments
            .iter()
            .map(|argument| {
                let default = match &argument.default {
                    None => Value::Null,
                    Some(Link::Placeholder(_)) => json!({ "placeholder": argument.name }),
                    Some(Link::Resolved(DefaultValue::Constant { value, .. })) => {
                        json!({ "constant": constant(value) })
                    }
                    Some(Link::Resolved(DefaultValue::EnumerationLiteral {
                        enumeration, literal, ..
                    })) => {
                        let enumeration = self.table.name_of(*enumeration);
                        json!({ "literal": format!("{enumeration}.{literal}") })
                    }
                };
                json!({
                    "name": argument.name,
                    "type": self.type_annotation(&argument.type_annotation),
                    "default": default,
                })
            })
            .collect()
    }

    fn contracts(&self, contracts: &Contracts) -> Value {
        json!({
            "preconditions": contracts.preconditions.len(),
            "snapshots": contracts
                .snapshots
                .iter()
                .map(|snapshot| &snapshot.name)
                .collect::<Vec<_>>(),
            "postconditions": contracts.postconditions.len(),
        })
    }

    fn properties(&self, properties: &[Property]) -> Vec<Value> {
        properties
            .iter()
            .map(|property| {
                json!({
                    "name": property.name,
                    "type": self.type_annotation(&property.type_annotation),
                    "implemented_for": self.link(&property.implemented_for),
                    "description": description(property.description.as_ref()),
                })
            })
            .collect()
    }

    fn statement(&self, statement: &AssignArgument) -> Value {
        let default = match &statement.default {
            None => Value::Null,
            Some(StructuralDefault::EmptyList) => json!("[]"),
            Some(StructuralDefault::EnumLiteral { enumeration, literal }) => match enumeration {
                Link::Resolved(id) => json!(format!("{}.{literal}", self.table.name_of(*id))),
                Link::Placeholder(text) => json!(format!("?{text}.{literal}")),
            },
        };
        json!({
            "property": statement.name,
            "argument": statement.argument,
            "default": default,
        })
    }

    fn symbol(&self, symbol: &Symbol) -> Value {
        let invariants: Vec<Value> = symbol
            .invariants()
            .iter()
            .map(|invariant| description(invariant.description.as_ref()))
            .collect();

        match symbol {
            Symbol::Enumeration(enumeration) => json!({
                "kind": "enumeration",
                "name": enumeration.name,
                "literals": enumeration
                    .literals
                    .iter()
                    .map(|literal| json!({
                        "name": literal.name,
                        "value": literal.value,
                        "description": description(literal.description.as_ref()),
                    }))
                    .collect::<Vec<_>>(),
                "is_superset_of": self.links(&enumeration.is_superset_of),
                "description": description(enumeration.description.as_ref()),
            }),
            Symbol::Interface(interface) => json!({
                "kind": "interface",
                "name": interface.name,
                "inheritances": self.links(&interface.inheritances),
                "implementers": interface
                    .implementers
                    .iter()
                    .map(|id| self.table.name_of(*id))
                    .collect::<Vec<_>>(),
                "properties": self.properties(&interface.properties),
                "signatures": interface
                    .signatures
                    .iter()
                    .map(|signature| json!({
                        "name": signature.name,
                        "arguments": self.arguments(&signature.arguments),
                        "returns": self.returns(signature.returns.as_ref()),
                        "contracts": self.contracts(&signature.contracts),
                    }))
                    .collect::<Vec<_>>(),
                "invariants": invariants,
                "serialization": interface.serialization,
                "description": description(interface.description.as_ref()),
            }),
            Symbol::Class(class) => json!({
                "kind": "class",
                "name": class.name,
                "interfaces": self.links(&class.interfaces),
                "is_implementation_specific": class.is_implementation_specific,
                "properties": self.properties(&class.properties),
                "methods": class
                    .methods
                    .iter()
                    .map(|method| json!({
                        "name": method.name,
                        "arguments": self.arguments(&method.arguments),
                        "returns": self.returns(method.returns.as_ref()),
                        "is_implementation_specific": method.is_implementation_specific,
                        "contracts": self.contracts(&method.contracts),
                    }))
                    .collect::<Vec<_>>(),
                "constructor": {
                    "arguments": self.arguments(&class.constructor.arguments),
                    "is_implementation_specific": class.constructor.is_implementation_specific,
                    "contracts": self.contracts(&class.constructor.contracts),
                    "statements": class
                        .constructor
                        .statements
                        .iter()
                        .map(|statement| self.statement(statement))
                        .collect::<Vec<_>>(),
                },
                "invariants": invariants,
                "serialization": class.serialization,
                "description": description(class.description.as_ref()),
            }),
        }
    }
}
