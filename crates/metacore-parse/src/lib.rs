//! The parsed meta-model.
//!
//! This crate defines the contract between a meta-model parser and the
//! intermediate representation builder:
//! - Parsed symbols with inheritance and type references as plain names
//! - Contract expressions with a read-only `Visitor`
//! - Docstrings as a generic rich-text tree
//!
//! Models can be built in code with the fluent constructors or decoded
//! from JSON with [`from_json`].

pub mod doc;
pub mod expr;
pub mod symbols;
pub mod type_annotation;

pub use doc::{DocNode, ParsedDescription};
pub use expr::{Comparator, Constant, Expr, ExprKind, JoinedPart, Visitor, walk_expr};
pub use symbols::{
    FunctionBody, FunctionStatement, ParsedArgument, ParsedClass, ParsedConstructor,
    ParsedContract, ParsedContracts, ParsedDefault, ParsedEnumeration, ParsedFunction,
    ParsedInvariant, ParsedLiteral, ParsedMetaModel, ParsedMethod, ParsedProperty,
    ParsedSerialization, ParsedSnapshot, ParsedStatement, ParsedSymbol, ParsedSymbolTable,
    SuperArgument,
};
pub use type_annotation::ParsedTypeAnnotation;

/// Decode a parsed symbol table from its JSON representation.
pub fn from_json(text: &str) -> Result<ParsedSymbolTable, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
#[path = "../tests/parse_tests.rs"]
mod parse_tests;
