//! Intermediate representation of a meta-model.
//!
//! Turns the loosely-linked parsed model into a fully cross-linked,
//! validated symbol table:
//!
//! - **hierarchy**: linearizes the class hierarchy into an ontology
//! - **construction**: understands constructor bodies and in-lines the calls
//!   to ancestor constructors
//! - **serialization**: propagates `with_model_type` through the hierarchy
//! - **first / second pass**: builds the symbols with placeholders, then
//!   resolves every placeholder against the complete table
//! - **validate**: type discriminators, contract calls, initialization and
//!   docstring argument references
//!
//! [`translate`] runs the whole pipeline. Schema generators additionally use
//! [`infer_for_schema`], and [`dump`] renders a table for inspection.

pub mod construction;
pub mod doc;
pub mod dump;
mod first_pass;
pub mod hierarchy;
pub mod infer_for_schema;
pub mod lookups;
mod second_pass;
pub mod serialization;
pub mod translate;
pub mod types;
pub mod validate;
pub mod verification;

pub use doc::{AttributeReference, Description, DocElement, DocRoles, ReferenceKind};
pub use dump::{dump, dump_value};
pub use hierarchy::{Ontology, map_symbol_table_to_ontology};
pub use infer_for_schema::{LenConstraint, infer_len_constraints, infer_pattern_constraints};
pub use lookups::{
    UnresolvedReference, collect_interfaces_in_properties, map_interface_implementers,
};
pub use translate::{TranslateOptions, translate};
pub use types::*;

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod hierarchy_tests;

#[cfg(test)]
#[path = "../tests/construction_tests.rs"]
mod construction_tests;

#[cfg(test)]
#[path = "../tests/serialization_tests.rs"]
mod serialization_tests;

#[cfg(test)]
#[path = "../tests/verification_tests.rs"]
mod verification_tests;

#[cfg(test)]
#[path = "../tests/translate_tests.rs"]
mod translate_tests;

#[cfg(test)]
#[path = "../tests/validate_tests.rs"]
mod validate_tests;

#[cfg(test)]
#[path = "../tests/infer_for_schema_tests.rs"]
mod infer_for_schema_tests;

#[cfg(test)]
#[path = "../tests/dump_tests.rs"]
mod dump_tests;
