//! The translation pipeline from a parsed model to the intermediate
//! representation.
//!
//! Stages run in a fixed order and the first failing stage aborts the
//! pipeline: every stage assumes its predecessors succeeded.

use crate::construction::{in_line_constructors, understand_all};
use crate::doc::DocRoles;
use crate::first_pass::{FirstPassInput, build_symbol_table};
use crate::hierarchy::map_symbol_table_to_ontology;
use crate::second_pass::resolve;
use crate::serialization::resolve_serializations;
use crate::types::SymbolTable;
use crate::validate::validate;
use metacore_common::{Diagnostic, Span};
use metacore_parse::ParsedSymbolTable;
use tracing::{debug, info_span};

/// Options of the translation.
#[derive(Clone, Debug, Default)]
pub struct TranslateOptions {
    /// How role markers in docstrings are interpreted.
    pub doc_roles: DocRoles,
}

/// Translate the parsed symbol table into a resolved, validated symbol table.
///
/// On failure, the error is a single aggregate whose underlying diagnostics
/// are those of the first failing stage.
pub fn translate(
    parsed: &ParsedSymbolTable,
    options: &TranslateOptions,
) -> Result<SymbolTable, Diagnostic> {
    run(parsed, options).map_err(|underlying| {
        debug!(errors = underlying.len(), "translation failed");
        Diagnostic::aggregate(
            Span::dummy(),
            "Failed to translate the parsed symbol table to an intermediate symbol table",
            underlying,
        )
    })
}

fn run(
    parsed: &ParsedSymbolTable,
    options: &TranslateOptions,
) -> Result<SymbolTable, Vec<Diagnostic>> {
    let ontology = {
        let _span = info_span!("hierarchy", symbols = parsed.symbols.len()).entered();
        map_symbol_table_to_ontology(parsed)?
    };

    let in_lined = {
        let _span = info_span!("construction").entered();
        let constructors = understand_all(parsed, &ontology)?;
        in_line_constructors(&ontology, &constructors)
    };

    let serializations = {
        let _span = info_span!("serialization").entered();
        resolve_serializations(&ontology)?
    };

    let mut table = {
        let _span = info_span!("first_pass").entered();
        build_symbol_table(&FirstPassInput {
            parsed,
            ontology: &ontology,
            serializations: &serializations,
            in_lined: &in_lined,
            roles: &options.doc_roles,
        })?
    };

    {
        let _span = info_span!("second_pass").entered();
        resolve(&mut table)?;
    }

    {
        let _span = info_span!("validate").entered();
        validate(&table)?;
    }

    debug!(symbols = table.symbols.len(), "translation succeeded");
    Ok(table)
}
