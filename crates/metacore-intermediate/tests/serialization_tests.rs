use super::*;
use crate::serialization::resolve_serializations;
use metacore_common::DiagnosticKind;
use metacore_parse::{ParsedClass, ParsedSymbolTable};

fn resolve(
    parsed: &ParsedSymbolTable,
) -> Result<rustc_hash::FxHashMap<String, Serialization>, Vec<metacore_common::Diagnostic>> {
    let ontology = map_symbol_table_to_ontology(parsed).expect("valid hierarchy");
    resolve_serializations(&ontology)
}

#[test]
fn test_setting_is_inherited() {
    let parsed = ParsedSymbolTable::new("Q")
        .symbol(ParsedClass::abstract_class("P").with_model_type(true))
        .symbol(ParsedClass::concrete("Q").inherits("P"));

    let settings = resolve(&parsed).expect("consistent settings");

    assert!(settings["P"].with_model_type);
    assert!(settings["Q"].with_model_type);
}

#[test]
fn test_setting_defaults_to_false() {
    let parsed = ParsedSymbolTable::new("Q")
        .symbol(ParsedClass::abstract_class("P"))
        .symbol(ParsedClass::concrete("Q").inherits("P"));

    let settings = resolve(&parsed).expect("consistent settings");

    assert!(!settings["P"].with_model_type);
    assert!(!settings["Q"].with_model_type);
}

#[test]
fn test_explicit_false_is_kept() {
    let parsed =
        ParsedSymbolTable::new("Q").symbol(ParsedClass::concrete("Q").with_model_type(false));

    let settings = resolve(&parsed).expect("consistent settings");

    assert!(!settings["Q"].with_model_type);
}

#[test]
fn test_conflict_with_ancestor_is_reported() {
    let parsed = ParsedSymbolTable::new("Q")
        .symbol(ParsedClass::abstract_class("P").with_model_type(true))
        .symbol(ParsedClass::concrete("Q").inherits("P").with_model_type(false));

    let errors = resolve(&parsed).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::Consistency);
    assert_eq!(
        errors[0].message_text,
        "The serialization setting with_model_type between the class P and Q is inconsistent"
    );
}

#[test]
fn test_conflict_between_bases_is_reported() {
    let parsed = ParsedSymbolTable::new("C")
        .symbol(ParsedClass::abstract_class("A").with_model_type(true))
        .symbol(ParsedClass::abstract_class("B").with_model_type(false))
        .symbol(ParsedClass::concrete("C").inherits("A").inherits("B"));

    let errors = resolve(&parsed).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(errors[0].message_text.contains("class B and A"), "{}", errors[0]);
}
