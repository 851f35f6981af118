use super::*;
use metacore_common::DiagnosticKind;
use metacore_parse::{
    ParsedClass, ParsedEnumeration, ParsedMethod, ParsedProperty, ParsedSymbolTable,
    ParsedTypeAnnotation,
};

fn int_property(name: &str) -> ParsedProperty {
    ParsedProperty::new(name, ParsedTypeAnnotation::atomic("int"))
}

fn names(classes: &[&ParsedClass]) -> Vec<String> {
    classes.iter().map(|class| class.name.clone()).collect()
}

fn messages(errors: &[metacore_common::Diagnostic]) -> Vec<String> {
    errors.iter().map(|error| error.message_text.clone()).collect()
}

#[test]
fn test_ancestors_precede_descendants() {
    let parsed = ParsedSymbolTable::new("Reference")
        .symbol(ParsedClass::concrete("C").inherits("B"))
        .symbol(ParsedClass::abstract_class("B").inherits("A"))
        .symbol(ParsedClass::abstract_class("A"))
        .symbol(ParsedClass::concrete("Reference"));

    let ontology = map_symbol_table_to_ontology(&parsed).expect("valid hierarchy");

    let order = names(ontology.classes());
    let position = |name: &str| order.iter().position(|candidate| candidate == name).unwrap();
    assert!(position("A") < position("B"));
    assert!(position("B") < position("C"));
    assert_eq!(order.len(), 4);

    assert_eq!(names(ontology.list_ancestors("C")), vec!["A", "B"]);
    assert_eq!(names(ontology.list_ancestors("A")), Vec::<String>::new());
    assert_eq!(names(ontology.list_descendants("A")), vec!["B", "C"]);
    assert_eq!(ontology.position("A"), Some(position("A")));
}

#[test]
fn test_diamond_lists_each_ancestor_once() {
    let parsed = ParsedSymbolTable::new("D")
        .symbol(ParsedClass::abstract_class("A"))
        .symbol(ParsedClass::abstract_class("B").inherits("A"))
        .symbol(ParsedClass::abstract_class("C").inherits("A"))
        .symbol(ParsedClass::concrete("D").inherits("B").inherits("C"));

    let ontology = map_symbol_table_to_ontology(&parsed).expect("valid hierarchy");

    assert_eq!(names(ontology.list_ancestors("D")), vec!["A", "B", "C"]);

    let descendability = ontology.map_descendability();
    assert_eq!(descendability.get("A"), Some(&true));
    assert_eq!(descendability.get("B"), Some(&true));
    assert_eq!(descendability.get("D"), Some(&false));
}

#[test]
fn test_dangling_base_is_reported() {
    let parsed = ParsedSymbolTable::new("C").symbol(ParsedClass::concrete("C").inherits("Z"));

    let errors = map_symbol_table_to_ontology(&parsed).unwrap_err();

    assert_eq!(messages(&errors), vec!["The class C inherits from Z, but Z is not defined"]);
    assert_eq!(errors[0].kind, DiagnosticKind::Structural);
}

#[test]
fn test_cycle_is_reported() {
    let parsed = ParsedSymbolTable::new("Reference")
        .symbol(ParsedClass::abstract_class("A").inherits("B"))
        .symbol(ParsedClass::abstract_class("B").inherits("A"))
        .symbol(ParsedClass::concrete("Reference"));

    let errors = map_symbol_table_to_ontology(&parsed).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].message_text.contains("has been observed in a cycle"),
        "{}",
        errors[0]
    );
}

#[test]
fn test_only_abstract_classes_can_be_inherited_from() {
    let parsed = ParsedSymbolTable::new("B")
        .symbol(ParsedClass::concrete("A"))
        .symbol(ParsedClass::concrete("B").inherits("A"))
        .symbol(ParsedEnumeration::new("Kind").literal("Leaf", "leaf"))
        .symbol(ParsedClass::concrete("C").inherits("Kind"));

    let errors = map_symbol_table_to_ontology(&parsed).unwrap_err();

    assert_eq!(
        messages(&errors),
        vec![
            "The class B inherits from the concrete class A; only abstract classes can be inherited from",
            "The class C inherits from Kind, but Kind is an enumeration",
        ]
    );
}

#[test]
fn test_duplicate_symbols_are_reported() {
    let parsed = ParsedSymbolTable::new("A")
        .symbol(ParsedClass::concrete("A"))
        .symbol(ParsedEnumeration::new("A"));

    let errors = map_symbol_table_to_ontology(&parsed).unwrap_err();

    assert_eq!(messages(&errors), vec!["The symbol A has been defined more than once"]);
}

#[test]
fn test_redefined_members_are_reported() {
    let parsed = ParsedSymbolTable::new("B")
        .symbol(
            ParsedClass::abstract_class("A")
                .property(int_property("x"))
                .method(ParsedMethod::new("check")),
        )
        .symbol(
            ParsedClass::concrete("B")
                .inherits("A")
                .property(int_property("x"))
                .property(int_property("y"))
                .method(ParsedMethod::new("check")),
        );

    let errors = map_symbol_table_to_ontology(&parsed).unwrap_err();

    assert_eq!(
        messages(&errors),
        vec![
            "The property has already been defined in the ancestor class A: x",
            "The method has already been defined in the ancestor class A: check",
        ]
    );
}
