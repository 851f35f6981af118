use super::*;
use metacore_common::Span;

// =============================================================================
// JSON decoding
// =============================================================================

#[test]
fn test_from_json_decodes_classes_and_enumerations() {
    let text = r#"{
        "symbols": [
            {
                "kind": "enumeration",
                "name": "Color",
                "literals": [{"name": "Red", "value": "red"}]
            },
            {
                "kind": "class",
                "name": "A",
                "is_abstract": true,
                "properties": [
                    {
                        "name": "x",
                        "type_annotation": {"kind": "atomic", "identifier": "int"},
                        "span": {"start": 10, "length": 6}
                    }
                ],
                "constructor": {
                    "arguments": [
                        {"name": "self", "type_annotation": {"kind": "self_type"}},
                        {"name": "x", "type_annotation": {"kind": "atomic", "identifier": "int"}}
                    ],
                    "body": [
                        {
                            "kind": "assign_property",
                            "property": "x",
                            "value": {"kind": "name", "identifier": "x"}
                        }
                    ]
                }
            }
        ],
        "ref_association": "A"
    }"#;

    let table = from_json(text).unwrap();
    assert_eq!(table.symbols.len(), 2);
    assert_eq!(table.ref_association, "A");
    assert!(table.verification_functions.is_empty());

    let color = table.find_enumeration("Color").unwrap();
    assert!(color.has_literal("Red"));

    let class = table.find_class("A").unwrap();
    assert!(class.is_abstract);
    assert_eq!(class.properties[0].span, Span::new(10, 6));

    let constructor = class.constructor.as_ref().unwrap();
    assert_eq!(constructor.arguments.len(), 2);
    assert!(matches!(
        &constructor.body[0],
        ParsedStatement::AssignProperty { property, value, .. }
            if property == "x" && value.as_name() == Some("x")
    ));
}

#[test]
fn test_from_json_decodes_expressions() {
    let text = r#"{
        "kind": "comparison",
        "left": {
            "kind": "function_call",
            "name": "len",
            "arguments": [{
                "kind": "member",
                "instance": {"kind": "name", "identifier": "self"},
                "name": "items"
            }]
        },
        "op": ">=",
        "right": {"kind": "constant", "value": {"type": "int", "value": 1}}
    }"#;

    let expr: Expr = serde_json::from_str(text).unwrap();
    let expected = Expr::compare(
        Expr::call("len", vec![Expr::self_member("items")]),
        Comparator::Ge,
        Expr::int(1),
    );
    assert_eq!(expr, expected);
}

#[test]
fn test_from_json_rejects_unknown_symbol_kind() {
    let text = r#"{"symbols": [{"kind": "interface", "name": "I"}], "ref_association": "I"}"#;
    assert!(from_json(text).is_err());
}

#[test]
fn test_json_round_trip_of_built_model() {
    let table = ParsedSymbolTable::new("Reference")
        .symbol(
            ParsedClass::concrete("Reference")
                .property(ParsedProperty::new(
                    "keys",
                    ParsedTypeAnnotation::list(ParsedTypeAnnotation::atomic("str")),
                ))
                .constructor(
                    ParsedConstructor::new()
                        .argument(ParsedArgument::new(
                            "keys",
                            ParsedTypeAnnotation::list(ParsedTypeAnnotation::atomic("str")),
                        ))
                        .assign("keys"),
                ),
        )
        .verification_function(ParsedFunction::implementation_specific(
            "is_valid",
            vec![ParsedArgument::new("text", ParsedTypeAnnotation::atomic("str"))],
        ));

    let text = serde_json::to_string(&table).unwrap();
    assert_eq!(from_json(&text).unwrap(), table);
}

// =============================================================================
// Type annotations
// =============================================================================

#[test]
fn test_type_annotation_display() {
    let annotation = ParsedTypeAnnotation::optional(ParsedTypeAnnotation::list(
        ParsedTypeAnnotation::reference(ParsedTypeAnnotation::atomic("Submodel")),
    ));
    assert_eq!(annotation.to_string(), "Optional[List[Ref[Submodel]]]");
    assert!(annotation.is_optional());
    assert!(!ParsedTypeAnnotation::atomic("int").is_optional());
}

// =============================================================================
// Visitor
// =============================================================================

#[derive(Default)]
struct CallCollector {
    names: Vec<String>,
}

impl Visitor for CallCollector {
    fn visit_function_call(&mut self, _call: &Expr, name: &str, arguments: &[Expr]) {
        self.names.push(name.to_string());
        for argument in arguments {
            self.visit_expr(argument);
        }
    }
}

#[test]
fn test_visitor_finds_nested_calls() {
    let expr = Expr::implies(
        Expr::is_not_none(Expr::self_member("value")),
        Expr::and(vec![
            Expr::call("is_xs_date", vec![Expr::self_member("value")]),
            Expr::compare(
                Expr::call("len", vec![Expr::call("strip", vec![Expr::self_member("value")])]),
                Comparator::Gt,
                Expr::int(0),
            ),
        ]),
    );

    let mut collector = CallCollector::default();
    collector.visit_expr(&expr);
    assert_eq!(collector.names, vec!["is_xs_date", "len", "strip"]);
}

#[test]
fn test_visitor_descends_into_joined_strings() {
    let expr = Expr::joined(vec![
        JoinedPart::Text {
            text: "^".to_string(),
        },
        JoinedPart::Formatted {
            value: Expr::call("digit", vec![]),
        },
    ]);

    let mut collector = CallCollector::default();
    collector.visit_expr(&expr);
    assert_eq!(collector.names, vec!["digit"]);
}

#[test]
fn test_comparator_flip() {
    assert_eq!(Comparator::Lt.flip(), Comparator::Gt);
    assert_eq!(Comparator::Ge.flip(), Comparator::Le);
    assert_eq!(Comparator::Eq.flip(), Comparator::Eq);
}

#[test]
fn test_self_member_helper() {
    assert_eq!(Expr::self_member("x").as_self_member(), Some("x"));
    assert_eq!(Expr::member(Expr::name("other"), "x").as_self_member(), None);
}
