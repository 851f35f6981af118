use super::*;
use metacore_common::DiagnosticKind;
use metacore_parse::{
    Comparator, DocNode, Expr, ParsedArgument, ParsedClass, ParsedConstructor, ParsedContract,
    ParsedDescription, ParsedFunction, ParsedInvariant, ParsedMethod, ParsedProperty,
    ParsedSnapshot, ParsedSymbolTable, ParsedTypeAnnotation,
};

fn str_type() -> ParsedTypeAnnotation {
    ParsedTypeAnnotation::atomic("str")
}

fn base_model() -> ParsedSymbolTable {
    ParsedSymbolTable::new("Reference").symbol(ParsedClass::concrete("Reference"))
}

/// `C { s: str }` with a constructor setting `s` and the given invariant.
fn with_invariant(body: Expr) -> ParsedSymbolTable {
    base_model().symbol(
        ParsedClass::concrete("C")
            .property(ParsedProperty::new("s", str_type()))
            .constructor(
                ParsedConstructor::new()
                    .argument(ParsedArgument::new("s", str_type()))
                    .assign("s"),
            )
            .invariant(ParsedInvariant::new(body)),
    )
}

fn len_of_s(arguments: usize) -> Expr {
    Expr::call("len", vec![Expr::self_member("s"); arguments])
}

fn failures(parsed: &ParsedSymbolTable) -> Vec<(DiagnosticKind, String)> {
    match translate(parsed, &TranslateOptions::default()) {
        Ok(_) => Vec::new(),
        Err(error) => error
            .leaves()
            .into_iter()
            .map(|leaf| (leaf.kind, leaf.message_text.clone()))
            .collect(),
    }
}

// =============================================================================
// Type discriminators
// =============================================================================

fn discriminated_model(with_model_type: Option<bool>, implementers: &[&str]) -> ParsedSymbolTable {
    let interface = match with_model_type {
        Some(value) => ParsedClass::abstract_class("I").with_model_type(value),
        None => ParsedClass::abstract_class("I"),
    };
    let mut parsed = base_model().symbol(interface).symbol(
        ParsedClass::concrete("Holder").property(ParsedProperty::new(
            "item",
            ParsedTypeAnnotation::optional(ParsedTypeAnnotation::atomic("I")),
        )),
    );
    for name in implementers {
        parsed = parsed.symbol(ParsedClass::concrete(*name).inherits("I"));
    }
    parsed
}

#[test]
fn test_interface_with_many_implementers_needs_model_type() {
    let errors = failures(&discriminated_model(None, &["A", "B"]));

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|(kind, _)| *kind == DiagnosticKind::Consistency));
    assert_eq!(
        errors[0].1,
        "The class A needs to have serialization setting with_model_type set since it is \
         among the concrete classes of the abstract class I. Otherwise, the abstract class I \
         can not be de/serialized properly."
    );
    assert!(errors[1].1.starts_with("The class B needs"));
}

#[test]
fn test_model_type_satisfies_discriminator_check() {
    assert_eq!(failures(&discriminated_model(Some(true), &["A", "B"])), Vec::new());
}

#[test]
fn test_single_implementer_needs_no_discriminator() {
    assert_eq!(failures(&discriminated_model(None, &["A"])), Vec::new());
}

#[test]
fn test_unused_interface_needs_no_discriminator() {
    let parsed = base_model()
        .symbol(ParsedClass::abstract_class("I"))
        .symbol(ParsedClass::concrete("A").inherits("I"))
        .symbol(ParsedClass::concrete("B").inherits("I"));

    assert_eq!(failures(&parsed), Vec::new());
}

// =============================================================================
// Contract calls
// =============================================================================

#[test]
fn test_len_with_one_argument_is_accepted() {
    let parsed = with_invariant(Expr::compare(len_of_s(1), Comparator::Ge, Expr::int(1)));

    assert_eq!(failures(&parsed), Vec::new());
}

#[test]
fn test_len_arity_is_checked() {
    let parsed = with_invariant(Expr::compare(len_of_s(2), Comparator::Ge, Expr::int(1)));

    assert_eq!(
        failures(&parsed),
        vec![(
            DiagnosticKind::Consistency,
            "Expected exactly 1 arguments to a function call to \"len\", but got: 2".to_string()
        )]
    );
}

#[test]
fn test_unknown_function_is_reported_once() {
    let call = Expr::call("frobnicate", vec![Expr::self_member("s")]);
    let parsed = base_model()
        .symbol(
            ParsedClass::abstract_class("A")
                .property(ParsedProperty::new("s", ParsedTypeAnnotation::optional(str_type())))
                .invariant(ParsedInvariant::new(call)),
        )
        .symbol(ParsedClass::concrete("B").inherits("A"));

    assert_eq!(
        failures(&parsed),
        vec![(
            DiagnosticKind::Consistency,
            "The handling of the function is not implemented: \"frobnicate\"".to_string()
        )]
    );
}

#[test]
fn test_verification_function_arity_is_checked() {
    let verification =
        ParsedFunction::implementation_specific(
            "is_special",
            vec![ParsedArgument::new("text", str_type())],
        );
    let good = with_invariant(Expr::call("is_special", vec![Expr::self_member("s")]))
        .verification_function(verification.clone());
    let bad = with_invariant(Expr::call(
        "is_special",
        vec![Expr::self_member("s"), Expr::self_member("s")],
    ))
    .verification_function(verification);

    assert_eq!(failures(&good), Vec::new());
    assert_eq!(
        failures(&bad),
        vec![(
            DiagnosticKind::Consistency,
            "Expected exactly 1 arguments to a function call to \"is_special\", but got: 2".to_string()
        )]
    );
}

#[test]
fn test_nested_calls_are_checked() {
    let parsed = with_invariant(Expr::compare(
        Expr::call("len", vec![Expr::call("strip", vec![Expr::self_member("s")])]),
        Comparator::Gt,
        Expr::int(0),
    ));

    assert_eq!(
        failures(&parsed),
        vec![(
            DiagnosticKind::Consistency,
            "The handling of the function is not implemented: \"strip\"".to_string()
        )]
    );
}

/// `check(self, text: str)` with the contracts added by the caller.
fn text_method() -> ParsedMethod {
    ParsedMethod::new("check").argument(ParsedArgument::new("text", str_type()))
}

fn len_of_text(arguments: usize) -> Expr {
    Expr::call("len", vec![Expr::name("text"); arguments])
}

fn with_method(method: ParsedMethod) -> ParsedSymbolTable {
    base_model().symbol(ParsedClass::concrete("C").method(method))
}

#[test]
fn test_len_arity_in_precondition_is_checked() {
    let accepted = with_method(
        text_method().precondition(ParsedContract::new(vec!["text"], len_of_text(1))),
    );
    let rejected = with_method(
        text_method().precondition(ParsedContract::new(vec!["text"], len_of_text(2))),
    );

    assert_eq!(failures(&accepted), Vec::new());
    assert_eq!(
        failures(&rejected),
        vec![(
            DiagnosticKind::Consistency,
            "Expected exactly 1 arguments to a function call to \"len\", but got: 2".to_string()
        )]
    );
}

#[test]
fn test_snapshots_and_postconditions_are_checked() {
    let parsed = with_method(
        text_method()
            .snapshot(ParsedSnapshot::new(
                vec!["text"],
                "stripped",
                Expr::call("strip", vec![Expr::name("text")]),
            ))
            .postcondition(ParsedContract::new(vec!["text"], len_of_text(0))),
    );

    assert_eq!(
        failures(&parsed),
        vec![
            (
                DiagnosticKind::Consistency,
                "Expected exactly 1 arguments to a function call to \"len\", but got: 0"
                    .to_string()
            ),
            (
                DiagnosticKind::Consistency,
                "The handling of the function is not implemented: \"strip\"".to_string()
            ),
        ]
    );
}

#[test]
fn test_signature_and_constructor_contracts_are_checked() {
    let parsed = base_model()
        .symbol(
            ParsedClass::abstract_class("I").method(
                text_method().precondition(ParsedContract::new(vec!["text"], len_of_text(2))),
            ),
        )
        .symbol(
            ParsedClass::concrete("D").constructor(
                ParsedConstructor::new()
                    .precondition(ParsedContract::new(vec![], Expr::call("frobnicate", vec![]))),
            ),
        );

    assert_eq!(
        failures(&parsed),
        vec![
            (
                DiagnosticKind::Consistency,
                "Expected exactly 1 arguments to a function call to \"len\", but got: 2"
                    .to_string()
            ),
            (
                DiagnosticKind::Consistency,
                "The handling of the function is not implemented: \"frobnicate\"".to_string()
            ),
        ]
    );
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_uninitialized_property_is_reported() {
    let parsed = base_model().symbol(
        ParsedClass::concrete("C")
            .property(ParsedProperty::new("x", ParsedTypeAnnotation::atomic("int"))),
    );

    assert_eq!(
        failures(&parsed),
        vec![(
            DiagnosticKind::Initialization,
            "The property \"x\" is not properly initialized in the constructor of the class \"C\".".to_string()
        )]
    );
}

#[test]
fn test_optional_argument_does_not_initialize_mandatory_property() {
    let parsed = base_model().symbol(
        ParsedClass::concrete("C")
            .property(ParsedProperty::new("x", ParsedTypeAnnotation::atomic("int")))
            .constructor(
                ParsedConstructor::new()
                    .argument(
                        ParsedArgument::new(
                            "x",
                            ParsedTypeAnnotation::optional(ParsedTypeAnnotation::atomic("int")),
                        )
                            .with_default(Expr::none()),
                    )
                    .assign("x"),
            ),
    );

    let errors = failures(&parsed);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, DiagnosticKind::Initialization);
}

#[test]
fn test_structural_default_initializes_property() {
    let items = || ParsedTypeAnnotation::list(ParsedTypeAnnotation::atomic("int"));
    let parsed = base_model().symbol(
        ParsedClass::concrete("C")
            .property(ParsedProperty::new("items", items()))
            .constructor(
                ParsedConstructor::new()
                    .argument(
                        ParsedArgument::new("items", ParsedTypeAnnotation::optional(items()))
                            .with_default(Expr::none()),
                    )
                    .assign_expr(
                        "items",
                        Expr::conditional(
                            Expr::name("items"),
                            Expr::is_not_none(Expr::name("items")),
                            Expr::list(vec![]),
                        ),
                    ),
            ),
    );

    assert_eq!(failures(&parsed), Vec::new());
}

#[test]
fn test_implementation_specific_class_is_exempt() {
    let parsed = base_model().symbol(
        ParsedClass::concrete("C")
            .implementation_specific()
            .property(ParsedProperty::new("x", ParsedTypeAnnotation::atomic("int"))),
    );

    assert_eq!(failures(&parsed), Vec::new());
}

#[test]
fn test_initialization_check_on_a_single_class() {
    let table = translate(
        &base_model().symbol(
            ParsedClass::concrete("C")
                .property(ParsedProperty::new(
                    "x",
                    ParsedTypeAnnotation::optional(ParsedTypeAnnotation::atomic("int")),
                )),
        ),
        &TranslateOptions::default(),
    )
    .expect("translation succeeds");

    let mut class = table.find_class("C").cloned().expect("class C");
    assert_eq!(validate::check_all_non_optional_properties_initialized(&class), Vec::new());

    class.properties[0].type_annotation =
        class.properties[0].type_annotation.beneath_optional().clone();
    let errors = validate::check_all_non_optional_properties_initialized(&class);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::Initialization);
}

// =============================================================================
// Argument references
// =============================================================================

#[test]
fn test_argument_reference_must_name_an_argument() {
    let described = |reference: &str| {
        ParsedDescription::paragraph(vec![
            DocNode::text("Uses "),
            DocNode::role("paramref", reference),
        ])
    };
    let parsed = base_model().symbol(
        ParsedClass::concrete("C").method(
            ParsedMethod::new("check")
                .argument(ParsedArgument::new("limit", ParsedTypeAnnotation::atomic("int")))
                .described(described("limit")),
        ),
    );
    assert_eq!(failures(&parsed), Vec::new());

    let parsed = base_model().symbol(
        ParsedClass::concrete("C").method(ParsedMethod::new("check").described(described("limit"))),
    );
    assert_eq!(
        failures(&parsed),
        vec![(
            DiagnosticKind::Documentation,
            "The argument referenced in the docstring is not an argument of \"check\": \"limit\"".to_string()
        )]
    );
}
