use super::*;
use metacore_common::DiagnosticKind;
use metacore_parse::{
    Comparator, Expr, FunctionStatement, ParsedArgument, ParsedClass, ParsedFunction,
    ParsedInvariant, ParsedProperty, ParsedSymbolTable, ParsedTypeAnnotation,
};

fn optional_str() -> ParsedTypeAnnotation {
    ParsedTypeAnnotation::optional(ParsedTypeAnnotation::atomic("str"))
}

fn len_of(property: &str) -> Expr {
    Expr::call("len", vec![Expr::self_member(property)])
}

/// `C` with optional string properties `s`, `t` and `u` plus the invariants.
fn table_with(invariants: Vec<Expr>) -> SymbolTable {
    let mut class = ParsedClass::concrete("C")
        .property(ParsedProperty::new("s", optional_str()))
        .property(ParsedProperty::new("t", optional_str()))
        .property(ParsedProperty::new("u", optional_str()));
    for body in invariants {
        class = class.invariant(ParsedInvariant::new(body));
    }
    let parsed = ParsedSymbolTable::new("C").symbol(class);
    translate(&parsed, &TranslateOptions::default()).expect("translation succeeds")
}

fn len_constraints(
    table: &SymbolTable,
    symbol: &str,
) -> Result<Vec<(String, LenConstraint)>, Vec<String>> {
    infer_len_constraints(table.find(symbol).expect("symbol exists"))
        .map(|constraints| constraints.into_iter().collect())
        .map_err(|errors| errors.into_iter().map(|error| error.message_text).collect())
}

fn bounded(min_value: Option<i64>, max_value: Option<i64>) -> LenConstraint {
    LenConstraint { min_value, max_value }
}

// =============================================================================
// Length
// =============================================================================

#[test]
fn test_min_and_max_are_combined() {
    let table = table_with(vec![
        Expr::compare(len_of("s"), Comparator::Ge, Expr::int(1)),
        Expr::compare(len_of("s"), Comparator::Lt, Expr::int(10)),
        Expr::compare(Expr::int(2), Comparator::Le, len_of("t")),
        Expr::compare(len_of("t"), Comparator::Gt, Expr::int(4)),
    ]);

    assert_eq!(
        len_constraints(&table, "C"),
        Ok(vec![
            ("s".to_string(), bounded(Some(1), Some(9))),
            ("t".to_string(), bounded(Some(5), None)),
        ])
    );
}

#[test]
fn test_guarded_invariants_are_understood() {
    let table = table_with(vec![
        Expr::or(vec![
            Expr::is_none(Expr::self_member("s")),
            Expr::compare(len_of("s"), Comparator::Eq, Expr::int(3)),
        ]),
        Expr::implies(
            Expr::is_not_none(Expr::self_member("t")),
            Expr::compare(len_of("t"), Comparator::Le, Expr::int(8)),
        ),
    ]);

    assert_eq!(
        len_constraints(&table, "C"),
        Ok(vec![
            ("s".to_string(), bounded(Some(3), Some(3))),
            ("t".to_string(), bounded(None, Some(8))),
        ])
    );
}

#[test]
fn test_inequality_and_foreign_properties_yield_nothing() {
    let table = table_with(vec![
        Expr::compare(len_of("s"), Comparator::Ne, Expr::int(0)),
        Expr::compare(len_of("unknown"), Comparator::Ge, Expr::int(1)),
    ]);

    assert_eq!(len_constraints(&table, "C"), Ok(Vec::new()));
}

#[test]
fn test_contradicting_bounds_are_reported() {
    let table = table_with(vec![
        Expr::compare(len_of("s"), Comparator::Eq, Expr::int(3)),
        Expr::compare(len_of("s"), Comparator::Ge, Expr::int(6)),
        Expr::compare(len_of("t"), Comparator::Ge, Expr::int(1)),
    ]);

    assert_eq!(
        len_constraints(&table, "C"),
        Err(vec![
            "The property s has conflicting invariants on the length: the minimum length, 6, \
             contradicts the exactly expected length 3."
                .to_string()
        ])
    );

    let errors = infer_len_constraints(table.find("C").unwrap()).unwrap_err();
    assert_eq!(errors[0].kind, DiagnosticKind::Consistency);
}

#[test]
fn test_bounds_beyond_the_integer_range_are_unsatisfiable() {
    let table = table_with(vec![
        Expr::compare(len_of("s"), Comparator::Lt, Expr::int(i64::MIN)),
        Expr::compare(Expr::int(i64::MAX), Comparator::Lt, len_of("t")),
        Expr::compare(len_of("u"), Comparator::Le, Expr::int(i64::MAX)),
    ]);

    assert_eq!(
        len_constraints(&table, "C"),
        Err(vec![
            format!(
                "The property s has conflicting invariants on the length: \
                 no length satisfies len(self.s) < {}.",
                i64::MIN
            ),
            format!(
                "The property t has conflicting invariants on the length: \
                 no length satisfies len(self.t) > {}.",
                i64::MAX
            ),
        ])
    );
}

#[test]
fn test_inherited_invariants_constrain_descendants() {
    let parsed = ParsedSymbolTable::new("B")
        .symbol(
            ParsedClass::abstract_class("A")
                .property(ParsedProperty::new("s", optional_str()))
                .invariant(ParsedInvariant::new(Expr::compare(
                    len_of("s"),
                    Comparator::Le,
                    Expr::int(64),
                ))),
        )
        .symbol(ParsedClass::concrete("B").inherits("A"));
    let table = translate(&parsed, &TranslateOptions::default()).expect("translation succeeds");

    assert_eq!(
        len_constraints(&table, "B"),
        Ok(vec![("s".to_string(), bounded(None, Some(64)))])
    );
}

// =============================================================================
// Patterns
// =============================================================================

#[test]
fn test_patterns_come_from_pattern_verifications_only() {
    let text = || vec![ParsedArgument::new("text", ParsedTypeAnnotation::atomic("str"))];
    let digits = ParsedFunction::understood(
        "matches_digits",
        text(),
        vec![FunctionStatement::returns(Expr::is_not_none(Expr::call(
            "match",
            vec![Expr::str("^[0-9]+$"), Expr::name("text")],
        )))],
    );
    let special = ParsedFunction::implementation_specific("is_special", text());

    let mut class = ParsedClass::concrete("C").property(ParsedProperty::new("s", optional_str()));
    for function in ["matches_digits", "is_special"] {
        class = class.invariant(ParsedInvariant::new(Expr::or(vec![
            Expr::is_none(Expr::self_member("s")),
            Expr::call(function, vec![Expr::self_member("s")]),
        ])));
    }
    let parsed = ParsedSymbolTable::new("C")
        .symbol(class)
        .verification_function(digits)
        .verification_function(special);
    let table = translate(&parsed, &TranslateOptions::default()).expect("translation succeeds");

    let patterns = infer_pattern_constraints(table.find("C").unwrap(), &table);

    assert_eq!(
        patterns.into_iter().collect::<Vec<_>>(),
        vec![("s".to_string(), vec!["^[0-9]+$".to_string()])]
    );
}
