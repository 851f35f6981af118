use super::reporter::Reporter;
use metacore_common::{Diagnostic, Span};
use std::path::Path;

fn failure() -> Diagnostic {
    Diagnostic::aggregate(
        Span::dummy(),
        "Failed to translate the parsed symbol table to an intermediate symbol table",
        vec![
            Diagnostic::structural(
                Span::new(8, 3),
                "The class C inherits from Z, but Z is not defined",
            ),
            Diagnostic::documentation(
                Span::dummy(),
                "Dangling reference to a non-existing symbol: Z.x",
            ),
        ],
    )
}

#[test]
fn renders_leaves_under_the_headline() {
    let reporter = Reporter::new(false, Path::new("model.json"));

    assert_eq!(
        reporter.render(&failure()),
        "Failed to translate the parsed symbol table to an intermediate symbol table\n\
         \x20 model.json - structural error: The class C inherits from Z, but Z is not defined\n\
         \x20 model.json - documentation error: Dangling reference to a non-existing symbol: Z.x\n\
         \n\
         Found 2 errors."
    );
}

#[test]
fn positions_come_from_the_source() {
    let reporter =
        Reporter::new(false, Path::new("model.json"))
            .with_source(Path::new("model.py"), "class A:\n    pass\n".to_string());

    let rendered = reporter.render(&failure());

    assert!(rendered.contains("  model.py:1:9 - structural error"), "{rendered}");
    assert!(rendered.contains("  model.py - documentation error"), "{rendered}");
}

#[test]
fn single_diagnostic_is_its_own_headline() {
    let reporter = Reporter::new(false, Path::new("model.json"));
    let diagnostic = Diagnostic::consistency(Span::dummy(), "Something is off");

    assert_eq!(reporter.render(&diagnostic), "Something is off");
}
