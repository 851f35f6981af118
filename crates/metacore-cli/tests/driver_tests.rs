use super::args::CliArgs;
use super::driver::{Outcome, report, run};
use clap::Parser;
use metacore_parse::{
    DocNode, ParsedArgument, ParsedClass, ParsedConstructor, ParsedDescription, ParsedProperty,
    ParsedSymbolTable, ParsedTypeAnnotation,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn valid_model() -> ParsedSymbolTable {
    ParsedSymbolTable::new("Reference")
        .symbol(ParsedClass::concrete("Reference").described(ParsedDescription::paragraph(vec![
            DocNode::text("Points to a "),
            DocNode::role("see", ".Item"),
        ])))
        .symbol(
            ParsedClass::concrete("Item")
                .property(ParsedProperty::new("name", ParsedTypeAnnotation::atomic("str")))
                .constructor(
                    ParsedConstructor::new()
                        .argument(ParsedArgument::new("name", ParsedTypeAnnotation::atomic("str")))
                        .assign("name"),
                ),
        )
}

fn write_model(dir: &TempDir, parsed: &ParsedSymbolTable) -> PathBuf {
    let path = dir.path().join("model.json");
    let json = serde_json::to_string(parsed).expect("serializable model");
    fs::write(&path, json).expect("write model");
    path
}

fn args(model: &Path, extra: &[&str]) -> CliArgs {
    let mut argv = vec![
        "metacore".to_string(),
        model.display().to_string(),
        "--no-color".to_string(),
    ];
    argv.extend(extra.iter().map(|arg| arg.to_string()));
    CliArgs::try_parse_from(argv).expect("valid args")
}

#[test]
fn dumps_a_valid_model() {
    let dir = TempDir::new().expect("temp dir");
    let model = write_model(&dir, &valid_model());

    let outcome = run(&args(&model, &["--roles", "see=symbol"])).expect("run succeeds");

    let dump = match outcome {
        Outcome::Translated { dump: Some(dump) } => dump,
        other => panic!("expected a dump, got {other:?}"),
    };
    let value: serde_json::Value = serde_json::from_str(&dump).expect("dump is JSON");
    assert_eq!(value["ref_association"], "Reference");
}

#[test]
fn writes_the_dump_to_a_file() {
    let dir = TempDir::new().expect("temp dir");
    let model = write_model(&dir, &valid_model());
    let target = dir.path().join("dump.json");

    let outcome = run(&args(
        &model,
        &["--roles", "see=symbol", "--dump-to", &target.display().to_string()],
    ))
    .expect("run succeeds");

    assert!(matches!(outcome, Outcome::Translated { dump: None }));
    let written = fs::read_to_string(&target).expect("dump written");
    assert!(written.contains("\"Item\""));
}

#[test]
fn reports_translation_failures() {
    let dir = TempDir::new().expect("temp dir");
    let model = write_model(&dir, &valid_model());
    let args = args(&model, &[]);

    let outcome = run(&args).expect("run succeeds");

    let Outcome::Failed(diagnostic) = outcome else {
        panic!("the role see is not configured");
    };
    let rendered = report(&args, &diagnostic).expect("rendered");
    assert!(rendered.starts_with("Failed to translate the parsed symbol table"), "{rendered}");
    assert!(
        rendered.contains(
            "documentation error: The role \"see\" of the reference \".Item\" is not supported"
        ),
        "{rendered}"
    );
    assert!(rendered.ends_with("Found 1 error."), "{rendered}");
}

#[test]
fn reports_failures_as_json() {
    let dir = TempDir::new().expect("temp dir");
    let parsed = ParsedSymbolTable::new("Missing").symbol(ParsedClass::concrete("C"));
    let model = write_model(&dir, &parsed);
    let args = args(&model, &["--diagnostics", "json"]);

    let Outcome::Failed(diagnostic) = run(&args).expect("run succeeds") else {
        panic!("the reference association is missing");
    };
    let value: serde_json::Value =
        serde_json::from_str(&report(&args, &diagnostic).expect("rendered"))
            .expect("diagnostics are JSON");

    assert_eq!(value["kind"], "aggregate");
    assert_eq!(
        value["underlying"][0]["message_text"],
        "The reference association Missing is not defined in the symbol table"
    );
}

#[test]
fn unreadable_input_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("missing.json");
    let error = run(&args(&missing, &[])).unwrap_err();
    assert!(error.to_string().starts_with("failed to read"), "{error}");

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "{ not json").expect("write garbage");
    let error = run(&args(&garbage, &[])).unwrap_err();
    assert!(error.to_string().starts_with("failed to decode"), "{error}");
}
