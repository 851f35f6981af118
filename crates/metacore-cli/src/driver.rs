//! One run of the binary: read and decode the parsed model, translate it,
//! then write the dump or render why the translation failed.

use anyhow::{Context, Result};
use metacore_common::Diagnostic;
use metacore_intermediate::{SymbolTable, TranslateOptions, dump, translate};
use std::fs;
use std::path::Path;
use tracing::{debug, info_span};

use crate::args::{CliArgs, DiagnosticsFormat};
use crate::reporter::Reporter;

/// What a run of the binary produced.
#[derive(Debug)]
pub enum Outcome {
    /// The dump, unless it was written to `--dump-to`.
    Translated { dump: Option<String> },
    Failed(Diagnostic),
}

/// Read, translate and dump the model named by `args`.
///
/// I/O and decoding problems are errors; a model that fails to translate is
/// a regular [`Outcome::Failed`].
pub fn run(args: &CliArgs) -> Result<Outcome> {
    let options = TranslateOptions {
        doc_roles: args.doc_roles()?,
    };

    let table = match load_and_translate(&args.model, &options)? {
        Ok(table) => table,
        Err(diagnostic) => return Ok(Outcome::Failed(diagnostic)),
    };

    let text = dump(&table);
    match &args.dump_to {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("failed to write the dump to {}", path.display()))?;
            debug!(path = %path.display(), "dump written");
            Ok(Outcome::Translated { dump: None })
        }
        None => Ok(Outcome::Translated { dump: Some(text) }),
    }
}

pub fn load_and_translate(
    model: &Path,
    options: &TranslateOptions,
) -> Result<Result<SymbolTable, Diagnostic>> {
    let text = fs::read_to_string(model)
        .with_context(|| format!("failed to read {}", model.display()))?;
    let parsed = metacore_parse::from_json(&text).with_context(|| {
        format!("failed to decode the parsed meta-model from {}", model.display())
    })?;

    let _span = info_span!("translate", model = %model.display()).entered();
    Ok(translate(&parsed, options))
}

/// Render a failed translation in the requested format.
pub fn report(args: &CliArgs, diagnostic: &Diagnostic) -> Result<String> {
    match args.diagnostics {
        DiagnosticsFormat::Json => {
            serde_json::to_string_pretty(diagnostic).context("failed to serialize the diagnostics")
        }
        DiagnosticsFormat::Text => {
            let mut reporter = Reporter::new(!args.no_color, &args.model);
            if let Some(source) = &args.source {
                let text = fs::read_to_string(source)
                    .with_context(|| format!("failed to read the source {}", source.display()))?;
                reporter = reporter.with_source(source, text);
            }
            Ok(reporter.render(diagnostic))
        }
    }
}
