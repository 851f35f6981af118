use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use metacore_intermediate::{DocRoles, ReferenceKind};
use std::path::PathBuf;

/// CLI arguments for the metacore binary.
#[derive(Parser, Debug)]
#[command(
    name = "metacore",
    version,
    about = "Translate a parsed meta-model into a resolved intermediate symbol table"
)]
pub struct CliArgs {
    /// The parsed meta-model as JSON.
    pub model: PathBuf,

    /// Write the dump of the symbol table here instead of to stdout.
    #[arg(long = "dump-to", value_name = "PATH")]
    pub dump_to: Option<PathBuf>,

    /// Additional docstring roles as `name=kind`, where kind is one of
    /// `symbol`, `attribute` or `argument`.
    #[arg(long, value_delimiter = ',', value_name = "ROLE=KIND")]
    pub roles: Vec<String>,

    /// The meta-model source the spans point into, for line/column positions.
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// How to report diagnostics.
    #[arg(long, value_enum, default_value_t = DiagnosticsFormat::Text)]
    pub diagnostics: DiagnosticsFormat,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DiagnosticsFormat {
    Text,
    Json,
}

impl CliArgs {
    /// The default roles extended (or overridden) by `--roles`.
    pub fn doc_roles(&self) -> Result<DocRoles> {
        parse_roles(DocRoles::default(), &self.roles)
    }
}

pub fn parse_roles(mut roles: DocRoles, entries: &[String]) -> Result<DocRoles> {
    for entry in entries {
        let Some((name, kind)) = entry.split_once('=') else {
            bail!("expected a role as name=kind, but got: {entry}");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("the role name is empty in: {entry}");
        }
        let Some(kind) = ReferenceKind::parse(kind.trim()) else {
            bail!(
                "unknown reference kind {kind:?} for the role {name}; \
                 expected symbol, attribute or argument"
            );
        };
        roles = roles.with(name, kind);
    }
    Ok(roles)
}
