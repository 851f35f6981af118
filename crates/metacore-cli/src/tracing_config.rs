//! Tracing for inspecting a translation.
//!
//! Nothing is installed unless `METACORE_LOG` or `RUST_LOG` carries filter
//! directives; `METACORE_LOG` wins when both are set. `METACORE_LOG_FORMAT`
//! selects how events are laid out:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: `tracing-tree` output, one indented block per pipeline stage
//! - `json`: one JSON object per span or event
//!
//! ```bash
//! METACORE_LOG=debug METACORE_LOG_FORMAT=tree metacore model.json
//! METACORE_LOG="metacore_intermediate::second_pass=trace" metacore model.json
//! ```
//!
//! Everything is written to stderr, so a dump on stdout stays parseable.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

pub const LOG_VAR: &str = "METACORE_LOG";
pub const FORMAT_VAR: &str = "METACORE_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Case-insensitive; anything unrecognized is `Text`.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("tree") {
            Self::Tree
        } else if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Filter directives and layout picked from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub directives: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// `None` when neither directive source is set.
    pub fn resolve(
        own: Option<String>,
        rust_log: Option<String>,
        format: Option<&str>,
    ) -> Option<Self> {
        let directives = own.or(rust_log)?;
        Some(Self {
            directives,
            format: format.map(LogFormat::parse).unwrap_or_default(),
        })
    }

    pub fn from_env() -> Option<Self> {
        let format = std::env::var(FORMAT_VAR).ok();
        Self::resolve(
            std::env::var(LOG_VAR).ok(),
            std::env::var("RUST_LOG").ok(),
            format.as_deref(),
        )
    }

    /// Invalid directives are skipped rather than rejected.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::builder().parse_lossy(&self.directives)
    }

    /// Install the global subscriber. Only the layer matching `format` is
    /// present; the others are `None`.
    pub fn install(&self) {
        let tree = (self.format == LogFormat::Tree).then(|| {
            tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true)
        });
        let json = (self.format == LogFormat::Json)
            .then(|| fmt::layer().json().with_writer(std::io::stderr));
        let text = (self.format == LogFormat::Text)
            .then(|| fmt::layer().with_writer(std::io::stderr));

        Registry::default()
            .with(self.filter())
            .with(tree)
            .with(json)
            .with(text)
            .init();
    }
}

/// Install tracing if the environment asks for it.
pub fn init_tracing() {
    if let Some(settings) = LogSettings::from_env() {
        settings.install();
    }
}
