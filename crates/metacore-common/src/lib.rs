//! Common types shared by the metacore crates.
//!
//! This crate provides the foundational pieces used across the pipeline:
//! - Source spans (`Span`)
//! - Line/column positions computed from byte offsets (`LineMap`, `Position`)
//! - Identifier validation
//! - The `Diagnostic` tree every stage reports its failures with

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Position types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Identifier validation
pub mod identifier;
pub use identifier::{Identifier, is_identifier};

// Diagnostics
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticKind};

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;

#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod position_tests;
