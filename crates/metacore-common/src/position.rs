//! Line/column positions.
//!
//! The pipeline works purely with byte offsets. When the source text is at
//! hand, a `LineMap` turns those offsets into human-readable positions.

use serde::Serialize;
use std::fmt;

/// A zero-based position in the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    /// Rendered one-based, the way editors show it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Clone, Debug)]
pub struct LineMap {
    /// Starting offset of each line (line_starts[0] is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        let bytes = source.as_bytes();

        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'\n' => line_starts.push((i + 1) as u32),
                // A lone \r ends a line; \r\n is handled by the \n
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push((i + 1) as u32),
                _ => {}
            }
        }

        LineMap { line_starts }
    }

    /// Convert a byte offset to a position. Characters are counted in
    /// Unicode scalar values; offsets past the end clamp to the end.
    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let offset = offset.min(source.len() as u32);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_at) => insert_at.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0) as usize;

        let mut end = offset as usize;
        while end > line_start && !source.is_char_boundary(end) {
            end -= 1;
        }
        let character = source
            .get(line_start..end)
            .map_or(0, |prefix| prefix.chars().count());

        Position::new(line as u32, character as u32)
    }
}
