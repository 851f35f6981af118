//! Byte-offset spans pointing back into the meta-model source.

use serde::{Deserialize, Serialize};

/// A contiguous region of the source text, in bytes.
///
/// Spans are carried by every parsed node so that diagnostics can be mapped
/// back to a line and column once the source text is available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub length: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    /// A span that does not point anywhere, used for synthesized nodes.
    #[inline]
    pub const fn dummy() -> Self {
        Self {
            start: 0,
            length: 0,
        }
    }

    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.start == 0 && self.length == 0
    }
}
