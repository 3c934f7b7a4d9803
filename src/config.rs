//! Per-call options
//!
//! Options arrive from Elixir as maps or keyword lists and are decoded in
//! `term`; these are the plain Rust forms the conversion code consumes.

use crate::dom::ValueFormat;

/// Options for path writes and `encode`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Store element text as marked literals (CDATA) instead of escaped text
    pub use_marked_literal: bool,
}

impl WriteOptions {
    /// How element values are stored under these options
    pub fn format(&self) -> ValueFormat {
        if self.use_marked_literal {
            ValueFormat::Literal
        } else {
            ValueFormat::Escaped
        }
    }
}
