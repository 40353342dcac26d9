//! # DBasic syntax tree
//!
//! This crate defines the post-processed syntax tree of a DBasic program:
//! the shape of the parser's output after the AST passes (notably
//! array-vs-function-call disambiguation) have run. The semantic converter
//! consumes this tree read-only.
//!
//! The whole tree is serde-serializable so that the parser front-end, which
//! lives in a separate component, can hand a finished tree to the driver as
//! JSON.

pub mod ast;

pub use ast::{
    BinaryOp, Block, Expression, ExpressionKind, FunctionDecl, Ident, Literal, Sigil, Statement,
    StatementKind, TypeAnnotation, UnaryOp,
};

use serde::{Deserialize, Serialize};

/// A half-open byte range into the source file.
///
/// Kept as a plain pair of offsets so it serializes with the rest of the
/// tree; converted to the diagnostics span type at the reporting boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The zero span used for synthesized nodes
    pub const fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }
}

impl From<SourceSpan> for chumsky::span::SimpleSpan<usize> {
    fn from(span: SourceSpan) -> Self {
        Self::from(span.start..span.end)
    }
}

impl From<std::ops::Range<usize>> for SourceSpan {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}
