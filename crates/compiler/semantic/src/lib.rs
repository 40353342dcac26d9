//! # DBasic semantic conversion
//!
//! The converter turns a post-processed syntax tree plus a command index
//! into a typed [`Program`](dbasic_compiler_ir::Program). It resolves
//! identifiers (declaring implicit variables by sigil), selects command
//! overloads, inserts explicit casts, and type-checks user-function calls.
//!
//! Conversion runs in two phases over the top-level block: first every
//! function declaration contributes a skeleton (name, typed parameters,
//! empty body) so forward references resolve, then the main body and every
//! function body convert in declaration order.
//!
//! ## Error handling
//!
//! Recoverable semantic errors accumulate in a
//! [`DiagnosticCollection`](dbasic_compiler_diagnostics::DiagnosticCollection)
//! while conversion keeps producing best-effort IR so sibling statements
//! still get checked; at the end an errored conversion yields
//! [`SemanticError::Failed`] instead of a program. States that indicate a
//! compiler bug (an unknown command name coming out of the parser, an
//! internal type marker surviving overload filtering) abort immediately
//! with [`SemanticError::Invariant`].

pub mod converter;
pub mod overloads;
pub mod type_resolution;

pub use converter::convert_block;

use dbasic_compiler_diagnostics::DiagnosticCollection;

/// Why a conversion produced no program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// One or more semantic errors were reported; the collection holds all
    /// diagnostics emitted during the run
    Failed(DiagnosticCollection),
    /// A converter invariant was violated; this indicates a bug in the
    /// parser or the converter itself
    Invariant(String),
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(diagnostics) => {
                write!(f, "semantic conversion failed: {}", diagnostics.summary())
            }
            Self::Invariant(message) => write!(f, "converter invariant violated: {message}"),
        }
    }
}

impl std::error::Error for SemanticError {}

/// Result type for semantic conversion
pub type SemanticResult<T> = Result<T, SemanticError>;
