//! # DBasic typed intermediate representation
//!
//! This crate defines the data structures the semantic converter produces:
//! a [`Program`] of flattened, explicitly typed functions ready for backend
//! lowering.
//!
//! ## Architecture
//!
//! ```text
//! Program
//! main: FunctionDefinition            ("__DBMain", no arguments)
//! functions: IndexVec<FunctionId, FunctionDefinition>
//!
//! FunctionDefinition
//! scope: Scope                        (IndexVec<VariableId, Variable>)
//! body: Vec<Statement>
//! return_expression: Option<Expression>
//! ```
//!
//! ## Ownership
//!
//! A program owns its functions; a function owns its scope, body and return
//! expression; statements own their sub-expressions. Variables live in their
//! function's scope arena and expressions refer to them by [`VariableId`];
//! command overloads stay owned by the `CommandIndex` and are referenced by
//! `CommandId`. Dropping the program releases every node.
//!
//! ## Error recovery
//!
//! The converter keeps checking sibling statements after an error, so the
//! expression model includes an explicit [`ExpressionKind::Error`]
//! placeholder node. A program containing one is never handed to a backend.

pub use dbasic_compiler_ast::{BinaryOp, Literal, Sigil, SourceSpan, UnaryOp};

pub use expression::{Callee, Expression, ExpressionKind, FunctionCall};
pub use function::{FunctionDefinition, Scope, Variable};
pub use program::{MAIN_FUNCTION_NAME, Program};
pub use statement::{Statement, StatementKind};
pub use types::{BuiltinType, Type};

pub mod expression;
pub mod function;
pub mod program;
pub mod statement;
pub mod types;

index_vec::define_index_type! {
    /// Unique identifier for a user function within a program
    pub struct FunctionId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a variable within a function's scope
    pub struct VariableId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a user-defined type
    pub struct UdtId = usize;
}

/// Trait for pretty-printing IR nodes with indentation
pub trait PrettyPrint {
    fn pretty_print(&self, indent: usize) -> String;
}

/// Returns the indentation string for a given level
pub fn indent_str(indent: usize) -> String {
    "  ".repeat(indent)
}
