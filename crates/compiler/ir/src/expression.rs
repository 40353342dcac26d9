//! # IR expressions
//!
//! Every expression carries its resolved [`Type`] and a source span. The
//! converter inserts explicit [`ExpressionKind::Cast`] nodes wherever a
//! value changes type, so backends never need to re-derive conversions.

use dbasic_commands::CommandId;
use dbasic_compiler_ast::{BinaryOp, Literal, SourceSpan, UnaryOp};

use crate::{FunctionId, PrettyPrint, Type, VariableId};

/// A typed expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    /// The resolved type of this expression's value
    pub ty: Type,
    pub span: SourceSpan,
}

impl Expression {
    pub const fn new(kind: ExpressionKind, ty: Type, span: SourceSpan) -> Self {
        Self { kind, ty, span }
    }

    /// Wraps this expression in a cast to `target`
    pub fn cast_to(self, target: Type) -> Self {
        let span = self.span;
        Self::new(
            ExpressionKind::Cast {
                value: Box::new(self),
            },
            target,
            span,
        )
    }

    /// Builds the error placeholder used for recovery after a diagnostic
    pub const fn error(span: SourceSpan) -> Self {
        Self::new(ExpressionKind::Error, Type::Void, span)
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.kind, ExpressionKind::Error)
    }
}

/// The different kinds of expressions
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Literal),
    /// Reference to a variable in the enclosing function's scope
    VarRef(VariableId),
    UnaryOp {
        op: UnaryOp,
        expr: Box<Expression>,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// Conversion of the inner value to this node's type
    Cast {
        value: Box<Expression>,
    },
    Call(FunctionCall),
    /// Placeholder produced after a reported error
    Error,
}

/// A resolved call, in expression or statement position
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: Callee,
    pub args: Vec<Expression>,
    /// The call's value type; void for commands and functions that return
    /// nothing (its value is ignored in statement position)
    pub return_type: Type,
}

/// What a call resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callee {
    /// A user function in the program's function table
    UserFunction(FunctionId),
    /// A command overload in the command index
    Command(CommandId),
}

impl PrettyPrint for Expression {
    fn pretty_print(&self, _indent: usize) -> String {
        match &self.kind {
            ExpressionKind::Literal(literal) => match literal {
                Literal::String(s) => format!("\"{s}\""),
                Literal::Boolean(b) => b.to_string(),
                Literal::Byte(v) => v.to_string(),
                Literal::Word(v) => v.to_string(),
                Literal::Dword(v) => v.to_string(),
                Literal::Integer(v) => v.to_string(),
                Literal::DoubleInteger(v) => v.to_string(),
                Literal::Float(v) => v.to_string(),
                Literal::DoubleFloat(v) => v.to_string(),
            },
            ExpressionKind::VarRef(id) => format!("%{}", id.index()),
            ExpressionKind::UnaryOp { op, expr } => {
                format!("{op:?}({})", expr.pretty_print(0))
            }
            ExpressionKind::BinaryOp { op, lhs, rhs } => {
                format!("{op:?}({}, {})", lhs.pretty_print(0), rhs.pretty_print(0))
            }
            ExpressionKind::Cast { value } => {
                format!("cast<{}>({})", self.ty, value.pretty_print(0))
            }
            ExpressionKind::Call(call) => call.pretty_print(0),
            ExpressionKind::Error => "<error>".to_string(),
        }
    }
}

impl PrettyPrint for FunctionCall {
    fn pretty_print(&self, _indent: usize) -> String {
        let callee = match self.callee {
            Callee::UserFunction(id) => format!("fn#{}", id.index()),
            Callee::Command(id) => format!("command#{}", id.index()),
        };
        let args: Vec<String> = self.args.iter().map(|a| a.pretty_print(0)).collect();
        format!("{callee}({})", args.join(", "))
    }
}
