//! # IR statements
//!
//! The statement forms of the flattened program. Control flow keeps its
//! structured shape (the backend lowers it to basic blocks); `goto`/`gosub`
//! targets stay symbolic label names resolved during lowering.

use dbasic_compiler_ast::SourceSpan;

use crate::{Expression, FunctionCall, PrettyPrint, VariableId, indent_str};

/// A statement with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: SourceSpan,
}

impl Statement {
    pub const fn new(kind: StatementKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }
}

/// The different kinds of statements
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// Store a value in a variable. Also produced for explicit declarations
    /// with an initial value.
    Assign {
        target: VariableId,
        value: Expression,
    },
    /// Two-armed conditional; the condition is Boolean-typed
    Conditional {
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Vec<Statement>,
    },
    /// Loop that continues while the Boolean condition holds
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    /// Loop that exits once the Boolean condition holds
    Until {
        condition: Expression,
        body: Vec<Statement>,
    },
    /// Loop with no exit condition
    Loop { body: Vec<Statement> },
    Break,
    Label { name: String },
    Goto { label: String },
    Gosub { label: String },
    SubReturn,
    /// Add the step to the target variable
    Increment {
        target: VariableId,
        step: Expression,
    },
    /// Subtract the step from the target variable
    Decrement {
        target: VariableId,
        step: Expression,
    },
    /// A call in statement position; any return value is discarded
    Call(FunctionCall),
    /// Leave the enclosing function, optionally with a value
    ExitFunction { value: Option<Expression> },
}

impl PrettyPrint for Statement {
    fn pretty_print(&self, indent: usize) -> String {
        let pad = indent_str(indent);
        match &self.kind {
            StatementKind::Assign { target, value } => {
                format!("{pad}%{} = {}\n", target.index(), value.pretty_print(0))
            }
            StatementKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut out = format!("{pad}if {} {{\n", condition.pretty_print(0));
                for statement in then_branch {
                    out.push_str(&statement.pretty_print(indent + 1));
                }
                if !else_branch.is_empty() {
                    out.push_str(&format!("{pad}}} else {{\n"));
                    for statement in else_branch {
                        out.push_str(&statement.pretty_print(indent + 1));
                    }
                }
                out.push_str(&format!("{pad}}}\n"));
                out
            }
            StatementKind::While { condition, body } => {
                pretty_loop(indent, &format!("while {}", condition.pretty_print(0)), body)
            }
            StatementKind::Until { condition, body } => {
                pretty_loop(indent, &format!("until {}", condition.pretty_print(0)), body)
            }
            StatementKind::Loop { body } => pretty_loop(indent, "loop", body),
            StatementKind::Break => format!("{pad}break\n"),
            StatementKind::Label { name } => format!("{pad}{name}:\n"),
            StatementKind::Goto { label } => format!("{pad}goto {label}\n"),
            StatementKind::Gosub { label } => format!("{pad}gosub {label}\n"),
            StatementKind::SubReturn => format!("{pad}subreturn\n"),
            StatementKind::Increment { target, step } => {
                format!("{pad}inc %{}, {}\n", target.index(), step.pretty_print(0))
            }
            StatementKind::Decrement { target, step } => {
                format!("{pad}dec %{}, {}\n", target.index(), step.pretty_print(0))
            }
            StatementKind::Call(call) => format!("{pad}{}\n", call.pretty_print(0)),
            StatementKind::ExitFunction { value } => match value {
                Some(value) => format!("{pad}exitfunction {}\n", value.pretty_print(0)),
                None => format!("{pad}exitfunction\n"),
            },
        }
    }
}

fn pretty_loop(indent: usize, header: &str, body: &[Statement]) -> String {
    let pad = indent_str(indent);
    let mut out = format!("{pad}{header} {{\n");
    for statement in body {
        out.push_str(&statement.pretty_print(indent + 1));
    }
    out.push_str(&format!("{pad}}}\n"));
    out
}
