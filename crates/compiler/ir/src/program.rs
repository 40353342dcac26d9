//! # Program
//!
//! The converter's final output: the synthetic main function plus the user
//! function table.

use index_vec::IndexVec;
use rustc_hash::FxHashMap;

use crate::{Callee, FunctionCall, FunctionDefinition, FunctionId, PrettyPrint, indent_str};
use dbasic_commands::CommandId;

/// The name of the synthetic main function
pub const MAIN_FUNCTION_NAME: &str = "__DBMain";

/// A fully converted program
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The synthetic `__DBMain` function holding the top-level statements
    pub main: FunctionDefinition,
    /// User functions, in declaration order
    pub functions: IndexVec<FunctionId, FunctionDefinition>,
    function_names: FxHashMap<String, FunctionId>,
}

impl Program {
    pub fn new(main: FunctionDefinition, functions: IndexVec<FunctionId, FunctionDefinition>) -> Self {
        let function_names = functions
            .iter_enumerated()
            .map(|(id, function)| (function.name.clone(), id))
            .collect();
        Self {
            main,
            functions,
            function_names,
        }
    }

    /// Gets a user function by id
    pub fn function(&self, id: FunctionId) -> &FunctionDefinition {
        &self.functions[id]
    }

    /// Looks up a user function by name
    pub fn lookup_function(&self, name: &str) -> Option<FunctionId> {
        self.function_names.get(name).copied()
    }

    /// All user functions in declaration order
    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &FunctionDefinition)> {
        self.functions.iter_enumerated()
    }

    /// Every command overload referenced anywhere in the program, deduplicated,
    /// in first-reference order. This is the set the backend asks the engine
    /// interface to generate thunks for.
    pub fn referenced_commands(&self) -> Vec<CommandId> {
        let mut seen = Vec::new();
        let mut visit_call = |call: &FunctionCall| {
            if let Callee::Command(id) = call.callee
                && !seen.contains(&id)
            {
                seen.push(id);
            }
        };

        for function in std::iter::once(&self.main).chain(self.functions.iter()) {
            for statement in &function.body {
                visit_statement_calls(statement, &mut visit_call);
            }
            if let Some(expression) = &function.return_expression {
                visit_expression_calls(expression, &mut visit_call);
            }
        }
        seen
    }
}

fn visit_statement_calls(
    statement: &crate::Statement,
    visit: &mut impl FnMut(&FunctionCall),
) {
    use crate::StatementKind::*;
    match &statement.kind {
        Assign { value, .. } => visit_expression_calls(value, visit),
        Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            visit_expression_calls(condition, visit);
            for s in then_branch.iter().chain(else_branch) {
                visit_statement_calls(s, visit);
            }
        }
        While { condition, body } | Until { condition, body } => {
            visit_expression_calls(condition, visit);
            for s in body {
                visit_statement_calls(s, visit);
            }
        }
        Loop { body } => {
            for s in body {
                visit_statement_calls(s, visit);
            }
        }
        Increment { step, .. } | Decrement { step, .. } => visit_expression_calls(step, visit),
        Call(call) => {
            visit(call);
            for arg in &call.args {
                visit_expression_calls(arg, visit);
            }
        }
        ExitFunction { value: Some(value) } => visit_expression_calls(value, visit),
        Break | Label { .. } | Goto { .. } | Gosub { .. } | SubReturn
        | ExitFunction { value: None } => {}
    }
}

fn visit_expression_calls(
    expression: &crate::Expression,
    visit: &mut impl FnMut(&FunctionCall),
) {
    use crate::ExpressionKind::*;
    match &expression.kind {
        Literal(_) | VarRef(_) | Error => {}
        UnaryOp { expr, .. } => visit_expression_calls(expr, visit),
        BinaryOp { lhs, rhs, .. } => {
            visit_expression_calls(lhs, visit);
            visit_expression_calls(rhs, visit);
        }
        Cast { value } => visit_expression_calls(value, visit),
        Call(call) => {
            visit(call);
            for arg in &call.args {
                visit_expression_calls(arg, visit);
            }
        }
    }
}

impl PrettyPrint for Program {
    fn pretty_print(&self, indent: usize) -> String {
        let pad = indent_str(indent);
        let mut out = format!("{pad}program {{\n");
        out.push_str(&self.main.pretty_print(indent + 1));
        for (id, function) in self.functions() {
            out.push_str(&format!("{pad}  // fn#{}\n", id.index()));
            out.push_str(&function.pretty_print(indent + 1));
        }
        out.push_str(&format!("{pad}}}\n"));
        out
    }
}
