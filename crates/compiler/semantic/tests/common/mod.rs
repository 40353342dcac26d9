#![allow(dead_code)]
//! Common test utilities for semantic conversion tests
//!
//! The parser is a separate component, so tests build the post-processed
//! syntax tree directly with the helpers below and feed it to the
//! converter together with a hand-assembled command index.

use dbasic_commands::{Command, CommandArg, CommandIndex, CommandType, Plugin, PluginId};
use dbasic_compiler_ast::{
    BinaryOp, Block, Expression, ExpressionKind, FunctionDecl, Ident, Literal, Sigil, SourceSpan,
    Statement, StatementKind, TypeAnnotation,
};
use dbasic_compiler_ir::{
    Callee, Program, Scope, StatementKind as IrStatementKind, Type, VariableId,
};
use dbasic_compiler_semantic::{SemanticResult, convert_block};

// ===== Command index construction =====

pub fn empty_index() -> CommandIndex {
    let mut index = CommandIndex::new();
    index.add_plugin(Plugin::new("DBProCore", "DBProCore.dll"));
    index
}

pub fn core_plugin(index: &CommandIndex) -> PluginId {
    index.plugins().next().expect("core plugin registered").0
}

/// Adds an overload of `name` to the index with the given argument types
pub fn add_overload(index: &mut CommandIndex, name: &str, args: &[CommandType], ret: CommandType) {
    let plugin = core_plugin(index);
    index.add(Command::new(
        name,
        args.iter().copied().map(CommandArg::new).collect(),
        ret,
        plugin,
        format!("Sym_{}", name.replace(' ', "_")),
    ));
}

// ===== AST construction =====

pub fn span(start: usize, end: usize) -> SourceSpan {
    SourceSpan::new(start, end)
}

pub fn ident(name: &str) -> Ident {
    Ident::new(name, Sigil::None, SourceSpan::synthetic())
}

pub fn ident_sigil(name: &str, sigil: Sigil) -> Ident {
    Ident::new(name, sigil, SourceSpan::synthetic())
}

pub fn ident_at(name: &str, sigil: Sigil, at: SourceSpan) -> Ident {
    Ident::new(name, sigil, at)
}

fn expr(kind: ExpressionKind) -> Expression {
    Expression::new(kind, SourceSpan::synthetic())
}

pub fn int(value: i32) -> Expression {
    expr(ExpressionKind::Literal(Literal::Integer(value)))
}

pub fn double_int(value: i64) -> Expression {
    expr(ExpressionKind::Literal(Literal::DoubleInteger(value)))
}

pub fn float(value: f32) -> Expression {
    expr(ExpressionKind::Literal(Literal::Float(value)))
}

pub fn double_float(value: f64) -> Expression {
    expr(ExpressionKind::Literal(Literal::DoubleFloat(value)))
}

pub fn string(value: &str) -> Expression {
    expr(ExpressionKind::Literal(Literal::String(value.to_string())))
}

pub fn var(name: &str) -> Expression {
    expr(ExpressionKind::VarRef(ident(name)))
}

pub fn var_sigil(name: &str, sigil: Sigil) -> Expression {
    expr(ExpressionKind::VarRef(ident_sigil(name, sigil)))
}

pub fn binop(op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
    expr(ExpressionKind::BinaryOp {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn command_expr(name: &str, args: Vec<Expression>) -> Expression {
    expr(ExpressionKind::Command {
        name: name.to_string(),
        args,
    })
}

pub fn function_call_expr(name: &str, args: Vec<Expression>) -> Expression {
    expr(ExpressionKind::FunctionCall {
        name: ident(name),
        args,
    })
}

fn stmt(kind: StatementKind) -> Statement {
    Statement::new(kind, SourceSpan::synthetic())
}

pub fn assign(name: &str, value: Expression) -> Statement {
    assign_sigil(name, Sigil::None, value)
}

pub fn assign_sigil(name: &str, sigil: Sigil, value: Expression) -> Statement {
    stmt(StatementKind::Assignment {
        target: ident_sigil(name, sigil),
        value: Box::new(value),
    })
}

pub fn var_decl(name: &str, ty: TypeAnnotation, initial: Expression) -> Statement {
    var_decl_at(name, ty, initial, SourceSpan::synthetic())
}

pub fn var_decl_at(
    name: &str,
    ty: TypeAnnotation,
    initial: Expression,
    at: SourceSpan,
) -> Statement {
    Statement::new(
        StatementKind::VarDecl {
            ident: ident_at(name, Sigil::None, at),
            ty,
            initial_value: Box::new(initial),
        },
        at,
    )
}

pub fn command_stmt(name: &str, args: Vec<Expression>) -> Statement {
    stmt(StatementKind::Command {
        name: name.to_string(),
        args,
    })
}

pub fn function_call_stmt(name: &str, args: Vec<Expression>) -> Statement {
    stmt(StatementKind::FunctionCall {
        name: ident(name),
        args,
    })
}

pub fn function_decl(
    name: &str,
    args: Vec<Ident>,
    body: Block,
    return_value: Option<Expression>,
) -> Statement {
    stmt(StatementKind::Function(FunctionDecl {
        name: ident(name),
        args,
        body,
        return_value: return_value.map(Box::new),
        span: SourceSpan::synthetic(),
    }))
}

// ===== Conversion helpers =====

pub fn convert(block: &Block, index: &CommandIndex) -> SemanticResult<Program> {
    convert_block(block, index, "test.dba")
}

pub fn convert_ok(block: &Block, index: &CommandIndex) -> Program {
    convert(block, index).expect("conversion should succeed")
}

// ===== IR walkers for invariant checks =====

/// Collects every variable referenced by expressions in a function
pub fn collect_var_refs(
    body: &[dbasic_compiler_ir::Statement],
    return_expression: Option<&dbasic_compiler_ir::Expression>,
) -> Vec<VariableId> {
    let mut refs = Vec::new();
    for statement in body {
        walk_statement(statement, &mut |e| {
            if let dbasic_compiler_ir::ExpressionKind::VarRef(id) = e.kind {
                refs.push(id);
            }
        });
    }
    if let Some(expression) = return_expression {
        walk_expression(expression, &mut |e| {
            if let dbasic_compiler_ir::ExpressionKind::VarRef(id) = e.kind {
                refs.push(id);
            }
        });
    }
    refs
}

/// Applies `visit` to every call node in a function body
pub fn collect_calls(
    body: &[dbasic_compiler_ir::Statement],
) -> Vec<dbasic_compiler_ir::FunctionCall> {
    let mut calls = Vec::new();
    for statement in body {
        walk_statement(statement, &mut |e| {
            if let dbasic_compiler_ir::ExpressionKind::Call(call) = &e.kind {
                calls.push(call.clone());
            }
        });
        if let IrStatementKind::Call(call) = &statement.kind {
            calls.push(call.clone());
        }
    }
    calls
}

/// Checks that every call site's argument count and types match the
/// callee's declared signature exactly.
pub fn assert_call_signatures(program: &Program, index: &CommandIndex) {
    use dbasic_compiler_semantic::type_resolution::type_from_command_type;

    let mut check = |call: &dbasic_compiler_ir::FunctionCall| {
        let parameter_types: Vec<Type> = match call.callee {
            Callee::Command(id) => index
                .command(id)
                .args
                .iter()
                .map(|a| type_from_command_type(a.ty).expect("resolved overloads have no markers"))
                .collect(),
            Callee::UserFunction(id) => program.function(id).argument_types(),
        };
        assert_eq!(call.args.len(), parameter_types.len());
        for (arg, expected) in call.args.iter().zip(&parameter_types) {
            assert_eq!(&arg.ty, expected);
        }
    };

    for function in std::iter::once(&program.main).chain(program.functions.iter()) {
        for call in collect_calls(&function.body) {
            check(&call);
        }
    }
}

/// Checks that every referenced variable is present in
/// the enclosing function's scope.
pub fn assert_scope_membership(program: &Program) {
    let check = |scope: &Scope, body, ret| {
        for id in collect_var_refs(body, ret) {
            assert!(scope.contains(id), "variable {id:?} missing from scope");
        }
    };
    check(
        &program.main.scope,
        &program.main.body,
        program.main.return_expression.as_ref(),
    );
    for (_, function) in program.functions() {
        check(&function.scope, &function.body, function.return_expression.as_ref());
    }
}

fn walk_statement(
    statement: &dbasic_compiler_ir::Statement,
    visit: &mut impl FnMut(&dbasic_compiler_ir::Expression),
) {
    match &statement.kind {
        IrStatementKind::Assign { value, .. } => walk_expression(value, visit),
        IrStatementKind::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            walk_expression(condition, visit);
            for s in then_branch.iter().chain(else_branch) {
                walk_statement(s, visit);
            }
        }
        IrStatementKind::While { condition, body } | IrStatementKind::Until { condition, body } => {
            walk_expression(condition, visit);
            for s in body {
                walk_statement(s, visit);
            }
        }
        IrStatementKind::Loop { body } => {
            for s in body {
                walk_statement(s, visit);
            }
        }
        IrStatementKind::Increment { step, .. } | IrStatementKind::Decrement { step, .. } => {
            walk_expression(step, visit);
        }
        IrStatementKind::Call(call) => {
            for arg in &call.args {
                walk_expression(arg, visit);
            }
        }
        IrStatementKind::ExitFunction { value: Some(value) } => walk_expression(value, visit),
        IrStatementKind::Break
        | IrStatementKind::Label { .. }
        | IrStatementKind::Goto { .. }
        | IrStatementKind::Gosub { .. }
        | IrStatementKind::SubReturn
        | IrStatementKind::ExitFunction { value: None } => {}
    }
}

fn walk_expression(
    expression: &dbasic_compiler_ir::Expression,
    visit: &mut impl FnMut(&dbasic_compiler_ir::Expression),
) {
    visit(expression);
    match &expression.kind {
        dbasic_compiler_ir::ExpressionKind::UnaryOp { expr, .. } => walk_expression(expr, visit),
        dbasic_compiler_ir::ExpressionKind::BinaryOp { lhs, rhs, .. } => {
            walk_expression(lhs, visit);
            walk_expression(rhs, visit);
        }
        dbasic_compiler_ir::ExpressionKind::Cast { value } => walk_expression(value, visit),
        dbasic_compiler_ir::ExpressionKind::Call(call) => {
            for arg in &call.args {
                walk_expression(arg, visit);
            }
        }
        dbasic_compiler_ir::ExpressionKind::Literal(_)
        | dbasic_compiler_ir::ExpressionKind::VarRef(_)
        | dbasic_compiler_ir::ExpressionKind::Error => {}
    }
}
