//! Statement conversion: control flow, labels, increments

mod common;

use common::*;
use dbasic_compiler_ast::{
    BinaryOp, Expression as AstExpression, SourceSpan, Statement as AstStatement,
    StatementKind as AstStatementKind,
};
use dbasic_compiler_ir::{BuiltinType, ExpressionKind, StatementKind, Type};

fn ast_stmt(kind: AstStatementKind) -> AstStatement {
    AstStatement::new(kind, SourceSpan::synthetic())
}

#[test]
fn conditional_condition_is_cast_to_boolean() {
    let block = vec![
        assign("a", int(1)),
        ast_stmt(AstStatementKind::Conditional {
            condition: Box::new(binop(BinaryOp::Greater, var("a"), int(0))),
            then_branch: vec![assign("a", int(2))],
            else_branch: vec![],
        }),
    ];
    let program = convert_ok(&block, &empty_index());

    let StatementKind::Conditional {
        condition,
        then_branch,
        else_branch,
    } = &program.main.body[1].kind
    else {
        panic!("expected a conditional");
    };
    assert_eq!(condition.ty, Type::builtin(BuiltinType::Boolean));
    assert!(matches!(condition.kind, ExpressionKind::Cast { .. }));
    assert_eq!(then_branch.len(), 1);
    assert!(else_branch.is_empty());
}

#[test]
fn while_and_until_conditions_are_boolean() {
    let block = vec![
        assign("a", int(1)),
        ast_stmt(AstStatementKind::WhileLoop {
            condition: Box::new(var("a")),
            body: vec![],
        }),
        ast_stmt(AstStatementKind::UntilLoop {
            condition: Box::new(var("a")),
            body: vec![assign("a", int(0))],
        }),
    ];
    let program = convert_ok(&block, &empty_index());

    let StatementKind::While { condition, .. } = &program.main.body[1].kind else {
        panic!("expected a while loop");
    };
    assert_eq!(condition.ty, Type::builtin(BuiltinType::Boolean));

    let StatementKind::Until { condition, body } = &program.main.body[2].kind else {
        panic!("expected an until loop");
    };
    assert_eq!(condition.ty, Type::builtin(BuiltinType::Boolean));
    assert_eq!(body.len(), 1);
}

#[test]
fn infinite_loop_with_break() {
    let block = vec![ast_stmt(AstStatementKind::InfiniteLoop {
        body: vec![ast_stmt(AstStatementKind::Break)],
    })];
    let program = convert_ok(&block, &empty_index());

    let StatementKind::Loop { body } = &program.main.body[0].kind else {
        panic!("expected a loop");
    };
    assert!(matches!(body[0].kind, StatementKind::Break));
}

#[test]
fn labels_goto_and_gosub_keep_their_names() {
    let block = vec![
        ast_stmt(AstStatementKind::Label {
            name: "start".to_string(),
        }),
        ast_stmt(AstStatementKind::Gosub {
            label: "start".to_string(),
        }),
        ast_stmt(AstStatementKind::Goto {
            label: "start".to_string(),
        }),
        ast_stmt(AstStatementKind::SubReturn),
    ];
    let program = convert_ok(&block, &empty_index());

    assert!(
        matches!(&program.main.body[0].kind, StatementKind::Label { name } if name == "start")
    );
    assert!(
        matches!(&program.main.body[1].kind, StatementKind::Gosub { label } if label == "start")
    );
    assert!(
        matches!(&program.main.body[2].kind, StatementKind::Goto { label } if label == "start")
    );
    assert!(matches!(&program.main.body[3].kind, StatementKind::SubReturn));
}

#[test]
fn increment_keeps_step_type_and_resolves_target() {
    let block = vec![
        assign_sigil("x", dbasic_compiler_ast::Sigil::Float, float(0.0)),
        ast_stmt(AstStatementKind::Increment {
            target: ident_sigil("x", dbasic_compiler_ast::Sigil::Float),
            step: Box::new(int(1)),
        }),
        ast_stmt(AstStatementKind::Decrement {
            target: ident_sigil("x", dbasic_compiler_ast::Sigil::Float),
            step: Box::new(int(2)),
        }),
    ];
    let program = convert_ok(&block, &empty_index());
    assert_eq!(program.main.scope.len(), 1);

    let StatementKind::Increment { target, step } = &program.main.body[1].kind else {
        panic!("expected an increment");
    };
    // The step expression is kept as-is, no cast to the target's type.
    assert_eq!(step.ty, Type::builtin(BuiltinType::Integer));
    assert_eq!(
        program.main.scope.get(*target).ty,
        Type::builtin(BuiltinType::Float)
    );
    assert!(matches!(
        &program.main.body[2].kind,
        StatementKind::Decrement { .. }
    ));
}

#[test]
fn binary_operands_convert_to_the_left_hand_type() {
    let block = vec![assign_sigil(
        "x",
        dbasic_compiler_ast::Sigil::Float,
        binop(BinaryOp::Add, float(1.0), int(2)),
    )];
    let program = convert_ok(&block, &empty_index());

    let StatementKind::Assign { value, .. } = &program.main.body[0].kind else {
        panic!("expected an assignment");
    };
    let ExpressionKind::BinaryOp { lhs, rhs, .. } = &value.kind else {
        panic!("expected a binary operation");
    };
    assert_eq!(value.ty, Type::builtin(BuiltinType::Float));
    assert!(matches!(lhs.kind, ExpressionKind::Literal(_)));
    // The integer right-hand side is cast to the left-hand side's type.
    assert!(matches!(rhs.kind, ExpressionKind::Cast { .. }));
    assert_eq!(rhs.ty, Type::builtin(BuiltinType::Float));
}

#[test]
fn nested_expression_inside_command_argument(){
    let mut index = empty_index();
    add_overload(
        &mut index,
        "print",
        &[dbasic_commands::CommandType::String],
        dbasic_commands::CommandType::Void,
    );

    let block = vec![
        assign_sigil("msg", dbasic_compiler_ast::Sigil::String, string("hi")),
        command_stmt(
            "print",
            vec![AstExpression::new(
                dbasic_compiler_ast::ExpressionKind::VarRef(ident_sigil(
                    "msg",
                    dbasic_compiler_ast::Sigil::String,
                )),
                SourceSpan::synthetic(),
            )],
        ),
    ];
    let program = convert_ok(&block, &index);
    assert_call_signatures(&program, &index);
    assert_scope_membership(&program);
}
