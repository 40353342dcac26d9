//! Top-level block structure and invariant checks

mod common;

use common::*;
use dbasic_commands::CommandType;
use dbasic_compiler_ast::Sigil;
use dbasic_compiler_diagnostics::DiagnosticCode;
use dbasic_compiler_ir::{MAIN_FUNCTION_NAME, PrettyPrint};
use dbasic_compiler_semantic::SemanticError;

#[test]
fn main_is_the_synthetic_function() {
    let block = vec![assign("a", int(1))];
    let program = convert_ok(&block, &empty_index());
    assert_eq!(program.main.name, MAIN_FUNCTION_NAME);
    assert!(program.main.arguments.is_empty());
}

#[test]
fn statement_after_function_declaration_is_fatal() {
    // a=1 / function f() / endfunction / b=2
    let block = vec![
        assign("a", int(1)),
        function_decl("f", vec![], vec![], None),
        assign("b", int(2)),
    ];
    let err = convert(&block, &empty_index()).unwrap_err();

    let SemanticError::Failed(diagnostics) = err else {
        panic!("expected a failed conversion");
    };
    let diagnostic = diagnostics.errors()[0];
    assert_eq!(diagnostic.code, DiagnosticCode::MisplacedStatement);
    assert!(
        diagnostic
            .message
            .contains("reached the end of main but encountered a non-function node")
    );
}

#[test]
fn statements_between_functions_are_also_fatal() {
    let block = vec![
        function_decl("f", vec![], vec![], None),
        assign("a", int(1)),
        function_decl("g", vec![], vec![], None),
    ];
    assert!(matches!(
        convert(&block, &empty_index()),
        Err(SemanticError::Failed(_))
    ));
}

#[test]
fn conversion_is_idempotent() {
    let mut index = empty_index();
    add_overload(&mut index, "print", &[CommandType::String], CommandType::Void);
    add_overload(&mut index, "print", &[CommandType::Integer], CommandType::Void);

    let block = vec![
        assign_sigil("greeting", Sigil::String, string("hello")),
        command_stmt("print", vec![var_sigil("greeting", Sigil::String)]),
        function_call_stmt("shout", vec![int(3)]),
        function_decl(
            "shout",
            vec![ident("times")],
            vec![command_stmt("print", vec![var("times")])],
            Some(var("times")),
        ),
    ];

    let first = convert_ok(&block, &index);
    let second = convert_ok(&block, &index);
    // Structural equality; ids are assigned deterministically.
    assert_eq!(first, second);
}

#[test]
fn invariants_hold_for_a_composite_program() {
    let mut index = empty_index();
    add_overload(&mut index, "print", &[CommandType::String], CommandType::Void);
    add_overload(&mut index, "rgb", &[CommandType::Integer, CommandType::Integer, CommandType::Integer], CommandType::Dword);

    let block = vec![
        assign_sigil("msg", Sigil::String, string("go")),
        assign("c", command_expr("rgb", vec![int(1), int(2), int(3)])),
        dbasic_compiler_ast::Statement::new(
            dbasic_compiler_ast::StatementKind::WhileLoop {
                condition: Box::new(var("c")),
                body: vec![command_stmt("print", vec![var_sigil("msg", Sigil::String)])],
            },
            dbasic_compiler_ast::SourceSpan::synthetic(),
        ),
        function_decl(
            "helper",
            vec![ident_sigil("s", Sigil::String)],
            vec![command_stmt("print", vec![var_sigil("s", Sigil::String)])],
            None,
        ),
    ];
    let program = convert_ok(&block, &index);

    assert_scope_membership(&program);
    assert_call_signatures(&program, &index);
    // The dword result of rgb is cast to the integer variable's type.
    insta::assert_snapshot!(program.pretty_print(0));
}
