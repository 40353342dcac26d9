//! Implicit declaration, sigil typing and re-declaration checks

mod common;

use common::*;
use dbasic_compiler_ast::{Sigil, TypeAnnotation};
use dbasic_compiler_diagnostics::DiagnosticCode;
use dbasic_compiler_ir::{BuiltinType, ExpressionKind, StatementKind, Type};
use dbasic_compiler_semantic::SemanticError;

#[test]
fn implicit_string_variable_by_sigil() {
    // a$ = "hi" with an empty command index
    let block = vec![assign_sigil("a", Sigil::String, string("hi"))];
    let program = convert_ok(&block, &empty_index());

    assert_eq!(program.main.body.len(), 1);
    let StatementKind::Assign { target, value } = &program.main.body[0].kind else {
        panic!("expected an assignment");
    };

    let variable = program.main.scope.get(*target);
    assert_eq!(variable.sigil, Sigil::String);
    assert_eq!(variable.ty, Type::builtin(BuiltinType::String));
    // The value already has the variable's type, so no cast is inserted.
    assert!(matches!(value.kind, ExpressionKind::Literal(_)));
    assert_eq!(value.ty, Type::builtin(BuiltinType::String));
}

#[test]
fn bare_name_implies_integer() {
    let block = vec![assign("n", int(3))];
    let program = convert_ok(&block, &empty_index());

    let StatementKind::Assign { target, .. } = &program.main.body[0].kind else {
        panic!("expected an assignment");
    };
    assert_eq!(
        program.main.scope.get(*target).ty,
        Type::builtin(BuiltinType::Integer)
    );
}

#[test]
fn float_sigil_implies_float_and_casts_integer_value() {
    let block = vec![assign_sigil("x", Sigil::Float, int(1))];
    let program = convert_ok(&block, &empty_index());

    let StatementKind::Assign { target, value } = &program.main.body[0].kind else {
        panic!("expected an assignment");
    };
    assert_eq!(
        program.main.scope.get(*target).ty,
        Type::builtin(BuiltinType::Float)
    );
    // Integer -> float goes through an explicit cast node.
    assert!(matches!(value.kind, ExpressionKind::Cast { .. }));
    assert_eq!(value.ty, Type::builtin(BuiltinType::Float));
}

#[test]
fn same_name_different_sigils_are_distinct() {
    let block = vec![
        assign("a", int(1)),
        assign_sigil("a", Sigil::String, string("s")),
        assign_sigil("a", Sigil::Float, float(2.0)),
    ];
    let program = convert_ok(&block, &empty_index());
    assert_eq!(program.main.scope.len(), 3);
}

#[test]
fn assignment_reuses_existing_variable() {
    let block = vec![assign("a", int(1)), assign("a", int(2))];
    let program = convert_ok(&block, &empty_index());
    assert_eq!(program.main.scope.len(), 1);
}

#[test]
fn explicit_declaration_sets_declared_type() {
    let block = vec![var_decl("x", TypeAnnotation::DoubleFloat, int(0))];
    let program = convert_ok(&block, &empty_index());

    let StatementKind::Assign { target, value } = &program.main.body[0].kind else {
        panic!("expected an assignment");
    };
    assert_eq!(
        program.main.scope.get(*target).ty,
        Type::builtin(BuiltinType::DoubleFloat)
    );
    assert_eq!(value.ty, Type::builtin(BuiltinType::DoubleFloat));
}

#[test]
fn redeclaration_is_reported_with_previous_location() {
    // x as integer \n x as integer
    let block = vec![
        var_decl_at("x", TypeAnnotation::Integer, int(0), span(0, 1)),
        var_decl_at("x", TypeAnnotation::Integer, int(0), span(13, 14)),
    ];
    let err = convert(&block, &empty_index()).unwrap_err();

    let SemanticError::Failed(diagnostics) = err else {
        panic!("expected a failed conversion");
    };
    let errors = diagnostics.errors();
    assert_eq!(errors.len(), 1);
    let diagnostic = errors[0];
    assert_eq!(diagnostic.code, DiagnosticCode::RedeclaredVariable);
    assert!(diagnostic.message.contains("already been declared as type integer"));
    // The secondary note cites the first declaration.
    assert_eq!(diagnostic.related_spans.len(), 1);
    assert_eq!(diagnostic.related_spans[0].0.start, 0);
    assert!(diagnostic.related_spans[0].1.contains("see last declaration"));
}

#[test]
fn string_to_integer_assignment_is_a_type_error() {
    let block = vec![assign("n", string("oops"))];
    let err = convert(&block, &empty_index()).unwrap_err();

    let SemanticError::Failed(diagnostics) = err else {
        panic!("expected a failed conversion");
    };
    assert_eq!(
        diagnostics.errors()[0].code,
        DiagnosticCode::TypeConversion
    );
}

#[test]
fn conversion_continues_after_type_error() {
    // The statement after the failing one is still checked and its
    // diagnostics surface in the same run.
    let block = vec![assign("n", string("oops")), assign("m", string("again"))];
    let err = convert(&block, &empty_index()).unwrap_err();

    let SemanticError::Failed(diagnostics) = err else {
        panic!("expected a failed conversion");
    };
    assert_eq!(diagnostics.errors().len(), 2);
}
