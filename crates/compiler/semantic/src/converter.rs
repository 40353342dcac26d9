//! # AST to IR conversion
//!
//! The central traversal. See the crate docs for the two-phase structure
//! and the error-handling policy.

use dbasic_commands::CommandIndex;
use dbasic_compiler_ast as ast;
use dbasic_compiler_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection};
use dbasic_compiler_ir::{
    BuiltinType, Callee, Expression, ExpressionKind, FunctionCall, FunctionDefinition, FunctionId,
    MAIN_FUNCTION_NAME, Program, Scope, SourceSpan, Statement, StatementKind, Type, Variable,
    VariableId,
};
use index_vec::IndexVec;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::overloads::{OverloadResolution, resolve_overload};
use crate::type_resolution::{
    binary_common_type, is_type_convertible, type_from_command_type, type_from_sigil,
};
use crate::{SemanticError, SemanticResult};

/// Converts a post-processed top-level block into a typed program.
///
/// `file_path` is attached to every diagnostic. The command index must
/// already have passed its conflict scan and stays immutable for the whole
/// run.
pub fn convert_block(
    block: &ast::Block,
    index: &CommandIndex,
    file_path: &str,
) -> SemanticResult<Program> {
    Converter::new(index, file_path).run(block)
}

/// Call-resolution view of a function, kept separate from the definition so
/// bodies can be converted while other functions' signatures stay readable.
struct Signature {
    param_types: Vec<Type>,
    /// Void until the function's body has been converted; call sites
    /// converted before that observe void, matching the declaration-order
    /// conversion contract.
    return_type: Type,
}

struct Converter<'a> {
    index: &'a CommandIndex,
    file_path: &'a str,
    diagnostics: DiagnosticCollection,
    functions: IndexVec<FunctionId, FunctionDefinition>,
    signatures: IndexVec<FunctionId, Signature>,
    function_names: FxHashMap<String, FunctionId>,
}

impl<'a> Converter<'a> {
    fn new(index: &'a CommandIndex, file_path: &'a str) -> Self {
        Self {
            index,
            file_path,
            diagnostics: DiagnosticCollection::new(),
            functions: IndexVec::new(),
            signatures: IndexVec::new(),
            function_names: FxHashMap::default(),
        }
    }

    fn run(mut self, block: &ast::Block) -> SemanticResult<Program> {
        // Phase A: split the leading main statements from the function
        // declarations and install every function skeleton so forward
        // references resolve during body conversion.
        let mut main_statements: Vec<&ast::Statement> = Vec::new();
        let mut declarations: Vec<(FunctionId, &ast::FunctionDecl)> = Vec::new();
        let mut reached_end_of_main = false;

        for statement in block {
            if let ast::StatementKind::Function(decl) = &statement.kind {
                reached_end_of_main = true;
                if let Some(id) = self.install_skeleton(decl) {
                    declarations.push((id, decl));
                }
            } else if reached_end_of_main {
                self.report(Diagnostic::misplaced_statement(statement.span.into()));
            } else {
                main_statements.push(statement);
            }
        }
        tracing::debug!(
            functions = self.functions.len(),
            "installed function skeletons"
        );

        // Phase B: main body first, then every function body in declaration
        // order.
        let mut main = FunctionDefinition::new(MAIN_FUNCTION_NAME, SourceSpan::synthetic());
        let mut main_scope = Scope::new();
        let mut main_body = Vec::with_capacity(main_statements.len());
        for statement in main_statements {
            if let Some(converted) = self.convert_statement(statement, &mut main_scope)? {
                main_body.push(converted);
            }
        }
        main.scope = main_scope;
        main.body = main_body;

        for (id, decl) in declarations {
            self.convert_function_body(id, decl)?;
        }

        if self.diagnostics.has_errors() {
            return Err(SemanticError::Failed(self.diagnostics));
        }
        Ok(Program::new(main, self.functions))
    }

    /// Installs a function's scope, parameters and signature without
    /// converting its body. Parameters take their types from their sigils
    /// and live in the function's scope, so body references resolve to the
    /// parameter variable itself. A duplicate declaration keeps the first
    /// definition.
    fn install_skeleton(&mut self, decl: &ast::FunctionDecl) -> Option<FunctionId> {
        if self.function_names.contains_key(&decl.name.name) {
            return None;
        }

        let mut function = FunctionDefinition::new(decl.name.name.clone(), decl.span);
        let mut param_types = Vec::with_capacity(decl.args.len());
        for arg in &decl.args {
            let ty = type_from_sigil(arg.sigil);
            param_types.push(ty.clone());
            let id = function
                .scope
                .declare(Variable::new(arg.name.clone(), arg.sigil, ty, arg.span));
            function.arguments.push(id);
        }

        let id = self.functions.push(function);
        self.signatures.push(Signature {
            param_types,
            return_type: Type::Void,
        });
        self.function_names.insert(decl.name.name.clone(), id);
        Some(id)
    }

    fn convert_function_body(
        &mut self,
        id: FunctionId,
        decl: &ast::FunctionDecl,
    ) -> SemanticResult<()> {
        let mut scope = std::mem::take(&mut self.functions[id].scope);

        let mut body = Vec::with_capacity(decl.body.len());
        for statement in &decl.body {
            if let Some(converted) = self.convert_statement(statement, &mut scope)? {
                body.push(converted);
            }
        }
        let return_expression = match &decl.return_value {
            Some(value) => Some(self.convert_expression(value, &mut scope)?),
            None => None,
        };

        let function = &mut self.functions[id];
        function.scope = scope;
        function.body = body;
        function.return_expression = return_expression;
        let return_type = self.functions[id].return_type();
        self.signatures[id].return_type = return_type;
        Ok(())
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.add(diagnostic.in_file(self.file_path));
    }

    /// Resolves a variable reference, implicitly declaring it with its
    /// sigil's type when absent.
    fn resolve_variable(&mut self, ident: &ast::Ident, scope: &mut Scope) -> VariableId {
        if let Some(id) = scope.lookup(&ident.name, ident.sigil) {
            return id;
        }
        scope.declare(Variable::new(
            ident.name.clone(),
            ident.sigil,
            type_from_sigil(ident.sigil),
            ident.span,
        ))
    }

    /// Returns `expression` converted to `target`, wrapping it in a cast
    /// node when the types differ. A failed conversion is reported and the
    /// expression is returned unchanged so conversion can continue.
    fn ensure_type(&mut self, expression: Expression, target: &Type) -> Expression {
        if expression.ty == *target || expression.is_error() {
            return expression;
        }
        if is_type_convertible(&expression.ty, target) {
            return expression.cast_to(target.clone());
        }

        let span = expression.span.into();
        let diagnostic = if matches!(expression.ty, Type::Array(_) | Type::Udt(_))
            || matches!(target, Type::Array(_) | Type::Udt(_))
        {
            Diagnostic::error(
                DiagnosticCode::TypeConversion,
                format!(
                    "conversion from {} to {} is not yet supported",
                    expression.ty, target
                ),
            )
            .with_location(span)
        } else {
            Diagnostic::type_conversion(&expression.ty.to_string(), &target.to_string(), span)
        };
        self.report(diagnostic);
        expression
    }

    /// Resolves a command call (expression or statement position) to an
    /// overload, inserting argument casts. Returns `None` after reporting
    /// when no overload matches.
    fn convert_command_call(
        &mut self,
        name: &str,
        ast_args: &[ast::Expression],
        span: SourceSpan,
        scope: &mut Scope,
    ) -> SemanticResult<Option<FunctionCall>> {
        let mut args = Vec::with_capacity(ast_args.len());
        for arg in ast_args {
            args.push(self.convert_expression(arg, scope)?);
        }

        let candidates = self.index.lookup(name);
        // The parser only emits command calls for names it recognised
        // against this very index.
        if candidates.is_empty() {
            return Err(SemanticError::Invariant(format!(
                "command `{name}` is missing from the index"
            )));
        }

        let selected = if args.is_empty() {
            candidates[0]
        } else {
            match resolve_overload(self.index, candidates, &args) {
                OverloadResolution::Selected(id) => id,
                OverloadResolution::NoMatch => {
                    let arg_types = args.iter().map(|arg| arg.ty.to_string()).join(", ");
                    self.report(Diagnostic::no_matching_overload(
                        name,
                        &arg_types,
                        span.into(),
                    ));
                    return Ok(None);
                }
            }
        };

        let command = self.index.command(selected);
        let parameter_types = command
            .args
            .iter()
            .map(|parameter| {
                type_from_command_type(parameter.ty).map_err(|marker| {
                    SemanticError::Invariant(format!(
                        "internal type marker `{marker}` survived overload filtering for `{name}`"
                    ))
                })
            })
            .collect::<SemanticResult<Vec<_>>>()?;
        let return_type = type_from_command_type(command.return_type).map_err(|marker| {
            SemanticError::Invariant(format!(
                "command `{name}` declares internal return type marker `{marker}`"
            ))
        })?;

        let args = args
            .into_iter()
            .zip(&parameter_types)
            .map(|(arg, parameter_ty)| self.ensure_type(arg, parameter_ty))
            .collect();

        Ok(Some(FunctionCall {
            callee: Callee::Command(selected),
            args,
            return_type,
        }))
    }

    /// Resolves a user-function call against the skeleton table, checking
    /// arity and casting every argument to its parameter's type.
    fn convert_function_call(
        &mut self,
        name: &ast::Ident,
        ast_args: &[ast::Expression],
        span: SourceSpan,
        scope: &mut Scope,
    ) -> SemanticResult<Option<FunctionCall>> {
        let Some(&id) = self.function_names.get(&name.name) else {
            self.report(Diagnostic::undefined_function(&name.name, span.into()));
            return Ok(None);
        };

        if self.signatures[id].param_types.len() != ast_args.len() {
            self.report(Diagnostic::argument_count_mismatch(
                &name.name,
                self.signatures[id].param_types.len(),
                ast_args.len(),
                span.into(),
            ));
            return Ok(None);
        }

        let mut args = Vec::with_capacity(ast_args.len());
        for (arg, parameter_ty) in ast_args.iter().zip(self.signatures[id].param_types.clone()) {
            let converted = self.convert_expression(arg, scope)?;
            args.push(self.ensure_type(converted, &parameter_ty));
        }

        Ok(Some(FunctionCall {
            callee: Callee::UserFunction(id),
            args,
            return_type: self.signatures[id].return_type.clone(),
        }))
    }

    fn convert_expression(
        &mut self,
        expression: &ast::Expression,
        scope: &mut Scope,
    ) -> SemanticResult<Expression> {
        let span = expression.span;
        Ok(match &expression.kind {
            ast::ExpressionKind::Literal(literal) => Expression::new(
                ExpressionKind::Literal(literal.clone()),
                Type::builtin(BuiltinType::of_literal(literal)),
                span,
            ),
            ast::ExpressionKind::VarRef(ident) => {
                let id = self.resolve_variable(ident, scope);
                let ty = scope.get(id).ty.clone();
                Expression::new(ExpressionKind::VarRef(id), ty, span)
            }
            ast::ExpressionKind::UnaryOp { op, expr } => {
                let inner = self.convert_expression(expr, scope)?;
                let ty = inner.ty.clone();
                Expression::new(
                    ExpressionKind::UnaryOp {
                        op: *op,
                        expr: Box::new(inner),
                    },
                    ty,
                    span,
                )
            }
            ast::ExpressionKind::BinaryOp { op, lhs, rhs } => {
                let lhs = self.convert_expression(lhs, scope)?;
                let rhs = self.convert_expression(rhs, scope)?;
                let common = binary_common_type(&lhs, &rhs);
                let lhs = self.ensure_type(lhs, &common);
                let rhs = self.ensure_type(rhs, &common);
                Expression::new(
                    ExpressionKind::BinaryOp {
                        op: *op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    common,
                    span,
                )
            }
            ast::ExpressionKind::Command { name, args } => {
                match self.convert_command_call(name, args, span, scope)? {
                    Some(call) => {
                        let ty = call.return_type.clone();
                        Expression::new(ExpressionKind::Call(call), ty, span)
                    }
                    None => Expression::error(span),
                }
            }
            ast::ExpressionKind::FunctionCall { name, args } => {
                match self.convert_function_call(name, args, span, scope)? {
                    Some(call) => {
                        let ty = call.return_type.clone();
                        Expression::new(ExpressionKind::Call(call), ty, span)
                    }
                    None => Expression::error(span),
                }
            }
        })
    }

    fn convert_statements(
        &mut self,
        block: &ast::Block,
        scope: &mut Scope,
    ) -> SemanticResult<Vec<Statement>> {
        let mut statements = Vec::with_capacity(block.len());
        for statement in block {
            if let Some(converted) = self.convert_statement(statement, scope)? {
                statements.push(converted);
            }
        }
        Ok(statements)
    }

    fn convert_statement(
        &mut self,
        statement: &ast::Statement,
        scope: &mut Scope,
    ) -> SemanticResult<Option<Statement>> {
        let span = statement.span;
        let boolean = Type::builtin(BuiltinType::Boolean);
        let kind = match &statement.kind {
            ast::StatementKind::VarDecl {
                ident,
                ty,
                initial_value,
            } => {
                // An explicit declaration must not name an existing
                // (name, sigil) pair.
                if let Some(existing) = scope.lookup(&ident.name, ident.sigil) {
                    let previous = scope.get(existing);
                    self.report(Diagnostic::redeclared_variable(
                        &ident.name,
                        &previous.ty.to_string(),
                        ident.span.into(),
                        previous.span.into(),
                    ));
                    return Ok(None);
                }

                let var_ty = Type::builtin(BuiltinType::from(*ty));
                let target = scope.declare(Variable::new(
                    ident.name.clone(),
                    ident.sigil,
                    var_ty.clone(),
                    ident.span,
                ));
                let value = self.convert_expression(initial_value, scope)?;
                StatementKind::Assign {
                    target,
                    value: self.ensure_type(value, &var_ty),
                }
            }
            ast::StatementKind::Assignment { target, value } => {
                let target = self.resolve_variable(target, scope);
                let target_ty = scope.get(target).ty.clone();
                let value = self.convert_expression(value, scope)?;
                StatementKind::Assign {
                    target,
                    value: self.ensure_type(value, &target_ty),
                }
            }
            ast::StatementKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.convert_expression(condition, scope)?;
                StatementKind::Conditional {
                    condition: self.ensure_type(condition, &boolean),
                    then_branch: self.convert_statements(then_branch, scope)?,
                    else_branch: self.convert_statements(else_branch, scope)?,
                }
            }
            ast::StatementKind::WhileLoop { condition, body } => {
                let condition = self.convert_expression(condition, scope)?;
                StatementKind::While {
                    condition: self.ensure_type(condition, &boolean),
                    body: self.convert_statements(body, scope)?,
                }
            }
            ast::StatementKind::UntilLoop { condition, body } => {
                let condition = self.convert_expression(condition, scope)?;
                StatementKind::Until {
                    condition: self.ensure_type(condition, &boolean),
                    body: self.convert_statements(body, scope)?,
                }
            }
            ast::StatementKind::InfiniteLoop { body } => StatementKind::Loop {
                body: self.convert_statements(body, scope)?,
            },
            ast::StatementKind::Break => StatementKind::Break,
            ast::StatementKind::Label { name } => StatementKind::Label { name: name.clone() },
            ast::StatementKind::Goto { label } => StatementKind::Goto {
                label: label.clone(),
            },
            ast::StatementKind::Gosub { label } => StatementKind::Gosub {
                label: label.clone(),
            },
            ast::StatementKind::SubReturn => StatementKind::SubReturn,
            ast::StatementKind::Increment { target, step } => StatementKind::Increment {
                target: self.resolve_variable(target, scope),
                step: self.convert_expression(step, scope)?,
            },
            ast::StatementKind::Decrement { target, step } => StatementKind::Decrement {
                target: self.resolve_variable(target, scope),
                step: self.convert_expression(step, scope)?,
            },
            ast::StatementKind::Command { name, args } => {
                match self.convert_command_call(name, args, span, scope)? {
                    Some(call) => StatementKind::Call(call),
                    None => return Ok(None),
                }
            }
            ast::StatementKind::FunctionCall { name, args } => {
                match self.convert_function_call(name, args, span, scope)? {
                    Some(call) => StatementKind::Call(call),
                    None => return Ok(None),
                }
            }
            ast::StatementKind::ExitFunction { value } => {
                let value = match value {
                    Some(value) => Some(self.convert_expression(value, scope)?),
                    None => None,
                };
                StatementKind::ExitFunction { value }
            }
            ast::StatementKind::Function(decl) => {
                // Phase A consumed every top-level declaration; one inside a
                // body means the parser handed over a malformed tree.
                return Err(SemanticError::Invariant(format!(
                    "function declaration `{}` in statement position",
                    decl.name.name
                )));
            }
        };
        Ok(Some(Statement::new(kind, span)))
    }
}
