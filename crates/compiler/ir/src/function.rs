//! # Variables, scopes and function definitions
//!
//! Scopes do not nest: the main body and every user function each own one
//! flat scope. Variables with the same name but different sigils are
//! distinct entries.

use dbasic_compiler_ast::{Sigil, SourceSpan};
use index_vec::IndexVec;
use rustc_hash::FxHashMap;

use crate::{Expression, PrettyPrint, Statement, Type, VariableId, indent_str};

/// A declared or implicitly declared variable
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub sigil: Sigil,
    pub ty: Type,
    /// Location of the first declaration, cited by re-declaration errors
    pub span: SourceSpan,
}

impl Variable {
    pub fn new(name: impl Into<String>, sigil: Sigil, ty: Type, span: SourceSpan) -> Self {
        Self {
            name: name.into(),
            sigil,
            ty,
            span,
        }
    }
}

/// A function's flat collection of variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    variables: IndexVec<VariableId, Variable>,
    lookup_table: FxHashMap<(String, Sigil), VariableId>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable and returns its id. The caller checks for
    /// duplicates first; declaring the same (name, sigil) twice is a
    /// converter bug.
    pub fn declare(&mut self, variable: Variable) -> VariableId {
        let key = (variable.name.clone(), variable.sigil);
        let id = self.variables.push(variable);
        let previous = self.lookup_table.insert(key, id);
        debug_assert!(previous.is_none(), "duplicate declaration in scope");
        id
    }

    /// Looks up a variable by name and sigil
    pub fn lookup(&self, name: &str, sigil: Sigil) -> Option<VariableId> {
        self.lookup_table.get(&(name.to_string(), sigil)).copied()
    }

    /// Gets a variable by id
    pub fn get(&self, id: VariableId) -> &Variable {
        &self.variables[id]
    }

    pub fn contains(&self, id: VariableId) -> bool {
        id.index() < self.variables.len()
    }

    /// All variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables.iter_enumerated()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// A fully converted function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    /// Parameter variables, in declaration order; each also lives in the
    /// scope so body references resolve to the same entry
    pub arguments: Vec<VariableId>,
    pub scope: Scope,
    pub body: Vec<Statement>,
    pub return_expression: Option<Expression>,
    pub span: SourceSpan,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            scope: Scope::new(),
            body: Vec::new(),
            return_expression: None,
            span,
        }
    }

    /// The function's value type: its return expression's type, or void
    pub fn return_type(&self) -> Type {
        self.return_expression
            .as_ref()
            .map_or(Type::Void, |expression| expression.ty.clone())
    }

    /// The declared parameter types, in order
    pub fn argument_types(&self) -> Vec<Type> {
        self.arguments
            .iter()
            .map(|&id| self.scope.get(id).ty.clone())
            .collect()
    }
}

impl PrettyPrint for FunctionDefinition {
    fn pretty_print(&self, indent: usize) -> String {
        let pad = indent_str(indent);
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|&id| {
                let variable = self.scope.get(id);
                format!("%{}: {}", id.index(), variable.ty)
            })
            .collect();
        let mut out = format!("{pad}fn {}({}) {{\n", self.name, args.join(", "));

        if !self.scope.is_empty() {
            out.push_str(&format!("{pad}  scope:\n"));
            for (id, variable) in self.scope.variables() {
                out.push_str(&format!(
                    "{pad}    %{} = {}{}: {}\n",
                    id.index(),
                    variable.name,
                    variable.sigil,
                    variable.ty
                ));
            }
        }

        for statement in &self.body {
            out.push_str(&statement.pretty_print(indent + 1));
        }
        if let Some(value) = &self.return_expression {
            out.push_str(&format!("{pad}  return {}\n", value.pretty_print(0)));
        }
        out.push_str(&format!("{pad}}}\n"));
        out
    }
}
