//! # Diagnostic System
//!
//! This module provides the diagnostic infrastructure for reporting errors
//! produced while loading command catalogues and converting programs.

use std::fmt;

use ariadne::ReportKind;
use chumsky::span::SimpleSpan;

/// A diagnostic message from catalogue loading or semantic conversion
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Path of the file this diagnostic applies to
    pub file_path: String,
    /// Source span where this diagnostic applies
    pub span: SimpleSpan<usize>,
    /// Secondary spans with context messages ("see last declaration")
    pub related_spans: Vec<(SimpleSpan<usize>, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

impl From<DiagnosticSeverity> for ReportKind<'static> {
    fn from(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Error => Self::Error,
            DiagnosticSeverity::Warning => Self::Warning,
            DiagnosticSeverity::Info => Self::Advice,
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Catalogue errors (0-999)
    CommandConflict,

    // Identifier resolution errors (1000-1999)
    UndefinedFunction,
    ArgumentCountMismatch,
    RedeclaredVariable,

    // Type errors (2000-2999)
    TypeConversion,
    NoMatchingOverload,

    // Structural errors (3000-3999)
    MisplacedStatement,
}

impl From<DiagnosticCode> for u32 {
    fn from(code: DiagnosticCode) -> Self {
        match code {
            DiagnosticCode::CommandConflict => 1,
            DiagnosticCode::UndefinedFunction => 1001,
            DiagnosticCode::ArgumentCountMismatch => 1002,
            DiagnosticCode::RedeclaredVariable => 1003,
            DiagnosticCode::TypeConversion => 2001,
            DiagnosticCode::NoMatchingOverload => 2002,
            DiagnosticCode::MisplacedStatement => 3001,
        }
    }
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            message,
            file_path: String::new(),
            span: SimpleSpan::from(0..0),
            related_spans: Vec::new(),
        }
    }

    /// Attach the file this diagnostic refers to
    pub fn in_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }

    /// Add location information to this diagnostic
    pub const fn with_location(mut self, span: SimpleSpan<usize>) -> Self {
        self.span = span;
        self
    }

    /// Add a related span with a context message
    pub fn with_related_span(mut self, span: SimpleSpan<usize>, message: String) -> Self {
        self.related_spans.push((span, message));
        self
    }

    /// Convenience method for command catalogue conflicts
    pub fn command_conflict(name: &str, type_info: &str, library: &str, previous: &str) -> Self {
        Self::error(
            DiagnosticCode::CommandConflict,
            format!("Command `{name} {type_info}` redefined in library `{library}`"),
        )
        .with_related_span(
            SimpleSpan::from(0..0),
            format!("Command was first declared in library `{previous}`"),
        )
    }

    /// Convenience method for calls to undefined user functions
    pub fn undefined_function(name: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::UndefinedFunction,
            format!("Function `{name}` is not defined"),
        )
        .with_location(span)
    }

    /// Convenience method for calls with the wrong number of arguments
    pub fn argument_count_mismatch(
        name: &str,
        expected: usize,
        provided: usize,
        span: SimpleSpan<usize>,
    ) -> Self {
        Self::error(
            DiagnosticCode::ArgumentCountMismatch,
            format!("Function `{name}` requires {expected} arguments, but {provided} were provided"),
        )
        .with_location(span)
    }

    /// Convenience method for re-declared variables, citing the original
    pub fn redeclared_variable(
        name: &str,
        type_name: &str,
        span: SimpleSpan<usize>,
        previous: SimpleSpan<usize>,
    ) -> Self {
        Self::error(
            DiagnosticCode::RedeclaredVariable,
            format!("Variable `{name}` has already been declared as type {type_name}"),
        )
        .with_location(span)
        .with_related_span(previous, "see last declaration".to_string())
    }

    /// Convenience method for failed type conversions
    pub fn type_conversion(from: &str, to: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::TypeConversion,
            format!("Failed to convert {from} to {to}"),
        )
        .with_location(span)
    }

    /// Convenience method for overload resolution failures
    pub fn no_matching_overload(name: &str, arg_types: &str, span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::NoMatchingOverload,
            format!("Unable to find a matching overload for command `{name}` taking ({arg_types})"),
        )
        .with_location(span)
    }

    /// Convenience method for statements appearing after the first function
    pub fn misplaced_statement(span: SimpleSpan<usize>) -> Self {
        Self::error(
            DiagnosticCode::MisplacedStatement,
            "reached the end of main but encountered a non-function node".to_string(),
        )
        .with_location(span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.file_path.is_empty() {
            write!(f, "{}: ", self.file_path)?;
        }
        write!(f, "{}: {}", self.severity, self.message)?;
        write!(f, " (at {}:{})", self.span.start, self.span.end)?;
        for (span, message) in &self.related_spans {
            write!(f, "\n  note: {} (at {}:{})", message, span.start, span.end)?;
        }
        Ok(())
    }
}

/// Collection of diagnostics from one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic to the collection
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add multiple diagnostics
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Get all diagnostics in emission order
    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get only error diagnostics
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .collect()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Get the total number of diagnostics
    pub const fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if the collection is empty
    pub const fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let errors = self.errors().len();
        let warnings = self.len() - errors;

        if self.diagnostics.is_empty() {
            "No issues found".to_string()
        } else {
            format!("{errors} errors, {warnings} warnings")
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl From<Vec<Diagnostic>> for DiagnosticCollection {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let span = SimpleSpan::from(10..20);
        let diag = Diagnostic::undefined_function("reverse$", span);
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.code, DiagnosticCode::UndefinedFunction);
        assert!(diag.message.contains("reverse$"));
        assert_eq!(diag.span, span);
    }

    #[test]
    fn test_redeclaration_cites_previous() {
        let diag = Diagnostic::redeclared_variable(
            "x",
            "integer",
            SimpleSpan::from(30..31),
            SimpleSpan::from(4..5),
        );
        assert_eq!(diag.related_spans.len(), 1);
        let display = format!("{diag}");
        assert!(display.contains("already been declared as type integer"));
        assert!(display.contains("see last declaration"));
    }

    #[test]
    fn test_command_conflict_cites_both_libraries() {
        let diag = Diagnostic::command_conflict("print", "0(S)", "Text", "DBProCore");
        assert_eq!(diag.code, DiagnosticCode::CommandConflict);
        let display = format!("{diag}");
        assert!(display.contains("redefined in library `Text`"));
        assert!(display.contains("first declared in library `DBProCore`"));
    }

    #[test]
    fn test_diagnostic_collection() {
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::misplaced_statement(SimpleSpan::from(0..5)));
        collection.add(Diagnostic::type_conversion(
            "string",
            "integer",
            SimpleSpan::from(10..15),
        ));

        assert_eq!(collection.len(), 2);
        assert!(collection.has_errors());
        assert_eq!(collection.summary(), "2 errors, 0 warnings");
    }
}
