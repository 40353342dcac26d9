//! # Diagnostics for the DBasic compiler
//!
//! This crate provides the diagnostic infrastructure shared by the semantic
//! converter, the command catalogue and the driver: a [`Diagnostic`] value
//! with a severity, a stable code, a primary span and optional secondary
//! spans, a [`DiagnosticCollection`] to accumulate them, and an
//! ariadne-based renderer.

pub mod diagnostics;
pub mod reporting;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection, DiagnosticSeverity};
pub use reporting::build_diagnostic_message;
