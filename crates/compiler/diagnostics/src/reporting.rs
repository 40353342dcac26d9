//! # Error Reporting Utilities
//!
//! Renders a [`Diagnostic`] into a human-readable report with source
//! snippets, using ariadne. Secondary spans become additional labels on the
//! same report.

use ariadne::{Label, Report};

use crate::Diagnostic;

/// Build a formatted message for a diagnostic
pub fn build_diagnostic_message(
    source_content: &str,
    diagnostic: &Diagnostic,
    with_color: bool,
) -> String {
    let mut write_buffer = Vec::new();
    let code_u32: u32 = diagnostic.code.into();

    // Ariadne is keyed by file path; all spans of one diagnostic refer to
    // the same file.
    let file_id = diagnostic.file_path.clone();
    let report_span = (file_id.clone(), diagnostic.span.into_range());
    let cache = ariadne::sources(vec![(file_id.clone(), source_content.to_string())]);

    let mut report = Report::build(diagnostic.severity.into(), report_span.clone())
        .with_config(
            ariadne::Config::new()
                .with_index_type(ariadne::IndexType::Byte)
                .with_color(with_color),
        )
        .with_code(code_u32)
        .with_message(&diagnostic.message)
        .with_label(Label::new(report_span).with_message(&diagnostic.message));

    for (span, message) in &diagnostic.related_spans {
        report = report
            .with_label(Label::new((file_id.clone(), span.into_range())).with_message(message));
    }

    report
        .finish()
        .write(cache, &mut write_buffer)
        .expect("writing to an in-memory buffer cannot fail");
    String::from_utf8_lossy(&write_buffer).to_string()
}
