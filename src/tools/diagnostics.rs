use crate::{
    language::{
        errors::SyntaxError,
        span::Span,
        typecheck::{DiagnosticKind, FormatDiagnostic, Severity},
    },
    project::{CallRecord, CallsError, CallsFile},
};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::{cmp::Ordering, path::Path};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
pub struct FormatErrorDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    message: String,
    label: String,
    #[help]
    help: Option<String>,
}

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(severity(Warning))]
pub struct FormatWarningDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    message: String,
    label: String,
    #[help]
    help: Option<String>,
}

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(gvariant::input))]
pub struct InputDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    message: String,
    #[help]
    help: Option<String>,
}

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("not understood")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource<String>, err: SyntaxError) -> Self {
        Self {
            src,
            span: err.to_source_span(),
            help: err.help.clone(),
            message: err.message,
        }
    }
}

/// Reports a spelling given on the command line.
pub fn emit_syntax_error(name: &str, spelling: &str, err: SyntaxError) {
    let src = NamedSource::new(name, spelling.to_string());
    eprintln!("{:?}", Report::new(SyntaxDiagnostic::from_error(src, err)));
}

/// Counts of what was reported for one calls file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub calls: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckSummary {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// One line comparing this check with the one before it.
    pub fn progress_since(&self, previous: &CheckSummary) -> String {
        match self.errors.cmp(&previous.errors) {
            Ordering::Less => format!(
                "{} errors left ({} fixed since the last check)",
                self.errors,
                previous.errors - self.errors
            ),
            Ordering::Greater => format!(
                "{} errors ({} new since the last check)",
                self.errors,
                self.errors - previous.errors
            ),
            Ordering::Equal => format!("{} errors, unchanged since the last check", self.errors),
        }
    }
}

/// Short label under the offending argument.
pub fn diagnostic_label(diagnostic: &FormatDiagnostic) -> String {
    match (diagnostic.kind, &diagnostic.primary_type, diagnostic.suggestion) {
        (DiagnosticKind::ExcessArgument, _, Some(token)) => format!("unpaired; try `{token}`"),
        (DiagnosticKind::ExcessArgument, _, None) => "unpaired argument".into(),
        (DiagnosticKind::MissingArgument, Some(expected), _) => {
            format!("needs another argument of type `{expected}`")
        }
        (DiagnosticKind::NullNotAllowed, _, _) => "NULL not allowed here".into(),
        (_, Some(expected), _) => format!("expected `{expected}`"),
        (DiagnosticKind::NonLiteralFormatString, _, _) => "not a string literal".into(),
        _ => "in this format string".into(),
    }
}

/// Renders the diagnostics of every call, in input order, to stderr.
pub fn emit_call_diagnostics(
    path: &Path,
    source: &str,
    file: &CallsFile,
    results: &[Vec<FormatDiagnostic>],
) -> CheckSummary {
    let named = NamedSource::new(path.display().to_string(), source.to_string());
    let mut summary = CheckSummary {
        calls: file.calls.len(),
        ..CheckSummary::default()
    };
    for (call, diagnostics) in file.calls.iter().zip(results) {
        for diagnostic in diagnostics {
            match diagnostic.severity() {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
            eprintln!("{:?}", render(&named, call, diagnostic));
        }
    }
    summary
}

fn render(named: &NamedSource<String>, call: &CallRecord, diagnostic: &FormatDiagnostic) -> Report {
    let span = span_to_source_span(call.anchor_span(diagnostic.anchor));
    let message = diagnostic.display_message();
    let label = diagnostic_label(diagnostic);
    let help = diagnostic.help.clone();
    match diagnostic.severity() {
        Severity::Error => Report::new(FormatErrorDiagnostic {
            src: named.clone(),
            span,
            message,
            label,
            help,
        }),
        Severity::Warning => Report::new(FormatWarningDiagnostic {
            src: named.clone(),
            span,
            message,
            label,
            help,
        }),
    }
}

pub fn emit_calls_error(path: &Path, source: &str, error: &CallsError) {
    let named = NamedSource::new(path.display().to_string(), source.to_string());
    let span = error
        .span()
        .map(span_to_source_span)
        .unwrap_or_else(|| SourceSpan::from((0, 0)));
    let diagnostic = InputDiagnostic {
        src: named,
        span,
        message: error.to_string(),
        help: error.help().map(str::to_string),
    };
    eprintln!("{:?}", Report::new(diagnostic));
}

pub fn report_io_error(path: &Path, error: &std::io::Error) {
    eprintln!("Failed to access {}: {}", path.display(), error);
}

fn span_to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from((span.start, span.end.saturating_sub(span.start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::types::TypeDescriptor;

    #[test]
    fn labels_follow_the_diagnostic() {
        let excess = FormatDiagnostic::new(DiagnosticKind::ExcessArgument, 2, "unpaired")
            .with_suggestion("v");
        assert_eq!(diagnostic_label(&excess), "unpaired; try `v`");

        let mismatch = FormatDiagnostic::new(DiagnosticKind::TypeMismatch, 1, "mismatch")
            .with_expected(TypeDescriptor::pointer_to(TypeDescriptor::char()));
        assert_eq!(diagnostic_label(&mismatch), "expected `char *`");

        let grammar = FormatDiagnostic::new(DiagnosticKind::GrammarError, 0, "bad");
        assert_eq!(diagnostic_label(&grammar), "in this format string");
    }

    #[test]
    fn summary_counts_by_severity() {
        let source = "[[call]]\nfunction = \"g_variant_new\"\nargs = [\"const gchar *\", \"gint\"]\n";
        let file = CallsFile::parse(Path::new("calls.toml"), source).unwrap();
        let results = vec![vec![
            FormatDiagnostic::new(DiagnosticKind::NonLiteralFormatString, 0, "warn"),
            FormatDiagnostic::new(DiagnosticKind::ExcessArgument, 1, "err"),
        ]];
        let summary = emit_call_diagnostics(Path::new("calls.toml"), source, &file, &results);
        assert_eq!(
            summary,
            CheckSummary {
                calls: 1,
                errors: 1,
                warnings: 1
            }
        );
        assert!(summary.has_errors());
    }

    #[test]
    fn progress_compares_error_counts() {
        let before = CheckSummary {
            calls: 4,
            errors: 3,
            warnings: 0,
        };
        let after = CheckSummary {
            errors: 1,
            ..before
        };
        assert_eq!(
            after.progress_since(&before),
            "1 errors left (2 fixed since the last check)"
        );
        assert_eq!(
            before.progress_since(&after),
            "3 errors (2 new since the last check)"
        );
        assert_eq!(
            after.progress_since(&after),
            "1 errors, unchanged since the last check"
        );
    }
}
