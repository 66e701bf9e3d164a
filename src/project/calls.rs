//! Call sites to check, read from a TOML file:
//!
//! ```toml
//! [[call]]
//! function = "g_variant_get"
//! args = ["GVariant *", '"(&s)"', "const gchar **"]
//! ```

use crate::language::{
    errors::SyntaxError,
    parser::parse_argument,
    span::Span,
    typecheck::CallSite,
    types::ArgumentDescriptor,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::Spanned;

#[derive(Debug, Error)]
pub enum CallsError {
    #[error("failed to parse {}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        message: String,
        span: Option<Span>,
    },
    #[error("argument {index} of call to {function}(): {source}")]
    Argument {
        function: String,
        index: usize,
        /// Spans are relative to the whole file.
        #[source]
        source: SyntaxError,
    },
}

impl CallsError {
    pub fn span(&self) -> Option<Span> {
        match self {
            CallsError::Parse { span, .. } => *span,
            CallsError::Argument { source, .. } => Some(source.span),
        }
    }

    pub fn help(&self) -> Option<&str> {
        match self {
            CallsError::Parse { .. } => None,
            CallsError::Argument { source, .. } => source.help.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct RawCallsFile {
    #[serde(default)]
    call: Vec<RawCall>,
}

#[derive(Deserialize)]
struct RawCall {
    function: Spanned<String>,
    #[serde(default)]
    args: Vec<Spanned<String>>,
}

/// One call expression with its arguments already described.
#[derive(Clone, Debug)]
pub struct CallRecord {
    pub function: String,
    /// Location of the function name in the calls file.
    pub span: Span,
    pub argument_spans: Vec<Span>,
    literals: Vec<Option<String>>,
    arguments: Vec<ArgumentDescriptor>,
}

impl CallRecord {
    /// Where a diagnostic anchored at argument `index` should point.
    pub fn anchor_span(&self, index: usize) -> Span {
        self.argument_spans.get(index).copied().unwrap_or(self.span)
    }
}

impl CallSite for CallRecord {
    fn function_name(&self) -> &str {
        &self.function
    }

    fn literal_format_string(&self, index: usize) -> Option<&str> {
        self.literals.get(index)?.as_deref()
    }

    fn arguments(&self) -> &[ArgumentDescriptor] {
        &self.arguments
    }
}

#[derive(Debug)]
pub struct CallsFile {
    pub path: PathBuf,
    pub calls: Vec<CallRecord>,
}

impl CallsFile {
    pub fn parse(path: &Path, source: &str) -> Result<Self, CallsError> {
        let raw: RawCallsFile = toml::from_str(source).map_err(|error| CallsError::Parse {
            path: path.to_path_buf(),
            message: error.message().to_string(),
            span: error.span().map(Span::from),
        })?;

        let mut calls = Vec::with_capacity(raw.call.len());
        for call in raw.call {
            let span = Span::from(call.function.span());
            let function = call.function.into_inner();
            let mut argument_spans = Vec::with_capacity(call.args.len());
            let mut literals = Vec::with_capacity(call.args.len());
            let mut arguments = Vec::with_capacity(call.args.len());

            for (index, arg) in call.args.into_iter().enumerate() {
                let span = Span::from(arg.span());
                let parsed = parse_argument(arg.get_ref()).map_err(|error| CallsError::Argument {
                    function: function.clone(),
                    index,
                    source: relocate(error, span),
                })?;
                argument_spans.push(span);
                literals.push(parsed.string_literal);
                arguments.push(parsed.descriptor);
            }

            log::trace!("Read call to {function}() with {} arguments.", arguments.len());
            calls.push(CallRecord {
                function,
                span,
                argument_spans,
                literals,
                arguments,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            calls,
        })
    }
}

/// Moves a spelling error into file coordinates. The TOML span includes the
/// opening quote; escapes inside the string may skew the result, so it is
/// clamped to the string.
fn relocate(error: SyntaxError, string_span: Span) -> SyntaxError {
    let error = error.shifted(string_span.start + 1);
    let end = string_span.end.saturating_sub(1).max(string_span.start);
    let start = error.span.start.min(end);
    SyntaxError {
        span: Span::new(start, error.span.end.clamp(start, end)),
        ..error
    }
}
