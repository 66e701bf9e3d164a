//! GVariant format string checking.
//!
//! A call is checked by walking its literal format string with two mutually
//! recursive grammars (type strings and format strings) while consuming the
//! call's variadic arguments in lockstep. Every leaf of the grammar yields an
//! expected argument type, which is compared against the static type of the
//! next argument.

use crate::language::{
    catalog::TypeCatalog,
    types::{ArgumentDescriptor, TypeDescriptor},
};
use crate::target::BuildTarget;

mod compat;
mod consume;
mod grammar;
mod signatures;
mod suggest;
mod validate;


pub use signatures::{Direction, FunctionSignature, SignatureTable};

pub const CODE_GRAMMAR: &str = "gvariant.grammar";
pub const CODE_MISSING_ARGUMENT: &str = "gvariant.missingArgument";
pub const CODE_EXCESS_ARGUMENT: &str = "gvariant.excessArgument";
pub const CODE_TYPE_MISMATCH: &str = "gvariant.typeMismatch";
pub const CODE_ARCH_MISMATCH: &str = "gvariant.architectureDependent";
pub const CODE_NULL_NOT_ALLOWED: &str = "gvariant.nullNotAllowed";
pub const CODE_NON_LITERAL: &str = "gvariant.nonLiteralFormat";
pub const CODE_TRAILING_FORMAT: &str = "gvariant.trailingFormat";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    GrammarError,
    MissingArgument,
    ExcessArgument,
    TypeMismatch,
    ArchitectureDependentMismatch,
    NullNotAllowed,
    NonLiteralFormatString,
    TrailingFormatCharacters,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::GrammarError => CODE_GRAMMAR,
            DiagnosticKind::MissingArgument => CODE_MISSING_ARGUMENT,
            DiagnosticKind::ExcessArgument => CODE_EXCESS_ARGUMENT,
            DiagnosticKind::TypeMismatch => CODE_TYPE_MISMATCH,
            DiagnosticKind::ArchitectureDependentMismatch => CODE_ARCH_MISMATCH,
            DiagnosticKind::NullNotAllowed => CODE_NULL_NOT_ALLOWED,
            DiagnosticKind::NonLiteralFormatString => CODE_NON_LITERAL,
            DiagnosticKind::TrailingFormatCharacters => CODE_TRAILING_FORMAT,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::NonLiteralFormatString => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether the check of the current call stops at this diagnostic.
    pub fn is_fatal(self) -> bool {
        !matches!(
            self,
            DiagnosticKind::TypeMismatch
                | DiagnosticKind::ArchitectureDependentMismatch
                | DiagnosticKind::NullNotAllowed
                | DiagnosticKind::ExcessArgument
        )
    }
}

/// One finding for a call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDiagnostic {
    pub kind: DiagnosticKind,
    /// Expected type, when the diagnostic is about an argument slot.
    pub primary_type: Option<TypeDescriptor>,
    /// Actual type of the offending argument.
    pub secondary_type: Option<TypeDescriptor>,
    pub message: String,
    /// Index of the call argument the diagnostic points at.
    pub anchor: usize,
    pub help: Option<String>,
    /// Format token proposed for an unconsumed argument.
    pub suggestion: Option<&'static str>,
}

impl FormatDiagnostic {
    pub fn new(kind: DiagnosticKind, anchor: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            primary_type: None,
            secondary_type: None,
            message: message.into(),
            anchor,
            help: None,
            suggestion: None,
        }
    }

    pub fn with_expected(mut self, ty: TypeDescriptor) -> Self {
        self.primary_type = Some(ty);
        self
    }

    pub fn with_actual(mut self, ty: TypeDescriptor) -> Self {
        self.secondary_type = Some(ty);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_suggestion(mut self, token: &'static str) -> Self {
        self.suggestion = Some(token);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn display_message(&self) -> String {
        format!("[{}] {}", self.code(), self.message)
    }
}

/// Named type an argument slot is forced to, regardless of the format token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForcedType {
    /// `GVariant *`, for `@` conversions.
    Container,
    /// `va_list *`, for functions taking the variadic tail as a `va_list`.
    ArgumentList,
}

impl ForcedType {
    pub fn type_name(self) -> &'static str {
        match self {
            ForcedType::Container => crate::language::catalog::VARIANT,
            ForcedType::ArgumentList => crate::language::catalog::VA_LIST,
        }
    }

    /// The `va_list` handle is passed as-is, even for outbound calls.
    fn wraps_outbound(self) -> bool {
        matches!(self, ForcedType::Container)
    }
}

/// Modifier context threaded through the grammar. Each recursive step works
/// on its own copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckFlags {
    pub forced_type: Option<ForcedType>,
    /// Const-qualify the pointee of an outbound pointer (`&` conversions).
    pub require_const: bool,
    pub direction_out: bool,
    pub allow_null: bool,
    pub consume_arguments: bool,
}

impl CheckFlags {
    pub fn for_signature(signature: &FunctionSignature) -> Self {
        let mut flags = CheckFlags::default();
        if signature.uses_va_list {
            flags.forced_type = Some(ForcedType::ArgumentList);
        } else {
            flags.consume_arguments = true;
        }
        // Outbound arguments may always be NULL to skip an element.
        if signature.direction == Direction::Out {
            flags.direction_out = true;
            flags.allow_null = true;
        }
        flags
    }

    pub fn forcing(self, forced: ForcedType) -> Self {
        Self {
            forced_type: Some(forced),
            ..self
        }
    }

    pub fn requiring_const(self) -> Self {
        Self {
            require_const: true,
            ..self
        }
    }

    pub fn allowing_null(self) -> Self {
        Self {
            allow_null: true,
            ..self
        }
    }

    pub fn without_consuming(self) -> Self {
        Self {
            consume_arguments: false,
            ..self
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypecheckOptions {
    pub target: BuildTarget,
    /// Typedef names whose width differs between common architectures.
    pub unstable_aliases: Vec<String>,
}

impl Default for TypecheckOptions {
    fn default() -> Self {
        Self {
            target: BuildTarget::host(),
            unstable_aliases: vec!["glong".into(), "gulong".into()],
        }
    }
}

/// Source of the facts the checker needs about one call expression.
pub trait CallSite {
    fn function_name(&self) -> &str;

    /// Contents of the argument at `index` if it is a string literal.
    fn literal_format_string(&self, index: usize) -> Option<&str>;

    /// Static descriptions of every call argument, in order.
    fn arguments(&self) -> &[ArgumentDescriptor];
}

/// Immutable checking context, shareable between threads.
#[derive(Clone, Debug)]
pub struct FormatChecker {
    catalog: TypeCatalog,
    signatures: SignatureTable,
    options: TypecheckOptions,
}

impl Default for FormatChecker {
    fn default() -> Self {
        Self::new(
            TypeCatalog::glib(),
            SignatureTable::glib(),
            TypecheckOptions::default(),
        )
    }
}

impl FormatChecker {
    pub fn new(catalog: TypeCatalog, signatures: SignatureTable, options: TypecheckOptions) -> Self {
        Self {
            catalog,
            signatures,
            options,
        }
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn signatures(&self) -> &SignatureTable {
        &self.signatures
    }

    pub fn options(&self) -> &TypecheckOptions {
        &self.options
    }
}

/// Result of one grammar step: the unparsed rest of the format string, or the
/// fatal diagnostic that ended the check.
type Step<'f> = Result<&'f str, FormatDiagnostic>;

/// Per-call parse state. Owned by a single check and dropped afterwards.
struct CallCheck<'a> {
    checker: &'a FormatChecker,
    arguments: &'a [ArgumentDescriptor],
    /// Next argument to consume. Only moves forward.
    cursor: usize,
    /// Index of the format string argument.
    format_index: usize,
    diagnostics: Vec<FormatDiagnostic>,
}

impl<'a> CallCheck<'a> {
    fn new(
        checker: &'a FormatChecker,
        arguments: &'a [ArgumentDescriptor],
        signature: &FunctionSignature,
    ) -> Self {
        Self {
            checker,
            arguments,
            cursor: signature.first_vararg_index.min(arguments.len()),
            format_index: signature.format_param_index,
            diagnostics: Vec::new(),
        }
    }

    fn grammar_error(&self, message: impl Into<String>) -> FormatDiagnostic {
        FormatDiagnostic::new(DiagnosticKind::GrammarError, self.format_index, message)
    }

    /// Records `diagnostic`, or hands it back as the error that ends the
    /// check when it is fatal.
    fn report(&mut self, diagnostic: FormatDiagnostic) -> Result<(), FormatDiagnostic> {
        if diagnostic.kind.is_fatal() {
            return Err(diagnostic);
        }
        self.diagnostics.push(diagnostic);
        Ok(())
    }
}
