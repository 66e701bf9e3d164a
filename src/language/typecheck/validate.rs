use super::{
    CallCheck, CallSite, CheckFlags, DiagnosticKind, FormatChecker, FormatDiagnostic,
    FunctionSignature,
};
use crate::language::types::ArgumentDescriptor;

impl FormatChecker {
    /// Checks one call expression. Calls to functions missing from the
    /// signature table produce nothing.
    pub fn check_call<C: CallSite + ?Sized>(&self, call: &C) -> Vec<FormatDiagnostic> {
        let name = call.function_name();
        let Some(signature) = self.signatures().lookup(name) else {
            log::trace!("Skipping call to {name}(): not a GVariant function.");
            return Vec::new();
        };
        let arguments = call.arguments();

        let Some(format) = call.literal_format_string(signature.format_param_index) else {
            log::info!("Call to {name}() has no literal format string.");
            return vec![FormatDiagnostic::new(
                DiagnosticKind::NonLiteralFormatString,
                signature.format_param_index,
                format!(
                    "Non-literal GVariant format string in call to {name}(). Cannot check format string correctness. Instead of a non-literal format string, use GVariantBuilder."
                ),
            )];
        };
        log::info!("Checking format string ‘{format}’ in call to {name}().");

        let mut check = CallCheck::new(self, arguments, signature);
        if let Err(fatal) = self.verify_arguments(&mut check, format, signature) {
            check.diagnostics.push(fatal);
        }
        check.diagnostics
    }

    /// Walks the whole format string, then checks that every argument was
    /// used.
    fn verify_arguments(
        &self,
        check: &mut CallCheck<'_>,
        format: &str,
        signature: &FunctionSignature,
    ) -> Result<(), FormatDiagnostic> {
        let flags = CheckFlags::for_signature(signature);
        let mut rest = format;
        while !rest.is_empty() && !rest.starts_with([')', '}']) {
            rest = check.check_format_string(rest, flags)?;
        }

        if !rest.is_empty() {
            return check.report(FormatDiagnostic::new(
                DiagnosticKind::TrailingFormatCharacters,
                signature.format_param_index,
                format!(
                    "Unexpected GVariant format strings ‘{rest}’ with unpaired arguments. If using multiple format strings, they should be enclosed in brackets to create a tuple (e.g. ‘({format})’)."
                ),
            ));
        }

        // A va_list tail cannot be counted.
        if !signature.uses_va_list {
            let arguments = check.arguments;
            for (index, argument) in arguments.iter().enumerate().skip(check.cursor) {
                check.report(self.excess_argument(index, argument))?;
            }
        }
        Ok(())
    }

    fn excess_argument(&self, index: usize, argument: &ArgumentDescriptor) -> FormatDiagnostic {
        let ty = &argument.ty;
        let diagnostic = match self.format_string_for_type(ty) {
            Some(token) => FormatDiagnostic::new(
                DiagnosticKind::ExcessArgument,
                index,
                format!(
                    "Unexpected GVariant variadic argument of type ‘{ty}’. Either it should be removed, or a ‘{token}’ (or other valid) GVariant format string should be added to the format argument to use it."
                ),
            )
            .with_suggestion(token),
            None => FormatDiagnostic::new(
                DiagnosticKind::ExcessArgument,
                index,
                format!(
                    "Unexpected GVariant variadic argument of type ‘{ty}’. Either it should be removed, or a GVariant format string should be added to the format argument to use it."
                ),
            )
            .with_help(
                "the argument has no direct GVariant representation; convert it to a GVariant-representable type first",
            ),
        };
        diagnostic.with_actual(ty.clone())
    }
}
