use super::{compat::promote_variadic, CallCheck, CheckFlags, DiagnosticKind, FormatDiagnostic};
use crate::language::types::TypeDescriptor;

impl<'a> CallCheck<'a> {
    /// Checks the next variadic argument against `expected`, as adjusted by
    /// `flags`, and moves past it.
    ///
    /// Mismatches are recorded and the slot is still consumed so later
    /// arguments are paired with the right tokens.
    pub(super) fn consume_argument(
        &mut self,
        expected: TypeDescriptor,
        flags: CheckFlags,
    ) -> Result<(), FormatDiagnostic> {
        // Without individually inspectable arguments, only syntax is checked.
        if !flags.consume_arguments {
            return Ok(());
        }

        let catalog = self.checker.catalog();
        let mut expected = match flags.forced_type {
            Some(forced) => catalog.resolve_pointer_to_named_type(forced.type_name()),
            None => expected,
        };
        if flags.direction_out && flags.require_const && expected.is_pointer() {
            expected = expected.with_const_pointee();
        }
        // Outbound values are written through one more level of indirection.
        // This has to happen after the const adjustment above.
        if flags.direction_out && flags.forced_type.map_or(true, |forced| forced.wraps_outbound()) {
            expected = TypeDescriptor::pointer_to(expected);
        }

        log::debug!("Consuming variadic argument with expected type ‘{expected}’.");

        let arguments = self.arguments;
        let Some(argument) = arguments.get(self.cursor) else {
            return self.report(
                FormatDiagnostic::new(
                    DiagnosticKind::MissingArgument,
                    self.format_index,
                    format!(
                        "Expected a GVariant variadic argument of type ‘{expected}’ but there wasn’t one."
                    ),
                )
                .with_expected(expected),
            );
        };
        let index = self.cursor;
        self.cursor += 1;

        if argument.is_null_constant {
            if !flags.allow_null && expected.is_pointer() {
                self.report(
                    FormatDiagnostic::new(
                        DiagnosticKind::NullNotAllowed,
                        index,
                        format!(
                            "Expected a GVariant variadic argument of type ‘{expected}’ but saw NULL instead."
                        ),
                    )
                    .with_expected(expected)
                    .with_actual(argument.ty.clone()),
                )?;
            }
            return Ok(());
        }

        let checker = self.checker;
        let expected_canonical = checker.canonical(&expected);
        let mut actual = checker.canonical(&argument.ty);
        if argument.is_nonneg_integer_constant()
            && expected_canonical.is_unsigned_integer()
            && actual.is_signed_integer()
        {
            // A non-negative constant keeps its width but may be read unsigned.
            actual = actual.to_unsigned();
        }
        if !flags.direction_out {
            actual = promote_variadic(actual);
        }

        if checker.is_architecture_dependent(&argument.ty) {
            self.report(
                FormatDiagnostic::new(
                    DiagnosticKind::ArchitectureDependentMismatch,
                    index,
                    format!(
                        "Expected a GVariant variadic argument of type ‘{expected}’ but saw one of type ‘{}’. These types are not compatible on every architecture.",
                        argument.ty
                    ),
                )
                .with_expected(expected)
                .with_actual(argument.ty.clone())
                .with_help("use a fixed-width type such as gint32 or gint64 instead"),
            )
        } else if !checker.compatible(&actual, &expected_canonical, flags.direction_out) {
            self.report(
                FormatDiagnostic::new(
                    DiagnosticKind::TypeMismatch,
                    index,
                    format!(
                        "Expected a GVariant variadic argument of type ‘{expected}’ but saw one of type ‘{}’.",
                        argument.ty
                    ),
                )
                .with_expected(expected)
                .with_actual(argument.ty.clone()),
            )
        } else {
            Ok(())
        }
    }
}
