use super::FormatChecker;
use crate::language::types::{IntWidth, TypeDescriptor};

impl FormatChecker {
    /// Resolves catalog aliases and gives `long` the build target's width.
    pub fn canonical(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        let long_width = self.options().target.long_width();
        sized(self.catalog().canonicalize(ty), long_width)
    }

    /// Whether a value of type `actual` can be passed where `expected` is
    /// wanted.
    ///
    /// Inbound arguments may be const or not at any pointer level; outbound
    /// pointers must match qualifiers exactly, since the callee writes
    /// through them.
    pub fn compatible(
        &self,
        actual: &TypeDescriptor,
        expected: &TypeDescriptor,
        direction_out: bool,
    ) -> bool {
        let actual = self.canonical(actual);
        let expected = self.canonical(expected);
        log::trace!("Comparing type ‘{actual}’ with ‘{expected}’.");
        same_shape(&actual, &expected, direction_out)
    }

    /// Whether `ty` has a width that differs between common architectures.
    ///
    /// A typedef is assumed to be width-stable unless it is listed in
    /// [`super::TypecheckOptions::unstable_aliases`]; GLib's fixed-width
    /// aliases go to great lengths to be stable, `glong` does not.
    pub fn is_architecture_dependent(&self, ty: &TypeDescriptor) -> bool {
        match ty.innermost() {
            TypeDescriptor::Named(name) => self
                .options()
                .unstable_aliases
                .iter()
                .any(|alias| alias == name),
            TypeDescriptor::Long { .. } | TypeDescriptor::LongDouble => true,
            _ => false,
        }
    }
}

fn same_shape(actual: &TypeDescriptor, expected: &TypeDescriptor, direction_out: bool) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (
            TypeDescriptor::Pointer {
                pointee: actual_pointee,
                is_const: actual_const,
            },
            TypeDescriptor::Pointer {
                pointee: expected_pointee,
                is_const: expected_const,
            },
        ) => {
            (!direction_out || actual_const == expected_const)
                && same_shape(actual_pointee, expected_pointee, direction_out)
        }
        _ => false,
    }
}

fn sized(ty: TypeDescriptor, long_width: IntWidth) -> TypeDescriptor {
    match ty {
        TypeDescriptor::Long { signed } => TypeDescriptor::int(long_width, signed),
        TypeDescriptor::Pointer { pointee, is_const } => TypeDescriptor::Pointer {
            pointee: Box::new(sized(*pointee, long_width)),
            is_const,
        },
        other => other,
    }
}

/// C default argument promotion for a value passed through `...`.
pub(super) fn promote_variadic(ty: TypeDescriptor) -> TypeDescriptor {
    match ty {
        TypeDescriptor::Bool
        | TypeDescriptor::Char { .. }
        | TypeDescriptor::Int {
            width: IntWidth::W16,
            ..
        } => TypeDescriptor::int(IntWidth::W32, true),
        TypeDescriptor::Float => TypeDescriptor::Double,
        other => other,
    }
}

/// The integer type a boolean, 8- or 16-bit format token is read back as when
/// it is passed through `...`.
pub(super) fn promoted_format_type() -> TypeDescriptor {
    TypeDescriptor::int(IntWidth::W32, true)
}
