use super::FormatChecker;
use crate::language::{
    catalog::VARIANT,
    types::{IntWidth, TypeDescriptor},
};

impl FormatChecker {
    /// The format string that would accept an argument of type `ty` in an
    /// inbound call, if there is an unambiguous one.
    ///
    /// Types whose width depends on the architecture get no suggestion, since
    /// any fixed-width token would be wrong on some target.
    pub fn format_string_for_type(&self, ty: &TypeDescriptor) -> Option<&'static str> {
        if self.is_architecture_dependent(ty) {
            return None;
        }

        let suggestion = match self.canonical(ty) {
            TypeDescriptor::Bool => Some("b"),
            TypeDescriptor::Char { signed: false } => Some("y"),
            TypeDescriptor::Int { width, signed } => Some(match (width, signed) {
                (IntWidth::W16, true) => "n",
                (IntWidth::W16, false) => "q",
                (IntWidth::W32, true) => "i",
                (IntWidth::W32, false) => "u",
                (IntWidth::W64, true) => "x",
                (IntWidth::W64, false) => "t",
            }),
            TypeDescriptor::Float | TypeDescriptor::Double => Some("d"),
            TypeDescriptor::Pointer { pointee, is_const } => match *pointee {
                TypeDescriptor::Char { signed: true } if is_const => Some("&s"),
                TypeDescriptor::Char { signed: true } => Some("s"),
                TypeDescriptor::Named(ref name) if name == VARIANT => Some("v"),
                TypeDescriptor::Pointer { ref pointee, .. }
                    if **pointee == TypeDescriptor::char() =>
                {
                    Some("^as")
                }
                _ => None,
            },
            _ => None,
        };
        log::trace!("Format string for ‘{ty}’: {suggestion:?}.");
        suggestion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_distinguish_const() {
        let checker = FormatChecker::default();
        let gchar = TypeDescriptor::named("gchar");
        assert_eq!(
            checker.format_string_for_type(&TypeDescriptor::const_pointer_to(gchar.clone())),
            Some("&s")
        );
        assert_eq!(
            checker.format_string_for_type(&TypeDescriptor::pointer_to(gchar.clone())),
            Some("s")
        );
        assert_eq!(
            checker.format_string_for_type(&TypeDescriptor::pointer_to(
                TypeDescriptor::pointer_to(gchar)
            )),
            Some("^as")
        );
    }

    #[test]
    fn aliases_resolve_before_mapping() {
        let checker = FormatChecker::default();
        assert_eq!(checker.format_string_for_type(&TypeDescriptor::named("guint16")), Some("q"));
        assert_eq!(checker.format_string_for_type(&TypeDescriptor::named("gboolean")), Some("b"));
        assert_eq!(checker.format_string_for_type(&TypeDescriptor::named("gfloat")), Some("d"));
        assert_eq!(
            checker.format_string_for_type(&TypeDescriptor::pointer_to(TypeDescriptor::named(
                "GVariant"
            ))),
            Some("v")
        );
    }

    #[test]
    fn no_suggestion_for_unstable_or_unmappable_types() {
        let checker = FormatChecker::default();
        assert_eq!(checker.format_string_for_type(&TypeDescriptor::named("glong")), None);
        assert_eq!(checker.format_string_for_type(&TypeDescriptor::LongDouble), None);
        assert_eq!(
            checker.format_string_for_type(&TypeDescriptor::named("GVariantBuilder")),
            None
        );
        assert_eq!(
            checker.format_string_for_type(&TypeDescriptor::pointer_to(TypeDescriptor::Unknown)),
            None
        );
    }
}
