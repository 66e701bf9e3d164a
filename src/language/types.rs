use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }
}

/// Static type of a value as seen by the format checker.
///
/// Qualifiers live on pointer edges: `is_const` on a [`TypeDescriptor::Pointer`]
/// qualifies the pointee, so `const char *` is a pointer to `char` with
/// `is_const` set. Top-level qualifiers of an argument are irrelevant to a
/// variadic call and are not represented.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Bool,
    Char { signed: bool },
    Int { width: IntWidth, signed: bool },
    /// The platform's native `long`; its width depends on the build target.
    Long { signed: bool },
    Float,
    Double,
    LongDouble,
    Pointer {
        pointee: Box<TypeDescriptor>,
        is_const: bool,
    },
    /// Typedef or opaque library type, resolved through the type catalog.
    Named(String),
    Unknown,
}

impl TypeDescriptor {
    pub fn int(width: IntWidth, signed: bool) -> Self {
        TypeDescriptor::Int { width, signed }
    }

    pub fn char() -> Self {
        TypeDescriptor::Char { signed: true }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeDescriptor::Named(name.into())
    }

    pub fn pointer_to(pointee: TypeDescriptor) -> Self {
        TypeDescriptor::Pointer {
            pointee: Box::new(pointee),
            is_const: false,
        }
    }

    pub fn const_pointer_to(pointee: TypeDescriptor) -> Self {
        TypeDescriptor::Pointer {
            pointee: Box::new(pointee),
            is_const: true,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeDescriptor::Pointer { .. })
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Char { signed: false }
                | TypeDescriptor::Int { signed: false, .. }
                | TypeDescriptor::Long { signed: false }
        )
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Char { signed: true }
                | TypeDescriptor::Int { signed: true, .. }
                | TypeDescriptor::Long { signed: true }
        )
    }

    /// The unsigned integer of the same width. Other types are returned
    /// unchanged.
    pub fn to_unsigned(&self) -> TypeDescriptor {
        match self {
            TypeDescriptor::Char { .. } => TypeDescriptor::Char { signed: false },
            TypeDescriptor::Int { width, .. } => TypeDescriptor::int(*width, false),
            TypeDescriptor::Long { .. } => TypeDescriptor::Long { signed: false },
            other => other.clone(),
        }
    }

    /// Pointer to the same pointee with the pointee const-qualified. Other
    /// types are returned unchanged.
    pub fn with_const_pointee(&self) -> TypeDescriptor {
        match self {
            TypeDescriptor::Pointer { pointee, .. } => TypeDescriptor::Pointer {
                pointee: pointee.clone(),
                is_const: true,
            },
            other => other.clone(),
        }
    }

    /// Strips every pointer layer.
    pub fn innermost(&self) -> &TypeDescriptor {
        let mut ty = self;
        while let TypeDescriptor::Pointer { pointee, .. } = ty {
            ty = pointee;
        }
        ty
    }

    /// C spelling of the type, e.g. `const char **`.
    pub fn canonical_name(&self) -> String {
        match self {
            TypeDescriptor::Bool => "gboolean".into(),
            TypeDescriptor::Char { signed: true } => "char".into(),
            TypeDescriptor::Char { signed: false } => "unsigned char".into(),
            TypeDescriptor::Int { width, signed } => {
                let prefix = if *signed { "gint" } else { "guint" };
                format!("{prefix}{}", width.bits())
            }
            TypeDescriptor::Long { signed: true } => "long".into(),
            TypeDescriptor::Long { signed: false } => "unsigned long".into(),
            TypeDescriptor::Float => "float".into(),
            TypeDescriptor::Double => "double".into(),
            TypeDescriptor::LongDouble => "long double".into(),
            TypeDescriptor::Pointer { pointee, is_const } => {
                let mut inner = pointee.canonical_name();
                if *is_const {
                    if pointee.is_pointer() {
                        inner.push_str(" const");
                    } else {
                        inner = format!("const {inner}");
                    }
                }
                if inner.ends_with('*') {
                    inner.push('*');
                } else {
                    inner.push_str(" *");
                }
                inner
            }
            TypeDescriptor::Named(name) => name.clone(),
            TypeDescriptor::Unknown => "void".into(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// One call argument as extracted from the caller's expression tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    pub ty: TypeDescriptor,
    pub is_null_constant: bool,
    /// Value of the argument when it is an integer constant expression.
    pub integer_constant: Option<i128>,
}

impl ArgumentDescriptor {
    pub fn of_type(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            is_null_constant: false,
            integer_constant: None,
        }
    }

    pub fn null() -> Self {
        Self {
            ty: TypeDescriptor::pointer_to(TypeDescriptor::Unknown),
            is_null_constant: true,
            integer_constant: None,
        }
    }

    /// An integer constant; `0` doubles as a null pointer constant, as in C.
    pub fn integer(ty: TypeDescriptor, value: i128) -> Self {
        Self {
            ty,
            is_null_constant: value == 0,
            integer_constant: Some(value),
        }
    }

    pub fn is_nonneg_integer_constant(&self) -> bool {
        matches!(self.integer_constant, Some(value) if value >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_c_spellings() {
        let const_str = TypeDescriptor::const_pointer_to(TypeDescriptor::char());
        assert_eq!(const_str.canonical_name(), "const char *");
        assert_eq!(
            TypeDescriptor::pointer_to(const_str.clone()).canonical_name(),
            "const char **"
        );
        assert_eq!(
            TypeDescriptor::const_pointer_to(const_str).canonical_name(),
            "const char * const *"
        );
        assert_eq!(
            TypeDescriptor::pointer_to(TypeDescriptor::named("GVariant")).canonical_name(),
            "GVariant *"
        );
    }

    #[test]
    fn const_pointee_only_touches_pointers() {
        let ty = TypeDescriptor::pointer_to(TypeDescriptor::char());
        assert_eq!(
            ty.with_const_pointee(),
            TypeDescriptor::const_pointer_to(TypeDescriptor::char())
        );
        assert_eq!(TypeDescriptor::Double.with_const_pointee(), TypeDescriptor::Double);
    }

    #[test]
    fn unsigned_counterpart_keeps_the_width() {
        assert_eq!(
            TypeDescriptor::int(IntWidth::W32, true).to_unsigned(),
            TypeDescriptor::int(IntWidth::W32, false)
        );
        assert_eq!(
            TypeDescriptor::Long { signed: true }.to_unsigned(),
            TypeDescriptor::Long { signed: false }
        );
        assert_eq!(TypeDescriptor::Double.to_unsigned(), TypeDescriptor::Double);
    }

    #[test]
    fn zero_literal_is_a_null_constant() {
        let zero = ArgumentDescriptor::integer(TypeDescriptor::int(IntWidth::W32, true), 0);
        assert!(zero.is_null_constant);
        assert!(zero.is_nonneg_integer_constant());
        let negative = ArgumentDescriptor::integer(TypeDescriptor::int(IntWidth::W32, true), -4);
        assert!(!negative.is_null_constant);
        assert!(!negative.is_nonneg_integer_constant());
    }
}
