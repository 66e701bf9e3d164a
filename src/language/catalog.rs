use crate::{
    language::types::{IntWidth, TypeDescriptor},
    target::{BuildTarget, DataModel},
};
use std::collections::HashMap;

pub const VARIANT: &str = "GVariant";
pub const VARIANT_BUILDER: &str = "GVariantBuilder";
pub const VARIANT_ITER: &str = "GVariantIter";
pub const VA_LIST: &str = "va_list";

/// Alias chains longer than this are treated as unresolvable.
const MAX_ALIAS_DEPTH: usize = 16;

/// Name → type table for the platform and library typedefs the checker knows
/// about. Names missing from the table are opaque and resolve to themselves.
#[derive(Clone, Debug, Default)]
pub struct TypeCatalog {
    aliases: HashMap<String, TypeDescriptor>,
}

impl TypeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The GLib and `<stdint.h>` typedefs for the host.
    pub fn glib() -> Self {
        Self::glib_for(BuildTarget::host().data_model())
    }

    /// The GLib and `<stdint.h>` typedefs, with pointer-sized integers as
    /// wide as pointers under `model`.
    pub fn glib_for(model: DataModel) -> Self {
        use TypeDescriptor as T;
        let pointer_width = model.pointer_width();
        let mut catalog = Self::empty();
        let entries = [
            ("gboolean", T::Bool),
            ("gchar", T::char()),
            ("guchar", T::Char { signed: false }),
            ("gint8", T::char()),
            ("guint8", T::Char { signed: false }),
            ("gshort", T::int(IntWidth::W16, true)),
            ("gushort", T::int(IntWidth::W16, false)),
            ("gint", T::int(IntWidth::W32, true)),
            ("guint", T::int(IntWidth::W32, false)),
            ("gint16", T::int(IntWidth::W16, true)),
            ("guint16", T::int(IntWidth::W16, false)),
            ("gint32", T::int(IntWidth::W32, true)),
            ("guint32", T::int(IntWidth::W32, false)),
            ("gunichar", T::int(IntWidth::W32, false)),
            ("gint64", T::int(IntWidth::W64, true)),
            ("guint64", T::int(IntWidth::W64, false)),
            ("goffset", T::int(IntWidth::W64, true)),
            ("gssize", T::int(pointer_width, true)),
            ("gsize", T::int(pointer_width, false)),
            ("gintptr", T::int(pointer_width, true)),
            ("guintptr", T::int(pointer_width, false)),
            ("glong", T::Long { signed: true }),
            ("gulong", T::Long { signed: false }),
            ("gfloat", T::Float),
            ("gdouble", T::Double),
            ("gpointer", T::pointer_to(T::Unknown)),
            ("gconstpointer", T::const_pointer_to(T::Unknown)),
            ("int8_t", T::char()),
            ("uint8_t", T::Char { signed: false }),
            ("int16_t", T::int(IntWidth::W16, true)),
            ("uint16_t", T::int(IntWidth::W16, false)),
            ("int32_t", T::int(IntWidth::W32, true)),
            ("uint32_t", T::int(IntWidth::W32, false)),
            ("int64_t", T::int(IntWidth::W64, true)),
            ("uint64_t", T::int(IntWidth::W64, false)),
            ("intptr_t", T::int(pointer_width, true)),
            ("uintptr_t", T::int(pointer_width, false)),
            ("ssize_t", T::int(pointer_width, true)),
            ("size_t", T::int(pointer_width, false)),
        ];
        for (name, ty) in entries {
            catalog.insert(name, ty);
        }
        catalog
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: TypeDescriptor) {
        self.aliases.insert(name.into(), ty);
    }

    /// Resolves `name` through the alias table, following alias chains.
    pub fn resolve_named_type(&self, name: &str) -> TypeDescriptor {
        self.canonicalize(&TypeDescriptor::named(name))
    }

    pub fn resolve_pointer_to_named_type(&self, name: &str) -> TypeDescriptor {
        TypeDescriptor::pointer_to(self.resolve_named_type(name))
    }

    /// Replaces every known alias inside `ty` by its target, keeping pointer
    /// qualifiers.
    pub fn canonicalize(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        self.canonicalize_bounded(ty, 0)
    }

    fn canonicalize_bounded(&self, ty: &TypeDescriptor, depth: usize) -> TypeDescriptor {
        match ty {
            TypeDescriptor::Named(name) if depth < MAX_ALIAS_DEPTH => match self.aliases.get(name) {
                Some(target) => self.canonicalize_bounded(target, depth + 1),
                None => ty.clone(),
            },
            TypeDescriptor::Pointer { pointee, is_const } => TypeDescriptor::Pointer {
                pointee: Box::new(self.canonicalize_bounded(pointee, depth)),
                is_const: *is_const,
            },
            other => other.clone(),
        }
    }
}
