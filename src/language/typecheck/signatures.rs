use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// The call reads its variadic arguments to build a value.
    In,
    /// The call writes through its variadic arguments.
    Out,
}

/// Where a checkable function keeps its format string and variadic tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub format_param_index: usize,
    pub first_vararg_index: usize,
    /// The tail is a single `va_list` rather than individual arguments.
    pub uses_va_list: bool,
    pub direction: Direction,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        format_param_index: usize,
        first_vararg_index: usize,
        uses_va_list: bool,
        direction: Direction,
    ) -> Self {
        Self {
            name: name.into(),
            format_param_index,
            first_vararg_index,
            uses_va_list,
            direction,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignatureTable {
    functions: HashMap<String, FunctionSignature>,
}

impl SignatureTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The GLib functions taking a GVariant format string.
    pub fn glib() -> Self {
        use Direction::{In, Out};
        let mut table = Self::empty();
        for (name, format, first_vararg, va_list, direction) in [
            ("g_variant_new", 0, 1, false, In),
            ("g_variant_new_va", 0, 2, true, In),
            ("g_variant_get", 1, 2, false, Out),
            ("g_variant_get_va", 1, 3, true, Out),
            ("g_variant_get_child", 2, 3, false, Out),
            ("g_variant_lookup", 2, 3, false, Out),
            ("g_variant_iter_next", 1, 2, false, Out),
            ("g_variant_iter_loop", 1, 2, false, Out),
            ("g_variant_builder_add", 1, 2, false, In),
        ] {
            table.insert(FunctionSignature::new(
                name,
                format,
                first_vararg,
                va_list,
                direction,
            ));
        }
        table
    }

    /// Adds or replaces the entry for `signature.name`.
    pub fn insert(&mut self, signature: FunctionSignature) {
        self.functions.insert(signature.name.clone(), signature);
    }

    pub fn lookup(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
