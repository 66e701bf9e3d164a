use crate::language::types::IntWidth;
use std::{env, mem};

pub const TARGET_ENV: &str = "GVCHECK_TARGET";

/// Target whose C ABI the checked code is compiled for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BuildTarget {
    #[default]
    Host,
    Triple(String),
}

/// C data model: the widths of `int`, `long` and pointers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataModel {
    Ilp32,
    Lp64,
    Llp64,
}

impl DataModel {
    pub fn long_width(self) -> IntWidth {
        match self {
            DataModel::Lp64 => IntWidth::W64,
            DataModel::Ilp32 | DataModel::Llp64 => IntWidth::W32,
        }
    }

    /// Width of pointer-sized integers such as `gsize` and `intptr_t`.
    pub fn pointer_width(self) -> IntWidth {
        match self {
            DataModel::Ilp32 => IntWidth::W32,
            DataModel::Lp64 | DataModel::Llp64 => IntWidth::W64,
        }
    }
}

const THIRTY_TWO_BIT_ARCHES: &[&str] = &[
    "i386", "i486", "i586", "i686", "arm", "armv7", "thumbv7", "riscv32", "wasm32", "mips",
    "mipsel", "powerpc", "xtensa",
];

impl BuildTarget {
    pub fn host() -> Self {
        Self::Host
    }

    pub fn from_flag_or_env(flag: Option<String>) -> Self {
        let target = flag
            .or_else(|| env::var(TARGET_ENV).ok())
            .filter(|t| !t.trim().is_empty());
        match target {
            Some(triple) => Self::Triple(triple),
            None => Self::Host,
        }
    }

    pub fn triple(&self) -> Option<&str> {
        match self {
            BuildTarget::Host => None,
            BuildTarget::Triple(triple) => Some(triple),
        }
    }

    pub fn data_model(&self) -> DataModel {
        match self {
            BuildTarget::Host => {
                if cfg!(windows) {
                    DataModel::Llp64
                } else if mem::size_of::<usize>() == 4 {
                    DataModel::Ilp32
                } else {
                    DataModel::Lp64
                }
            }
            BuildTarget::Triple(triple) => {
                let arch = triple.split('-').next().unwrap_or_default();
                if THIRTY_TWO_BIT_ARCHES.contains(&arch) {
                    DataModel::Ilp32
                } else if triple.contains("windows") {
                    DataModel::Llp64
                } else {
                    DataModel::Lp64
                }
            }
        }
    }

    pub fn long_width(&self) -> IntWidth {
        self.data_model().long_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triples_select_data_models() {
        let lp64 = BuildTarget::Triple("x86_64-unknown-linux-gnu".into());
        assert_eq!(lp64.data_model(), DataModel::Lp64);
        assert_eq!(lp64.long_width(), IntWidth::W64);

        let llp64 = BuildTarget::Triple("x86_64-pc-windows-msvc".into());
        assert_eq!(llp64.long_width(), IntWidth::W32);

        let ilp32 = BuildTarget::Triple("i686-unknown-linux-gnu".into());
        assert_eq!(ilp32.data_model(), DataModel::Ilp32);
        assert_eq!(ilp32.data_model().pointer_width(), IntWidth::W32);
        assert_eq!(llp64.data_model().pointer_width(), IntWidth::W64);
    }

    #[test]
    fn explicit_flag_wins() {
        let target = BuildTarget::from_flag_or_env(Some("aarch64-apple-darwin".into()));
        assert_eq!(target.triple(), Some("aarch64-apple-darwin"));
    }
}
