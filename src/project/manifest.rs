use crate::{
    language::{
        catalog::TypeCatalog,
        errors::SyntaxError,
        parser::parse_type,
        typecheck::{Direction, FormatChecker, FunctionSignature, SignatureTable, TypecheckOptions},
        types::TypeDescriptor,
    },
    target::BuildTarget,
};
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use toml::Value;

pub const MANIFEST_FILE_NAME: &str = "gvariant-check.toml";

/// Checker configuration read from `gvariant-check.toml`.
#[derive(Debug, Default)]
pub struct CheckerManifest {
    pub path: PathBuf,
    pub triple: Option<String>,
    /// Replaces the default list when present.
    pub unstable_aliases: Option<Vec<String>>,
    pub aliases: Vec<(String, TypeDescriptor)>,
    pub functions: Vec<FunctionSignature>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid type alias `{name}`: {source}")]
    InvalidAlias {
        name: String,
        #[source]
        source: SyntaxError,
    },
    #[error("invalid function entry: {message}")]
    InvalidFunction {
        function: Option<String>,
        message: String,
    },
}

#[derive(Deserialize)]
struct RawFunctionEntry {
    name: String,
    format_param: usize,
    first_vararg: usize,
    va_list: Option<bool>,
    direction: Option<String>,
}

impl CheckerManifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|error| ManifestError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, ManifestError> {
        let parse_error = |message: String| ManifestError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let value: Value = toml::from_str(content).map_err(|error| parse_error(error.to_string()))?;

        let triple = match value.get("target").and_then(|target| target.get("triple")) {
            Some(Value::String(triple)) => Some(triple.clone()),
            Some(other) => return Err(parse_error(format!("`target.triple` must be a string, found {other}"))),
            None => None,
        };

        let unstable_aliases = match value
            .get("architecture")
            .and_then(|arch| arch.get("unstable_aliases"))
        {
            Some(list) => {
                let aliases: Vec<String> = list.clone().try_into().map_err(|error| {
                    parse_error(format!("`architecture.unstable_aliases`: {error}"))
                })?;
                Some(aliases)
            }
            None => None,
        };

        let mut aliases = Vec::new();
        match value.get("types") {
            Some(Value::Table(table)) => {
                for (name, spelling) in table {
                    let Some(spelling) = spelling.as_str() else {
                        return Err(parse_error(format!("type alias `{name}` must be a type spelling string")));
                    };
                    let ty = parse_type(spelling).map_err(|source| ManifestError::InvalidAlias {
                        name: name.clone(),
                        source,
                    })?;
                    aliases.push((name.clone(), ty));
                }
            }
            Some(other) => return Err(parse_error(format!("`types` must be a table, found {other}"))),
            None => {}
        }

        let mut functions = Vec::new();
        if let Some(entries) = value.get("function") {
            let Value::Array(entries) = entries else {
                return Err(parse_error("`function` must be an array of tables".into()));
            };
            for item in entries {
                let raw: RawFunctionEntry =
                    item.clone()
                        .try_into()
                        .map_err(|error| ManifestError::InvalidFunction {
                            function: None,
                            message: error.to_string(),
                        })?;
                functions.push(build_signature(raw)?);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            triple,
            unstable_aliases,
            aliases,
            functions,
        })
    }

    /// The build target: `flag`, then the environment, then the manifest.
    pub fn resolve_target(&self, flag: Option<String>) -> BuildTarget {
        match BuildTarget::from_flag_or_env(flag) {
            BuildTarget::Host => self
                .triple
                .clone()
                .map_or(BuildTarget::Host, BuildTarget::Triple),
            explicit => explicit,
        }
    }

    /// GLib tables extended with this manifest's entries.
    pub fn checker(&self, target: BuildTarget) -> FormatChecker {
        let mut catalog = TypeCatalog::glib_for(target.data_model());
        for (name, ty) in &self.aliases {
            catalog.insert(name.clone(), ty.clone());
        }
        let mut signatures = SignatureTable::glib();
        for signature in &self.functions {
            signatures.insert(signature.clone());
        }
        let mut options = TypecheckOptions {
            target,
            ..TypecheckOptions::default()
        };
        if let Some(aliases) = &self.unstable_aliases {
            options.unstable_aliases = aliases.clone();
        }
        log::debug!(
            "Configured checker for {:?} with {} extra aliases and {} extra functions.",
            options.target,
            self.aliases.len(),
            self.functions.len()
        );
        FormatChecker::new(catalog, signatures, options)
    }
}

fn build_signature(raw: RawFunctionEntry) -> Result<FunctionSignature, ManifestError> {
    let invalid = |message: String| ManifestError::InvalidFunction {
        function: Some(raw.name.clone()),
        message: format!("`{}`: {message}", raw.name),
    };
    if raw.first_vararg <= raw.format_param {
        return Err(invalid(format!(
            "first_vararg ({}) must come after format_param ({})",
            raw.first_vararg, raw.format_param
        )));
    }
    let direction = parse_direction(raw.direction.as_deref()).map_err(invalid)?;
    Ok(FunctionSignature::new(
        raw.name.clone(),
        raw.format_param,
        raw.first_vararg,
        raw.va_list.unwrap_or(false),
        direction,
    ))
}

fn parse_direction(value: Option<&str>) -> Result<Direction, String> {
    match value {
        None | Some("in") => Ok(Direction::In),
        Some("out") => Ok(Direction::Out),
        Some(other) => Err(format!("invalid direction `{other}` (expected in|out)")),
    }
}

/// Looks for the manifest in `start` (or its directory) and every ancestor.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut current = if start.is_dir() {
        start.to_path_buf()
    } else {
        start
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    };
    loop {
        let candidate = current.join(MANIFEST_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            break;
        }
    }
    None
}
