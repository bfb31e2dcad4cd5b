//! Compiler configuration loaded from TOML.
//!
//! ```toml
//! max_depth = 64
//! param_prefix = "param"
//! variable_prefix = "this"
//!
//! [features]
//! string_ordering = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default nesting limit for filter inputs.
///
/// Every level costs several stack frames of recursion; at this depth a
/// compile fits in a 2 MiB thread stack in unoptimized builds too.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Operators that are disabled unless explicitly enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterFeatures {
    /// `LT`/`LTE`/`GT`/`GTE` on `String` fields.
    pub string_ordering: bool,
    /// `MATCHES` on `String` fields.
    pub string_matches: bool,
    /// `MATCHES` on `ID` fields.
    pub id_matches: bool,
}

/// Settings shared by every compilation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum nesting of combinators and nested filters.
    pub max_depth: usize,
    /// Prefix of generated parameter names.
    pub param_prefix: String,
    /// Prefix of generated variable names.
    pub variable_prefix: String,
    /// Feature-gated operators.
    pub features: FilterFeatures,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            param_prefix: "param".to_string(),
            variable_prefix: "this".to_string(),
            features: FilterFeatures::default(),
        }
    }
}

impl CompilerConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: None,
            source,
        })
    }

    /// Loads the configuration at `explicit`, falling back to the default
    /// location. Missing files yield the defaults.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let Some(path) = explicit.or_else(default_config_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        read_file(&path)
    }
}

fn read_file(path: &Path) -> Result<CompilerConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: Some(path.to_path_buf()),
        source,
    })
}

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The document is not valid TOML for [`CompilerConfig`].
    #[error("failed to parse config{}: {source}", display_path(.path))]
    Parse {
        /// Offending path, when loaded from disk.
        path: Option<PathBuf>,
        /// Underlying parse error.
        source: toml::de::Error,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// `$CONFIG_DIR/sombra/where.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("sombra").join("where.toml"))
}
