//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::BundledDependency;

/// Amalgamation generator configuration
///
/// Relative paths are resolved against the directory the generator runs in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory scanned for external includes
    pub include_root: PathBuf,

    /// Library directory copied into the scratch tree
    pub library_dir: PathBuf,

    /// Entry header, relative to `library_dir`
    pub entry_header: PathBuf,

    /// File extensions treated as headers
    pub header_extensions: Vec<String>,

    /// Guard patcher configuration
    pub patch: PatchConfig,

    /// Preprocessor configuration
    pub engine: EngineConfig,

    /// Optional dependencies emitted behind feature flags
    pub bundled: Vec<BundledDependency>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            include_root: PathBuf::from("include"),
            library_dir: PathBuf::from("include/plywoot"),
            entry_header: PathBuf::from("plywoot.hpp"),
            header_extensions: vec!["hpp".into(), "h".into()],
            patch: PatchConfig::default(),
            engine: EngineConfig::default(),
            bundled: vec![
                BundledDependency::new("fast_float/fast_float.h", "PLYWOOT_USE_FAST_FLOAT"),
                BundledDependency::new("fast_int/fast_int.hpp", "PLYWOOT_USE_FAST_INT"),
            ],
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file; absent fields keep their defaults
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Re-anchor every relative path at `root`
    pub fn rooted_at(mut self, root: &Path) -> Self {
        if self.include_root.is_relative() {
            self.include_root = root.join(&self.include_root);
        }
        if self.library_dir.is_relative() {
            self.library_dir = root.join(&self.library_dir);
        }
        self
    }
}

/// Conditional-guard patcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// File whose feature-detection directives are neutralized, relative to
    /// the library directory
    pub designated_file: PathBuf,

    /// Text marking the point where feature-detection directives begin
    pub scope_marker: String,

    /// Prefix that turns a directive line into plain content
    pub comment_prefix: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            designated_file: PathBuf::from("plywoot/std.hpp"),
            scope_marker: "namespace".into(),
            comment_prefix: "//".into(),
        }
    }
}

/// Preprocessor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Explicit preprocessor executable; auto-detected when unset
    pub program: Option<PathBuf>,

    /// Additional arguments passed before the entry header
    pub extra_args: Vec<String>,
}
