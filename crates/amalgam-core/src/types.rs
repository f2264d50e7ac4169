//! Core type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// How an include directive names its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncludeStyle {
    /// `#include "path"`, resolved inside the library tree
    Internal,
    /// `#include <path>`, resolved against the surrounding environment
    External,
}

/// An include directive found while scanning a header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncludeDirective {
    /// Header the directive was found in
    pub source_file: PathBuf,
    /// Path between the delimiters
    pub path: String,
    /// Quoted or angle-bracket form
    pub style: IncludeStyle,
}

impl IncludeDirective {
    pub fn new(source_file: impl Into<PathBuf>, path: impl Into<String>, style: IncludeStyle) -> Self {
        Self {
            source_file: source_file.into(),
            path: path.into(),
            style,
        }
    }

    pub fn is_external(&self) -> bool {
        self.style == IncludeStyle::External
    }
}

/// An optional external integration that the amalgamation offers behind a
/// feature flag instead of including unconditionally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundledDependency {
    /// Include path, e.g. `fast_float/fast_float.h`
    pub path: String,
    /// Macro guarding the include in the amalgamated header
    pub feature_flag: String,
}

impl BundledDependency {
    pub fn new(path: impl Into<String>, feature_flag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            feature_flag: feature_flag.into(),
        }
    }

    /// Render the guarded include block
    pub fn guarded_include(&self) -> String {
        format!(
            "#ifdef {}\n#include <{}>\n#endif",
            self.feature_flag, self.path
        )
    }
}

/// Unique external include paths of a library, without its bundled optional
/// dependencies. Iteration order is lexicographic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalDependencySet {
    paths: BTreeSet<String>,
}

impl ExternalDependencySet {
    /// Build the set from everything discovered in the tree.
    ///
    /// Every bundled dependency must be present in `discovered`; the library
    /// is expected to reference each of its optional integrations somewhere.
    pub fn from_discovered(
        mut discovered: BTreeSet<String>,
        bundled: &[BundledDependency],
    ) -> Result<Self> {
        for dep in bundled {
            if !discovered.remove(&dep.path) {
                return Err(Error::MissingBundledDependency {
                    path: dep.path.clone(),
                });
            }
        }

        Ok(Self { paths: discovered })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// One `#include <...>` line per dependency
    pub fn include_lines(&self) -> Vec<String> {
        self.iter().map(|path| format!("#include <{}>", path)).collect()
    }
}
