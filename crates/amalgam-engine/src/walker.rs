//! Source Tree Walker
//!
//! Discovers the headers of a library and the include directives they contain.

use amalgam_core::{
    BundledDependency, Error, ExternalDependencySet, IncludeDirective, IncludeStyle, Result,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};
use walkdir::WalkDir;

fn include_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*(?:<([^>\n]+)>|"([^"\n]+)")"#)
            .expect("valid include regex")
    })
}

/// Extract all include directives from a header's text
pub fn scan_includes(source_file: &Path, text: &str) -> Vec<IncludeDirective> {
    include_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            if let Some(path) = caps.get(1) {
                Some(IncludeDirective::new(source_file, path.as_str().trim(), IncludeStyle::External))
            } else {
                caps.get(2).map(|path| {
                    IncludeDirective::new(source_file, path.as_str().trim(), IncludeStyle::Internal)
                })
            }
        })
        .collect()
}

/// Walks the header files below a library root
pub struct SourceTreeWalker {
    root: PathBuf,
    extensions: Vec<String>,
}

impl SourceTreeWalker {
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.to_vec(),
        }
    }

    fn is_header(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    /// All header files below the root, sorted by path
    pub fn headers(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::Walk(format!(
                "library root {} is not a directory",
                self.root.display()
            )));
        }

        let mut headers = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Walk(e.to_string()))?;
            if entry.file_type().is_file() && self.is_header(entry.path()) {
                headers.push(entry.into_path());
            }
        }

        info!("Found {} headers below {}", headers.len(), self.root.display());
        Ok(headers)
    }

    /// Every include directive of every header
    pub fn include_directives(&self) -> Result<Vec<IncludeDirective>> {
        let mut directives = Vec::new();
        for header in self.headers()? {
            let text = std::fs::read_to_string(&header)?;
            let found = scan_includes(&header, &text);
            debug!("{}: {} include directives", header.display(), found.len());
            directives.extend(found);
        }
        Ok(directives)
    }

    /// Unique angle-bracket include paths referenced anywhere in the tree
    pub fn external_references(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .include_directives()?
            .into_iter()
            .filter(IncludeDirective::is_external)
            .map(|d| d.path)
            .collect())
    }

    /// External references minus the bundled optional dependencies
    pub fn external_dependencies(
        &self,
        bundled: &[BundledDependency],
    ) -> Result<ExternalDependencySet> {
        ExternalDependencySet::from_discovered(self.external_references()?, bundled)
    }
}
