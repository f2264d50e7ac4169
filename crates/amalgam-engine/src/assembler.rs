//! Output Assembler
//!
//! Turns raw preprocessor output into the final amalgamated header. Each pass
//! is a function `&str -> String` over the whole text; the order matters, in
//! particular line markers must be stripped before patched directives are
//! restored.

use amalgam_core::{BundledDependency, Error, ExternalDependencySet, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Assembles the amalgamated header from flattened library text
#[derive(Debug, Clone)]
pub struct Assembler {
    bundled: Vec<BundledDependency>,
    restore_re: Regex,
}

impl Assembler {
    /// `comment_prefix` must match the prefix the guard patcher used
    pub fn new(bundled: Vec<BundledDependency>, comment_prefix: &str) -> Self {
        let restore_re = Regex::new(&format!(r"(?m)^{}#", regex::escape(comment_prefix)))
            .expect("escaped prefix is a valid regex");
        Self { bundled, restore_re }
    }

    /// Build the amalgamated header from `flattened` preprocessor output
    pub fn assemble(&self, flattened: &str, dependencies: &ExternalDependencySet) -> Result<String> {
        let license = find_license(flattened).ok_or(Error::LicenseNotFound)?;
        debug!("License block is {} bytes", license.len());

        let mut body = strip_line_markers(flattened);
        body = remove_license(&body, license);
        body = strip_file_tags(&body);
        body = self.restore_directives(&body);
        body = collapse_blank_lines(&body);

        Ok(self.render(license, dependencies, body.trim()))
    }

    /// Undo the guard patcher: `//#ifdef X` becomes `#ifdef X`
    fn restore_directives(&self, text: &str) -> String {
        self.restore_re.replace_all(text, "#").into_owned()
    }

    fn render(&self, license: &str, dependencies: &ExternalDependencySet, body: &str) -> String {
        let mut sections = vec![license.to_string()];

        if !dependencies.is_empty() {
            sections.push(dependencies.include_lines().join("\n"));
        }
        sections.extend(self.bundled.iter().map(BundledDependency::guarded_include));
        sections.push(body.to_string());

        let mut output = sections.join("\n\n");
        output.push('\n');
        output
    }
}

fn license_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^/\*[^*]*\*/").expect("valid license regex"))
}

/// First block comment that starts a line
fn find_license(text: &str) -> Option<&str> {
    license_regex().find(text).map(|m| m.as_str())
}

/// Blank out preprocessor line markers (`# 12 "file.hpp" 2`)
fn strip_line_markers(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?m)^#.*$").expect("valid marker regex"));
    re.replace_all(text, "").into_owned()
}

/// Remove every copy of the license block; each inlined header carries one
fn remove_license(text: &str, license: &str) -> String {
    let re = Regex::new(&format!("(?m)^{}", regex::escape(license)))
        .expect("escaped license is a valid regex");
    re.replace_all(text, "").into_owned()
}

/// Remove `/// \file` tags, which are meaningless once files are merged
fn strip_file_tags(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?m)^/// \\file.*$").expect("valid file tag regex"));
    re.replace_all(text, "").into_owned()
}

/// Collapse runs of three or more blank lines into a single blank line
fn collapse_blank_lines(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\n(?:[ \t]*\n){3,}").expect("valid blank line regex"));
    re.replace_all(text, "\n\n").into_owned()
}
