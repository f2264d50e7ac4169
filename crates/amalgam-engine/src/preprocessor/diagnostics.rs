//! Preprocessor diagnostics classification
//!
//! With standard search paths disabled every angle-bracket include fails to
//! resolve. Those failures are expected; a failure for any other header means
//! the library tree itself is broken.

use regex::Regex;
use std::sync::OnceLock;

fn missing_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // GCC: `fatal error: lib/x.hpp: No such file or directory`
        // GCC with -nostdinc: `error: no include path in which to search for vector`
        // Clang: `fatal error: 'vector' file not found`
        Regex::new(
            r"error: (?:(\S+): No such file or directory|'([^']+)' file not found|no include path in which to search for (\S+))",
        )
        .expect("valid diagnostic regex")
    })
}

/// Diagnostics split by cause
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    /// Missing headers that are known external references
    pub expected_misses: Vec<String>,
    /// Missing headers that are not external references
    pub unexpected_misses: Vec<String>,
    /// Everything else
    pub other: Vec<String>,
}

impl DiagnosticReport {
    /// No header outside the external references went missing
    pub fn is_clean(&self) -> bool {
        self.unexpected_misses.is_empty()
    }
}

/// Sort preprocessor diagnostics, using `is_external` to decide which
/// missing headers are expected
pub fn classify_diagnostics(
    diagnostics: &[String],
    is_external: impl Fn(&str) -> bool,
) -> DiagnosticReport {
    let mut report = DiagnosticReport::default();

    for line in diagnostics {
        let missing = missing_header_regex()
            .captures(line)
            .and_then(|caps| caps.iter().skip(1).flatten().next())
            .map(|m| m.as_str().to_string());

        match missing {
            Some(header) if is_external(&header) => report.expected_misses.push(header),
            Some(header) => report.unexpected_misses.push(header),
            None => report.other.push(line.clone()),
        }
    }

    report
}
