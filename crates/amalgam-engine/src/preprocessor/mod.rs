//! Preprocessor Integration
//!
//! Drives an external C/C++ preprocessor to inline the library's internal
//! includes. The preprocessor is reached through the [`InclusionEngine`] port
//! so the pipeline can run against a fake in tests.

pub mod diagnostics;
pub mod gcc;

use std::path::Path;

pub use diagnostics::{classify_diagnostics, DiagnosticReport};
pub use gcc::{GccPreprocessor, PreprocessError, PreprocessOptions};

/// Raw result of flattening the entry header
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Flattened text (the preprocessor's standard output)
    pub text: String,
    /// Diagnostic lines (the preprocessor's standard error)
    pub diagnostics: Vec<String>,
}

/// A macro-expansion/inclusion engine
pub trait InclusionEngine {
    /// Inline every resolvable include reachable from `entry`
    fn flatten(&self, entry: &Path) -> Result<EngineOutput, PreprocessError>;

    /// Engine name, used in log messages
    fn name(&self) -> &str;
}
