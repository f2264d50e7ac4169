//! GCC Preprocessor Integration
//!
//! Wraps `g++ -E` (or a compatible driver such as `clang++`) as an
//! [`InclusionEngine`]. Standard search paths are disabled so that only the
//! library's own quoted includes resolve.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

use super::{EngineOutput, InclusionEngine};

/// Errors that can occur while invoking the preprocessor
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("No preprocessor found (tried: {0})")]
    NotFound(String),

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid source file: {0}")]
    InvalidSource(String),

    #[error("Preprocessor output is not valid UTF-8: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

impl From<PreprocessError> for amalgam_core::Error {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::NotFound(_) => amalgam_core::Error::EngineNotFound(err.to_string()),
            PreprocessError::Launch { .. } => amalgam_core::Error::EngineNotFound(err.to_string()),
            PreprocessError::InvalidSource(_) | PreprocessError::InvalidOutput(_) => {
                amalgam_core::Error::EngineFailed(err.to_string())
            }
        }
    }
}

/// Options for preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    /// Keep comments, including those inside macro bodies (`-CC`)
    pub keep_comments: bool,
    /// Generate line markers; when disabled `-P` is passed
    pub line_markers: bool,
    /// Disable the default C and C++ search paths
    pub no_std_includes: bool,
    /// Additional arguments
    pub extra_args: Vec<String>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            keep_comments: true,
            line_markers: true,
            no_std_includes: true,
            extra_args: Vec::new(),
        }
    }
}

/// GCC-compatible preprocessor driver
pub struct GccPreprocessor {
    program: PathBuf,
    options: PreprocessOptions,
}

impl GccPreprocessor {
    const CANDIDATES: &'static [&'static str] = &[
        "/usr/bin/g++",
        "g++",
        "/usr/local/bin/g++",
        "clang++",
        "/usr/bin/clang++",
        "/opt/homebrew/bin/g++",
    ];

    /// Create a preprocessor, auto-detecting the executable
    pub fn new(options: PreprocessOptions) -> Result<Self, PreprocessError> {
        let program = Self::find_program()?;
        debug!("Found preprocessor at: {:?}", program);
        Ok(Self { program, options })
    }

    /// Create a preprocessor with a specific executable
    pub fn with_path(program: PathBuf, options: PreprocessOptions) -> Self {
        Self { program, options }
    }

    fn find_program() -> Result<PathBuf, PreprocessError> {
        for candidate in Self::CANDIDATES {
            if let Ok(output) = Command::new(candidate).arg("--version").output() {
                if output.status.success() {
                    return Ok(PathBuf::from(candidate));
                }
            }
        }

        Err(PreprocessError::NotFound(Self::CANDIDATES.join(", ")))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build command line arguments, excluding the input file
    fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-E".to_string()];

        if self.options.keep_comments {
            args.push("-CC".to_string());
        }
        if !self.options.line_markers {
            args.push("-P".to_string());
        }
        if self.options.no_std_includes {
            args.push("-nostdinc".to_string());
            args.push("-nostdinc++".to_string());
        }

        args.extend(self.options.extra_args.iter().cloned());
        args
    }
}

/// The flattened text must survive byte-for-byte, so it is never decoded lossily
fn decode_output(stdout: Vec<u8>) -> Result<String, PreprocessError> {
    Ok(String::from_utf8(stdout)?)
}

impl InclusionEngine for GccPreprocessor {
    fn flatten(&self, entry: &Path) -> Result<EngineOutput, PreprocessError> {
        if !entry.is_file() {
            return Err(PreprocessError::InvalidSource(format!(
                "File not found: {}",
                entry.display()
            )));
        }

        let args = self.build_args();
        debug!("Preprocessing {:?} with args: {:?}", entry, args);

        let output = Command::new(&self.program)
            .args(&args)
            .arg(entry)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => PreprocessError::NotFound(self.program.display().to_string()),
                _ => PreprocessError::Launch {
                    program: self.program.display().to_string(),
                    source,
                },
            })?;

        // Unresolved angle-bracket includes make the preprocessor exit with an
        // error status; the caller classifies the diagnostics instead.
        debug!("Preprocessor exited with {}", output.status);

        Ok(EngineOutput {
            text: decode_output(output.stdout)?,
            diagnostics: String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_string)
                .collect(),
        })
    }

    fn name(&self) -> &str {
        self.program.to_str().unwrap_or("preprocessor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let preprocessor = GccPreprocessor::with_path(PathBuf::from("g++"), PreprocessOptions::default());
        let args = preprocessor.build_args();

        assert_eq!(args, vec!["-E", "-CC", "-nostdinc", "-nostdinc++"]);
    }

    #[test]
    fn test_build_args_without_markers() {
        let options = PreprocessOptions {
            keep_comments: false,
            line_markers: false,
            no_std_includes: false,
            extra_args: vec!["-DLIB_AMALGAMATION".to_string()],
        };
        let preprocessor = GccPreprocessor::with_path(PathBuf::from("g++"), options);

        assert_eq!(preprocessor.build_args(), vec!["-E", "-P", "-DLIB_AMALGAMATION"]);
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let entry = dir.path().join("lib.hpp");
        std::fs::write(&entry, "int x;\n").unwrap();

        let preprocessor = GccPreprocessor::with_path(
            PathBuf::from("/nonexistent/bin/g++"),
            PreprocessOptions::default(),
        );

        assert!(matches!(preprocessor.flatten(&entry), Err(PreprocessError::NotFound(_))));
    }

    #[test]
    fn test_missing_entry_is_invalid_source() {
        let preprocessor = GccPreprocessor::with_path(PathBuf::from("g++"), PreprocessOptions::default());
        let result = preprocessor.flatten(Path::new("/nonexistent/lib.hpp"));
        assert!(matches!(result, Err(PreprocessError::InvalidSource(_))));
    }

    #[test]
    fn test_error_conversion() {
        let err: amalgam_core::Error = PreprocessError::NotFound("g++".into()).into();
        assert!(matches!(err, amalgam_core::Error::EngineNotFound(_)));
    }

    #[test]
    fn test_decode_output() {
        assert_eq!(decode_output(b"int x;\n".to_vec()).unwrap(), "int x;\n");
    }

    #[test]
    fn test_invalid_utf8_output_is_engine_failure() {
        let result = decode_output(vec![b'i', b'n', b't', 0xff, 0xfe]);
        assert!(matches!(result, Err(PreprocessError::InvalidOutput(_))));

        let err: amalgam_core::Error = result.unwrap_err().into();
        assert!(matches!(err, amalgam_core::Error::EngineFailed(_)));
    }
}
