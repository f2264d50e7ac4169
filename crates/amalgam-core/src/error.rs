//! Error types for the amalgamation generator

use thiserror::Error;

/// Amalgamation error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk library tree: {0}")]
    Walk(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Bundled dependency `{path}` is not referenced anywhere in the library tree")]
    MissingBundledDependency { path: String },

    #[error("No license block found in preprocessor output")]
    LicenseNotFound,

    #[error("Preprocessor not found: {0}")]
    EngineNotFound(String),

    #[error("Preprocessor failed: {0}")]
    EngineFailed(String),

    #[error("Internal include could not be resolved: {header}")]
    UnresolvedInternalInclude { header: String },
}

/// Result type alias for the amalgamation generator
pub type Result<T> = std::result::Result<T, Error>;
