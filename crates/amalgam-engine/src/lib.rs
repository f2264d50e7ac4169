//! Amalgam Engine
//!
//! Builds a single amalgamated header out of a multi-file header-only library.
//!
//! ## Modules
//!
//! - `walker` - Discovers headers and their external include references
//! - `patcher` - Hides feature-detection directives from the preprocessor
//! - `preprocessor` - Drives an external preprocessor to inline internal includes
//! - `assembler` - Post-processes the preprocessor output into the final header
//! - `pipeline` - Runs the stages above in order

pub mod assembler;
pub mod patcher;
pub mod pipeline;
pub mod preprocessor;
pub mod walker;

pub use assembler::Assembler;
pub use patcher::{patch_guards, PatchedTree};
pub use pipeline::Amalgamator;
pub use preprocessor::{EngineOutput, GccPreprocessor, InclusionEngine, PreprocessOptions};
pub use walker::SourceTreeWalker;
