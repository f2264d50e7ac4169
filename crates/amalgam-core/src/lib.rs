//! Amalgam Core
//!
//! Core types, configuration and errors shared by the amalgamation pipeline.

pub mod config;
pub mod error;
pub mod types;

pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use types::*;
