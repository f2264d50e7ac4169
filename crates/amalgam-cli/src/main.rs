//! Amalgam CLI
//!
//! Writes the amalgamated header of the library below the working directory
//! to standard output. Logging goes to standard error.

use amalgam_core::GeneratorConfig;
use amalgam_engine::{Amalgamator, GccPreprocessor, PreprocessOptions};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "amalgamate")]
#[command(author, version, about = "Generates an amalgamated header, written to standard output", long_about = None)]
struct Cli {
    /// YAML configuration file (defaults are used for absent fields)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the library paths are relative to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Preprocessor executable (auto-detected by default)
    #[arg(short, long, value_name = "PROGRAM")]
    engine: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(engine) = &cli.engine {
        config.engine.program = Some(engine.clone());
    }
    Ok(config.rooted_at(&cli.root))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;

    let options = PreprocessOptions {
        extra_args: config.engine.extra_args.clone(),
        ..PreprocessOptions::default()
    };
    let engine = match &config.engine.program {
        Some(program) => GccPreprocessor::with_path(program.clone(), options),
        None => GccPreprocessor::new(options)?,
    };
    info!("Using preprocessor {}", engine.program().display());

    let header = Amalgamator::new(config, engine)
        .generate()
        .context("Failed to generate amalgamation")?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(header.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
