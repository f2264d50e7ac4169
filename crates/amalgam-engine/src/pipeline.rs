//! End-to-end amalgamation: walk the library, patch the guards, run the
//! preprocessor, then assemble the single header.

use amalgam_core::{Error, GeneratorConfig, Result};
use tracing::{debug, info, instrument, warn};

use crate::assembler::Assembler;
use crate::patcher::PatchedTree;
use crate::preprocessor::{classify_diagnostics, InclusionEngine};
use crate::walker::SourceTreeWalker;

/// Generates the amalgamated header for one library
pub struct Amalgamator<E> {
    config: GeneratorConfig,
    engine: E,
}

impl<E: InclusionEngine> Amalgamator<E> {
    /// `config` paths should already be anchored (see [`GeneratorConfig::rooted_at`])
    pub fn new(config: GeneratorConfig, engine: E) -> Self {
        Self { config, engine }
    }

    /// Run the full pipeline and return the amalgamated header text.
    ///
    /// Nothing is written to the library tree; the patched copy lives in a
    /// scratch directory that is removed before this returns.
    #[instrument(skip_all, fields(library = %self.config.library_dir.display()))]
    pub fn generate(&self) -> Result<String> {
        let bundled = &self.config.bundled;
        let walker = SourceTreeWalker::new(&self.config.include_root, &self.config.header_extensions);
        let dependencies = walker.external_dependencies(bundled)?;
        info!("{} external dependencies", dependencies.len());

        let tree = PatchedTree::create(&self.config.library_dir, &self.config.patch)?;
        let entry = tree.path(&self.config.entry_header);

        info!("Flattening {} with {}", entry.display(), self.engine.name());
        let output = self.engine.flatten(&entry)?;

        let report = classify_diagnostics(&output.diagnostics, |header| {
            dependencies.contains(header) || bundled.iter().any(|b| b.path == header)
        });
        debug!(
            "{} expected include misses, {} other diagnostics",
            report.expected_misses.len(),
            report.other.len()
        );
        for line in &report.other {
            debug!("preprocessor: {}", line);
        }
        if !report.is_clean() {
            warn!("Unresolved includes: {:?}", report.unexpected_misses);
            return Err(Error::UnresolvedInternalInclude {
                header: report.unexpected_misses[0].clone(),
            });
        }

        let assembler = Assembler::new(bundled.clone(), &self.config.patch.comment_prefix);
        assembler.assemble(&output.text, &dependencies)
    }
}
