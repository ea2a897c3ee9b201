//! Processing recipes, one per build goal.
//!
//! A pipeline decides which grammar files it is interested in, how staleness
//! is judged, which directories end up as compile source roots and what
//! happens to a single stale grammar. The [`engine`](crate::engine) drives
//! the scan/process/register cycle around it.

pub mod javacc;
pub mod jjdoc;
pub mod jjtree;
pub mod jjtree_javacc;
pub mod jtb;
pub mod jtb_javacc;

pub use javacc::JavaCcPipeline;
pub use jjdoc::JjDocPipeline;
pub use jjtree::JjTreePreprocessor;
pub use jjtree_javacc::JjTreeJavaCcPipeline;
pub use jtb::JtbPreprocessor;
pub use jtb_javacc::JtbJavaCcPipeline;

use crate::engine::BuildError;
use crate::grammar::GrammarInfo;
use crate::reconcile::SourceRootRegistry;
use crate::scanner::TargetPolicy;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Grammar extensions understood by the plain parser generator.
pub const PARSER_INCLUDES: &[&str] = &["**/*.jj", "**/*.JJ"];

/// Additionally the annotated grammars consumed by the tree builder.
pub const JJTREE_INCLUDES: &[&str] = &["**/*.jj", "**/*.JJ", "**/*.jjt", "**/*.JJT"];

/// Additionally the annotated grammars consumed by the JTB flavor.
pub const JTB_INCLUDES: &[&str] = &["**/*.jj", "**/*.JJ", "**/*.jtb", "**/*.JTB"];

/// One build goal's processing recipe.
pub trait Pipeline {
    /// Include globs used when the caller configured none.
    fn default_includes(&self) -> &'static [&'static str];

    /// Directory and policy for the staleness check, or `None` to process
    /// every included grammar unconditionally.
    fn staleness_target(&self) -> Option<(&Path, TargetPolicy)>;

    /// Directories to register as compile source roots after a successful
    /// run.
    fn compile_source_roots(&self) -> Vec<PathBuf>;

    /// Whether the engine should nag about unconfigured file encodings.
    /// Goals that do not generate Java sources keep quiet.
    fn checks_encodings(&self) -> bool {
        true
    }

    /// One-time setup before the first grammar is processed.
    fn prepare(&self) -> Result<(), BuildError> {
        Ok(())
    }

    /// Process a single stale grammar.
    fn process(
        &self,
        grammar: &GrammarInfo,
        registry: &SourceRootRegistry,
    ) -> Result<(), BuildError>;
}

/// Creates a scratch directory below the build directory. The directory is
/// removed when the guard drops, also on the error path.
pub(crate) fn scratch_dir(build_directory: &Path) -> Result<TempDir, BuildError> {
    fs::create_dir_all(build_directory).map_err(|source| BuildError::Scratch {
        dir: build_directory.to_path_buf(),
        source,
    })?;
    tempfile::Builder::new()
        .prefix("javacc-")
        .tempdir_in(build_directory)
        .map_err(|source| BuildError::Scratch {
            dir: build_directory.to_path_buf(),
            source,
        })
}

/// Mirrors the grammar below the timestamp directory so later runs can
/// detect it as up to date. Failure costs only rebuild time, not
/// correctness, so it is logged and swallowed.
pub(crate) fn create_timestamp(timestamp_directory: &Path, grammar: &GrammarInfo) {
    let target = timestamp_directory.join(grammar.grammar_file());
    let copy = || -> std::io::Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(grammar.grammar_path(), &target)?;
        Ok(())
    };
    if let Err(error) = copy() {
        warn!(
            "Failed to create copy for timestamp check: {}: {}",
            target.display(),
            error
        );
    }
}
