//! Drives the scan/process/register cycle for one build goal.

use crate::pipeline::Pipeline;
use crate::reconcile::{ReconcileError, SourceRootRegistry};
use crate::scanner::{GrammarScanner, ScanError, ScanOutcome};
use crate::tool::ToolError;
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("failed to create directory {dir}: {source}")]
    Scratch {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The project being built: where it lives, where build output goes and
/// which source roots the compiler will see.
pub trait Project {
    fn base_directory(&self) -> &Path;
    fn build_directory(&self) -> &Path;
    fn compile_source_roots(&self) -> Vec<PathBuf>;
    fn add_compile_source_root(&mut self, dir: &Path);
}

/// Plain in-memory [`Project`], enough for the CLI and for tests.
#[derive(Debug, Clone)]
pub struct SimpleProject {
    base_directory: PathBuf,
    build_directory: PathBuf,
    compile_source_roots: Vec<PathBuf>,
}

impl SimpleProject {
    pub fn new(base_directory: PathBuf, build_directory: PathBuf) -> Self {
        Self {
            base_directory,
            build_directory,
            compile_source_roots: Vec::new(),
        }
    }

    pub fn with_compile_source_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.compile_source_roots = roots;
        self
    }
}

impl Project for SimpleProject {
    fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    fn build_directory(&self) -> &Path {
        &self.build_directory
    }

    fn compile_source_roots(&self) -> Vec<PathBuf> {
        self.compile_source_roots.clone()
    }

    fn add_compile_source_root(&mut self, dir: &Path) {
        let dir = dir.to_path_buf();
        if !self.compile_source_roots.contains(&dir) {
            self.compile_source_roots.push(dir);
        }
    }
}

/// Runs one pipeline over one source directory.
pub struct BuildEngine<P: Pipeline> {
    pipeline: P,
    source_directory: PathBuf,
    includes: Option<Vec<String>>,
    excludes: Vec<String>,
    stale_millis: u64,
    package_override: Option<String>,
    grammar_encoding: Option<String>,
    output_encoding: Option<String>,
}

impl<P: Pipeline> BuildEngine<P> {
    pub fn new(pipeline: P, source_directory: PathBuf) -> Self {
        Self {
            pipeline,
            source_directory,
            includes: None,
            excludes: Vec::new(),
            stale_millis: 0,
            package_override: None,
            grammar_encoding: None,
            output_encoding: None,
        }
    }

    /// Replace the pipeline's default include globs.
    pub fn set_includes(&mut self, includes: Vec<String>) -> &mut Self {
        self.includes = Some(includes);
        self
    }

    pub fn set_excludes(&mut self, excludes: Vec<String>) -> &mut Self {
        self.excludes = excludes;
        self
    }

    pub fn set_stale_millis(&mut self, millis: u64) -> &mut Self {
        self.stale_millis = millis;
        self
    }

    /// Force a parser package instead of the one declared in each grammar.
    pub fn set_package_override(&mut self, package: Option<String>) -> &mut Self {
        self.package_override = package;
        self
    }

    /// Configured encodings, tracked only to warn when they are missing;
    /// the actual values travel with the tool facades.
    pub fn set_encodings(
        &mut self,
        grammar_encoding: Option<String>,
        output_encoding: Option<String>,
    ) -> &mut Self {
        self.grammar_encoding = grammar_encoding;
        self.output_encoding = output_encoding;
        self
    }

    /// Scan, process every stale grammar and register the pipeline's output
    /// roots with the project. A failing grammar aborts the run before any
    /// root is registered.
    pub fn execute(&self, project: &mut dyn Project) -> Result<(), BuildError> {
        let mut scanner = GrammarScanner::new();
        scanner
            .set_source_directory(&self.source_directory)
            .set_includes(
                self.includes
                    .clone()
                    .unwrap_or_else(|| default_includes(&self.pipeline)),
            )
            .set_excludes(self.excludes.clone())
            .set_stale_millis(self.stale_millis)
            .set_package_override(self.package_override.clone());
        if let Some((target, policy)) = self.pipeline.staleness_target() {
            scanner.set_target_directory(target, policy);
        }

        match scanner.scan()? {
            ScanOutcome::MissingSourceDirectory => {
                info!(
                    "Skipping non-existing source directory: {}",
                    self.source_directory.display()
                );
                return Ok(());
            }
            ScanOutcome::Scanned => {}
        }

        let grammars = scanner.grammars();
        if grammars.is_empty() {
            info!("Skipping - all parsers are up to date");
        } else {
            let registry = SourceRootRegistry::determine(
                &project.compile_source_roots(),
                project.base_directory(),
                project.build_directory(),
            );
            if self.pipeline.checks_encodings() {
                if self.grammar_encoding.is_none() {
                    warn!(
                        "File encoding for grammars has not been configured, \
                         using platform default encoding, i.e. build is platform dependent!"
                    );
                }
                if self.output_encoding.is_none() {
                    warn!("File encoding for output has not been configured, defaulting to UTF-8!");
                }
            }
            self.pipeline.prepare()?;
            for grammar in grammars {
                self.pipeline.process(grammar, &registry)?;
            }
            info!("Processed {} grammar(s)", grammars.len());
        }

        for root in self.pipeline.compile_source_roots() {
            debug!("Adding compile source root: {}", root.display());
            project.add_compile_source_root(&root);
        }
        Ok(())
    }
}

fn default_includes<P: Pipeline>(pipeline: &P) -> Vec<String> {
    pipeline
        .default_includes()
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}
