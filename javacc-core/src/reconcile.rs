//! Moves generated sources into project source roots without clobbering
//! files the user maintains by hand.
//!
//! Tools generate into a scratch directory first. Each generated file is
//! then copied below a source root at its package path, unless a file with
//! the same package-relative path already exists in one of the project's
//! non-generated source roots. A refresh pattern can force specific files
//! (typically the ones the generator fully owns, like the parser itself) to
//! be overwritten in place.

use crate::glob::PatternError;
use crate::grammar::package_path;
use globset::GlobBuilder;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("failed to list generated files in {dir}: {source}")]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to copy generated file {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The project source roots that may contain hand-maintained files. Roots
/// below the build directory are generated output and deliberately not part
/// of the registry.
#[derive(Debug, Clone, Default)]
pub struct SourceRootRegistry {
    roots: Vec<PathBuf>,
}

impl SourceRootRegistry {
    /// Filter the project's compile source roots down to the non-generated
    /// ones. Relative roots are resolved against `base_directory`; anything
    /// below `build_directory` is dropped.
    pub fn determine(
        compile_source_roots: &[PathBuf],
        base_directory: &Path,
        build_directory: &Path,
    ) -> Self {
        let build_directory = normalize(build_directory);
        let roots = compile_source_roots
            .iter()
            .map(|root| {
                if root.is_absolute() {
                    root.clone()
                } else {
                    base_directory.join(root)
                }
            })
            .map(|root| normalize(&root))
            .filter(|root| !root.starts_with(&build_directory))
            .collect();
        Self { roots }
    }

    pub fn from_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// True when `dir` is itself one of the registered roots.
    pub fn is_source_root(&self, dir: &Path) -> bool {
        let dir = normalize(dir);
        self.roots.iter().any(|root| *root == dir)
    }

    /// Locate a hand-maintained file by its root-relative path.
    pub fn find_source_file(&self, relative: &Path) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
    }
}

/// Resolves symlinks where possible; paths that do not exist (yet) are kept
/// as given so prefix checks still work on freshly configured projects.
fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// A file-name glob deciding which generated files may overwrite their
/// user-visible counterpart. A leading `!` negates the match; an empty
/// pattern matches nothing.
#[derive(Debug)]
struct RefreshPattern {
    negated: bool,
    matcher: Option<globset::GlobMatcher>,
}

impl RefreshPattern {
    fn new(pattern: &str) -> Result<Self, PatternError> {
        let (negated, body) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let matcher = if body.is_empty() {
            None
        } else {
            Some(
                GlobBuilder::new(body)
                    .build()
                    .map_err(|source| PatternError::Invalid {
                        pattern: pattern.to_string(),
                        source,
                    })?
                    .compile_matcher(),
            )
        };
        Ok(Self { negated, matcher })
    }

    fn matches(&self, file_name: &str) -> bool {
        let hit = self
            .matcher
            .as_ref()
            .map(|m| m.is_match(file_name))
            .unwrap_or(false);
        self.negated != hit
    }
}

/// Copy the Java sources generated into `scratch_directory` below
/// `source_root`, prefixed by the package path for `package_name`. Files
/// that already exist in one of the registry's roots are skipped, unless
/// `refresh_pattern` matches their name and the existing file is the copy
/// target itself (i.e. the file lives in `source_root`, not in a root the
/// user owns).
pub fn copy_grammar_output(
    registry: &SourceRootRegistry,
    source_root: &Path,
    package_name: &str,
    scratch_directory: &Path,
    refresh_pattern: Option<&str>,
) -> Result<(), ReconcileError> {
    let refresh = match refresh_pattern {
        Some(pattern) => Some(RefreshPattern::new(pattern)?),
        None => None,
    };
    let package_directory = package_path(package_name);

    let entries = match fs::read_dir(scratch_directory) {
        Ok(entries) => entries,
        // The tool may legitimately emit nothing into this directory.
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            debug!(
                "No generated files in {}",
                scratch_directory.display()
            );
            return Ok(());
        }
        Err(source) => {
            return Err(ReconcileError::List {
                dir: scratch_directory.to_path_buf(),
                source,
            })
        }
    };

    let mut generated = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ReconcileError::List {
            dir: scratch_directory.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "java") {
            generated.push(path);
        }
    }
    generated.sort();

    for generated_file in generated {
        let file_name = match generated_file.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let output_path = package_directory.join(&file_name);
        let output_file = source_root.join(&output_path);

        let source_file = registry.find_source_file(&output_path);
        let always_update = match (&refresh, &source_file) {
            (Some(refresh), Some(_)) => refresh.matches(&file_name),
            _ => false,
        };

        let overwrite_own_copy =
            always_update && source_file.as_deref() == Some(output_file.as_path());
        if source_file.is_none() || overwrite_own_copy {
            debug!("Copying generated file: {}", output_path.display());
            if let Some(parent) = output_file.parent() {
                fs::create_dir_all(parent).map_err(|source| ReconcileError::Copy {
                    from: generated_file.clone(),
                    to: output_file.clone(),
                    source,
                })?;
            }
            fs::copy(&generated_file, &output_file).map_err(|source| ReconcileError::Copy {
                from: generated_file.clone(),
                to: output_file.clone(),
                source,
            })?;
        } else {
            debug!("Skipping customized file: {}", output_path.display());
        }
    }
    Ok(())
}
