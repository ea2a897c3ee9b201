//! Grammar discovery with staleness filtering.
//!
//! The scanner walks a source directory, keeps the files that pass the
//! include/exclude globs, builds a [`GrammarInfo`] for each and then drops
//! the grammars whose build targets are newer than the grammar itself.

use crate::glob::{GlobMatcher, PatternError};
use crate::grammar::{GrammarError, GrammarInfo};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to inspect {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("scanner has no source directory configured")]
    NoSourceDirectory,
}

/// How target files for the staleness check are derived from a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPolicy {
    /// The generated parser source below the output directory. Detects a
    /// missing parser but not other missing outputs of the same run.
    ParserFile,
    /// A copy of the grammar below a timestamp directory, mirroring the
    /// grammar's relative path. Used by the preprocessor-only goals whose
    /// real outputs are not predictable up front.
    TimestampMirror,
}

impl TargetPolicy {
    fn target_files(&self, target_directory: &Path, grammar: &GrammarInfo) -> Vec<PathBuf> {
        match self {
            TargetPolicy::ParserFile => vec![target_directory.join(grammar.parser_file())],
            TargetPolicy::TimestampMirror => {
                vec![target_directory.join(grammar.grammar_file())]
            }
        }
    }
}

/// Result of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The source directory does not exist; nothing to do.
    MissingSourceDirectory,
    /// The scan ran; see [`GrammarScanner::grammars`] for the stale set.
    Scanned,
}

/// Configurable scanner for grammar files.
#[derive(Debug)]
pub struct GrammarScanner {
    source_directory: Option<PathBuf>,
    includes: Vec<String>,
    excludes: Vec<String>,
    target_directory: Option<PathBuf>,
    target_policy: TargetPolicy,
    stale_millis: u64,
    package_override: Option<String>,
    grammars: Vec<GrammarInfo>,
}

impl GrammarScanner {
    pub fn new() -> Self {
        Self {
            source_directory: None,
            includes: Vec::new(),
            excludes: Vec::new(),
            target_directory: None,
            target_policy: TargetPolicy::ParserFile,
            stale_millis: 0,
            package_override: None,
            grammars: Vec::new(),
        }
    }

    pub fn set_source_directory(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.source_directory = Some(dir.into());
        self
    }

    pub fn set_includes(&mut self, includes: Vec<String>) -> &mut Self {
        self.includes = includes;
        self
    }

    pub fn set_excludes(&mut self, excludes: Vec<String>) -> &mut Self {
        self.excludes = excludes;
        self
    }

    /// Enable the staleness check against `dir`. Without a target directory
    /// every included grammar is retained.
    pub fn set_target_directory(&mut self, dir: impl Into<PathBuf>, policy: TargetPolicy) -> &mut Self {
        self.target_directory = Some(dir.into());
        self.target_policy = policy;
        self
    }

    /// Granularity of the staleness comparison in milliseconds. Useful on
    /// file systems with coarse timestamps.
    pub fn set_stale_millis(&mut self, millis: u64) -> &mut Self {
        self.stale_millis = millis;
        self
    }

    pub fn set_package_override(&mut self, package: Option<String>) -> &mut Self {
        self.package_override = package;
        self
    }

    /// The stale grammars found by the last [`scan`](Self::scan), in
    /// deterministic (sorted) order.
    pub fn grammars(&self) -> &[GrammarInfo] {
        &self.grammars
    }

    /// Walk the source directory and collect the stale grammars.
    pub fn scan(&mut self) -> Result<ScanOutcome, ScanError> {
        self.grammars.clear();
        let source_directory = self
            .source_directory
            .as_ref()
            .ok_or(ScanError::NoSourceDirectory)?
            .clone();
        if !source_directory.is_dir() {
            return Ok(ScanOutcome::MissingSourceDirectory);
        }

        let matcher = GlobMatcher::new(&self.includes, &self.excludes)?;
        let mut included = Vec::new();
        for entry in WalkDir::new(&source_directory).follow_links(true) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&source_directory) {
                if matcher.matches(relative) {
                    included.push(relative.to_path_buf());
                }
            }
        }
        included.sort();

        for relative in included {
            let info = GrammarInfo::new(
                &source_directory,
                &relative,
                self.package_override.as_deref(),
            )?;
            if self.is_stale(&info)? {
                self.grammars.push(info);
            }
        }
        Ok(ScanOutcome::Scanned)
    }

    /// A grammar is stale when any of its targets is missing or older than
    /// the grammar by more than the stale threshold.
    fn is_stale(&self, grammar: &GrammarInfo) -> Result<bool, ScanError> {
        let target_directory = match &self.target_directory {
            Some(dir) => dir,
            None => return Ok(true),
        };
        let grammar_modified = modified(&grammar.grammar_path())?;
        for target in self.target_policy.target_files(target_directory, grammar) {
            if !target.exists() {
                return Ok(true);
            }
            let target_modified = modified(&target)?;
            if target_modified + Duration::from_millis(self.stale_millis) < grammar_modified {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for GrammarScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn modified(path: &Path) -> Result<SystemTime, ScanError> {
    let metadata = path.metadata().map_err(|source| ScanError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    metadata.modified().map_err(|source| ScanError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn grammar_text(name: &str) -> String {
        format!("PARSER_BEGIN({name})\npackage org.demo;\nPARSER_END({name})\n")
    }

    fn write(path: &Path, text: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    #[test]
    fn missing_source_directory_is_reported_not_failed() {
        let dir = tempfile::tempdir().unwrap();
        let mut scanner = GrammarScanner::new();
        scanner
            .set_source_directory(dir.path().join("does-not-exist"))
            .set_includes(vec!["**/*.jj".into()]);
        assert_eq!(
            scanner.scan().unwrap(),
            ScanOutcome::MissingSourceDirectory
        );
        assert!(scanner.grammars().is_empty());
    }

    #[test]
    fn finds_grammars_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("b/Second.jj"), &grammar_text("Second"));
        write(&dir.path().join("a/First.jj"), &grammar_text("First"));
        write(&dir.path().join("notes.txt"), "not a grammar");

        let mut scanner = GrammarScanner::new();
        scanner
            .set_source_directory(dir.path())
            .set_includes(vec!["**/*.jj".into()]);
        scanner.scan().unwrap();
        let names: Vec<&str> = scanner.grammars().iter().map(|g| g.parser_name()).collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[test]
    fn without_target_directory_everything_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("Simple.jj"), &grammar_text("Simple"));
        let mut scanner = GrammarScanner::new();
        scanner
            .set_source_directory(dir.path())
            .set_includes(vec!["*.jj".into()]);
        scanner.scan().unwrap();
        assert_eq!(scanner.grammars().len(), 1);
    }

    #[test]
    fn up_to_date_parser_file_filters_grammar_out() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(&src.path().join("Simple.jj"), &grammar_text("Simple"));
        // Target newer than the grammar.
        write(
            &out.path().join("org/demo/Simple.java"),
            "public class Simple {}",
        );

        let mut scanner = GrammarScanner::new();
        scanner
            .set_source_directory(src.path())
            .set_includes(vec!["*.jj".into()])
            .set_target_directory(out.path(), TargetPolicy::ParserFile);
        scanner.scan().unwrap();
        assert!(scanner.grammars().is_empty());
    }

    #[test]
    fn missing_parser_file_keeps_grammar() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(&src.path().join("Simple.jj"), &grammar_text("Simple"));

        let mut scanner = GrammarScanner::new();
        scanner
            .set_source_directory(src.path())
            .set_includes(vec!["*.jj".into()])
            .set_target_directory(out.path(), TargetPolicy::ParserFile);
        scanner.scan().unwrap();
        assert_eq!(scanner.grammars().len(), 1);
    }

    #[test]
    fn stale_millis_tolerates_older_targets() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("org/demo/Simple.java");
        write(&target, "public class Simple {}");
        std::thread::sleep(Duration::from_millis(20));
        write(&src.path().join("Simple.jj"), &grammar_text("Simple"));

        let mut scanner = GrammarScanner::new();
        scanner
            .set_source_directory(src.path())
            .set_includes(vec!["*.jj".into()])
            .set_target_directory(out.path(), TargetPolicy::ParserFile)
            .set_stale_millis(60_000);
        scanner.scan().unwrap();
        assert!(
            scanner.grammars().is_empty(),
            "target within the stale window counts as fresh"
        );

        scanner.set_stale_millis(0);
        scanner.scan().unwrap();
        assert_eq!(scanner.grammars().len(), 1);
    }

    #[test]
    fn timestamp_mirror_policy_checks_grammar_copy() {
        let src = tempfile::tempdir().unwrap();
        let stamps = tempfile::tempdir().unwrap();
        write(&src.path().join("sub/Simple.jj"), &grammar_text("Simple"));
        std::thread::sleep(Duration::from_millis(20));
        write(
            &stamps.path().join("sub/Simple.jj"),
            &grammar_text("Simple"),
        );

        let mut scanner = GrammarScanner::new();
        scanner
            .set_source_directory(src.path())
            .set_includes(vec!["**/*.jj".into()])
            .set_target_directory(stamps.path(), TargetPolicy::TimestampMirror);
        scanner.scan().unwrap();
        assert!(scanner.grammars().is_empty());
    }
}
