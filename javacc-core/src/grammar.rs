//! Metadata extracted from a single grammar file.
//!
//! A grammar declares the Java package and parser class it generates; both
//! are sniffed out of the file text with regexes so we can predict where the
//! generated parser lands without running any tool.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

static PACKAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"package\s+([^\s.;]+(\.[^\s.;]+)*)\s*;").expect("package regex")
});

static PARSER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"PARSER_BEGIN\s*\(\s*([^\s)]+)\s*\)").expect("parser name regex"));

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("source directory is not absolute: {0}")]
    SourceDirNotAbsolute(PathBuf),
    #[error("grammar file {file} is not located inside source directory {dir}")]
    OutsideSourceDirectory { file: PathBuf, dir: PathBuf },
    #[error("failed to read grammar file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Everything the engine needs to know about one grammar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarInfo {
    source_directory: PathBuf,
    grammar_file: PathBuf,
    parser_package: String,
    parser_directory: PathBuf,
    parser_name: String,
    parser_file: PathBuf,
}

impl GrammarInfo {
    /// Inspect `input_file` (relative to `source_directory`, or absolute and
    /// located below it) and derive the parser package, name and output path.
    /// `package_override` replaces the package sniffed from the file text.
    pub fn new(
        source_directory: &Path,
        input_file: &Path,
        package_override: Option<&str>,
    ) -> Result<Self, GrammarError> {
        if !source_directory.is_absolute() {
            return Err(GrammarError::SourceDirNotAbsolute(
                source_directory.to_path_buf(),
            ));
        }
        let grammar_file = if input_file.is_absolute() {
            input_file
                .strip_prefix(source_directory)
                .map_err(|_| GrammarError::OutsideSourceDirectory {
                    file: input_file.to_path_buf(),
                    dir: source_directory.to_path_buf(),
                })?
                .to_path_buf()
        } else {
            input_file.to_path_buf()
        };

        let grammar_path = source_directory.join(&grammar_file);
        let text = fs::read(&grammar_path).map_err(|source| GrammarError::Read {
            path: grammar_path.clone(),
            source,
        })?;
        // Grammars are ordinary text files; tolerate whatever encoding they
        // use since the declarations we need are plain ASCII.
        let text = String::from_utf8_lossy(&text);

        let parser_package = match package_override {
            Some(pkg) => pkg.to_string(),
            None => PACKAGE_RE
                .captures(&text)
                .map(|c| c[1].to_string())
                .unwrap_or_default(),
        };

        let parser_name = PARSER_NAME_RE
            .captures(&text)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| {
                grammar_file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });

        let parser_directory = package_path(&parser_package);
        let parser_file = parser_directory.join(format!("{}.java", parser_name));

        Ok(Self {
            source_directory: source_directory.to_path_buf(),
            grammar_file,
            parser_package,
            parser_directory,
            parser_name,
            parser_file,
        })
    }

    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    /// Grammar path relative to the source directory.
    pub fn grammar_file(&self) -> &Path {
        &self.grammar_file
    }

    /// Absolute path of the grammar file.
    pub fn grammar_path(&self) -> PathBuf {
        self.source_directory.join(&self.grammar_file)
    }

    /// Declared package, empty for the default package.
    pub fn parser_package(&self) -> &str {
        &self.parser_package
    }

    /// Package converted to a relative directory path, empty for the default
    /// package.
    pub fn parser_directory(&self) -> &Path {
        &self.parser_directory
    }

    pub fn parser_name(&self) -> &str {
        &self.parser_name
    }

    /// Relative path of the generated parser source below an output root.
    pub fn parser_file(&self) -> &Path {
        &self.parser_file
    }

    /// Resolve a package declaration that may be relative to the parser
    /// package: a leading `*` stands for the parser package itself, so
    /// `*.syntaxtree` under parser package `org.demo` becomes
    /// `org.demo.syntaxtree` and a bare `*` in the default package collapses
    /// to the default package.
    pub fn resolve_package_name(&self, declaration: Option<&str>) -> Option<String> {
        let declaration = declaration?;
        match declaration.strip_prefix('*') {
            Some(rest) => {
                let resolved = format!("{}{}", self.parser_package, rest);
                // In the default package `*.x` expands to `.x`; drop that
                // one leading dot. Non-star declarations pass through as
                // written.
                match resolved.strip_prefix('.') {
                    Some(stripped) => Some(stripped.to_string()),
                    None => Some(resolved),
                }
            }
            None => Some(declaration.to_string()),
        }
    }
}

impl fmt::Display for GrammarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.grammar_path().display(),
            self.parser_file.display()
        )
    }
}

/// `org.demo.parser` becomes `org/demo/parser` (platform separators).
pub(crate) fn package_path(package: &str) -> PathBuf {
    if package.is_empty() {
        PathBuf::new()
    } else {
        package.split('.').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_grammar(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn derives_package_and_parser_name() {
        let dir = tempfile::tempdir().unwrap();
        write_grammar(
            dir.path(),
            "Simple.jj",
            "options {}\nPARSER_BEGIN(SimpleParser)\npackage org.demo;\npublic class SimpleParser {}\nPARSER_END(SimpleParser)\n",
        );
        let info = GrammarInfo::new(dir.path(), Path::new("Simple.jj"), None).unwrap();
        assert_eq!(info.parser_package(), "org.demo");
        assert_eq!(info.parser_name(), "SimpleParser");
        assert_eq!(
            info.parser_file(),
            Path::new("org").join("demo").join("SimpleParser.java")
        );
    }

    #[test]
    fn default_package_puts_parser_at_output_root() {
        let dir = tempfile::tempdir().unwrap();
        write_grammar(
            dir.path(),
            "Simple.jj",
            "PARSER_BEGIN(SimpleParser)\npublic class SimpleParser {}\nPARSER_END(SimpleParser)\n",
        );
        let info = GrammarInfo::new(dir.path(), Path::new("Simple.jj"), None).unwrap();
        assert_eq!(info.parser_package(), "");
        assert_eq!(info.parser_file(), Path::new("SimpleParser.java"));
    }

    #[test]
    fn parser_name_falls_back_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        write_grammar(dir.path(), "Fallback.jj", "options {}\n");
        let info = GrammarInfo::new(dir.path(), Path::new("Fallback.jj"), None).unwrap();
        assert_eq!(info.parser_name(), "Fallback");
        assert_eq!(info.parser_file(), Path::new("Fallback.java"));
    }

    #[test]
    fn package_override_wins_over_file_text() {
        let dir = tempfile::tempdir().unwrap();
        write_grammar(
            dir.path(),
            "Simple.jj",
            "PARSER_BEGIN(P)\npackage org.demo;\nPARSER_END(P)\n",
        );
        let info = GrammarInfo::new(dir.path(), Path::new("Simple.jj"), Some("com.other")).unwrap();
        assert_eq!(info.parser_package(), "com.other");
        assert_eq!(
            info.parser_file(),
            Path::new("com").join("other").join("P.java")
        );
    }

    #[test]
    fn absolute_input_must_live_below_source_directory() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let path = write_grammar(other.path(), "Stray.jj", "PARSER_BEGIN(S)\nPARSER_END(S)\n");
        let err = GrammarInfo::new(dir.path(), &path, None).unwrap_err();
        assert!(matches!(err, GrammarError::OutsideSourceDirectory { .. }));
    }

    #[test]
    fn absolute_input_below_source_directory_is_relativized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_grammar(
            dir.path(),
            "sub/Nested.jj",
            "PARSER_BEGIN(Nested)\nPARSER_END(Nested)\n",
        );
        let info = GrammarInfo::new(dir.path(), &path, None).unwrap();
        assert_eq!(info.grammar_file(), Path::new("sub").join("Nested.jj"));
    }

    #[test]
    fn relative_source_directory_is_rejected() {
        let err = GrammarInfo::new(Path::new("relative"), Path::new("Simple.jj"), None);
        assert!(matches!(
            err,
            Err(GrammarError::SourceDirNotAbsolute(_))
        ));
    }

    #[test]
    fn resolves_star_relative_packages() {
        let dir = tempfile::tempdir().unwrap();
        write_grammar(
            dir.path(),
            "Simple.jj",
            "PARSER_BEGIN(P)\npackage org.demo;\nPARSER_END(P)\n",
        );
        let info = GrammarInfo::new(dir.path(), Path::new("Simple.jj"), None).unwrap();
        assert_eq!(info.resolve_package_name(None), None);
        assert_eq!(
            info.resolve_package_name(Some("*.syntaxtree")).as_deref(),
            Some("org.demo.syntaxtree")
        );
        assert_eq!(
            info.resolve_package_name(Some("com.fixed")).as_deref(),
            Some("com.fixed")
        );
        assert_eq!(info.resolve_package_name(Some("*")).as_deref(), Some("org.demo"));
    }

    #[test]
    fn star_in_default_package_collapses() {
        let dir = tempfile::tempdir().unwrap();
        write_grammar(dir.path(), "Simple.jj", "PARSER_BEGIN(P)\nPARSER_END(P)\n");
        let info = GrammarInfo::new(dir.path(), Path::new("Simple.jj"), None).unwrap();
        assert_eq!(info.resolve_package_name(Some("*")).as_deref(), Some(""));
        assert_eq!(
            info.resolve_package_name(Some("*.visitor")).as_deref(),
            Some("visitor")
        );
    }

    #[test]
    fn only_star_expansion_strips_a_leading_dot() {
        let dir = tempfile::tempdir().unwrap();
        write_grammar(dir.path(), "Simple.jj", "PARSER_BEGIN(P)\nPARSER_END(P)\n");
        let info = GrammarInfo::new(dir.path(), Path::new("Simple.jj"), None).unwrap();
        // A non-star declaration passes through as written, dots and all.
        assert_eq!(
            info.resolve_package_name(Some(".odd.name")).as_deref(),
            Some(".odd.name")
        );
        // Star expansion removes at most the one dot it introduced.
        assert_eq!(
            info.resolve_package_name(Some("*..double")).as_deref(),
            Some(".double")
        );
    }
}
