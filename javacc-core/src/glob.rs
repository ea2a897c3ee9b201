//! Ant-style include/exclude matching over relative paths.
//!
//! Patterns use `/` as the segment separator regardless of platform. A `*`
//! matches within one segment, `**` matches across segments and `?` matches a
//! single character. A pattern ending in `/` is shorthand for everything
//! below that directory. Excludes always win over includes, and a fixed set
//! of VCS bookkeeping patterns is excluded by default.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;
use thiserror::Error;

/// Patterns excluded from every scan, mirroring the usual VCS noise.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    "**/SCCS",
    "**/SCCS/**",
    "**/vssver.scc",
    "**/.svn",
    "**/.svn/**",
    "**/.DS_Store",
    "**/.git",
    "**/.git/**",
    "**/.gitattributes",
    "**/.gitignore",
    "**/.gitmodules",
    "**/.hg",
    "**/.hg/**",
    "**/.hgignore",
    "**/.bzr",
    "**/.bzr/**",
    "**/.bzrignore",
];

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Invalid {
        pattern: String,
        source: globset::Error,
    },
}

/// Compiled include/exclude sets for one scan.
#[derive(Debug)]
pub struct GlobMatcher {
    includes: GlobSet,
    excludes: GlobSet,
}

impl GlobMatcher {
    /// Compile the given patterns. The default excludes are appended to
    /// `excludes` unconditionally.
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, PatternError> {
        let mut all_excludes: Vec<String> = excludes.to_vec();
        all_excludes.extend(DEFAULT_EXCLUDES.iter().map(|p| (*p).to_string()));
        Ok(Self {
            includes: build_set(includes)?,
            excludes: build_set(&all_excludes)?,
        })
    }

    /// True when `relative` hits at least one include and no exclude.
    pub fn matches(&self, relative: &Path) -> bool {
        self.includes.is_match(relative) && !self.excludes.is_match(relative)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, PatternError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let normalized = normalize(pattern);
        let glob = GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .map_err(|source| PatternError::Invalid {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| PatternError::Invalid {
        pattern: patterns.join(", "),
        source,
    })
}

/// `dir/` means `dir/**` in Ant terms.
fn normalize(pattern: &str) -> String {
    if let Some(prefix) = pattern.strip_suffix('/') {
        format!("{}/**", prefix)
    } else {
        pattern.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn matcher(includes: &[&str], excludes: &[&str]) -> GlobMatcher {
        let includes: Vec<String> = includes.iter().map(|s| s.to_string()).collect();
        let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
        GlobMatcher::new(&includes, &excludes).expect("patterns to compile")
    }

    #[test]
    fn star_stays_within_one_segment() {
        let m = matcher(&["*.jj"], &[]);
        assert!(m.matches(Path::new("Parser.jj")));
        assert!(!m.matches(Path::new("sub/Parser.jj")));
    }

    #[test]
    fn double_star_crosses_segments() {
        let m = matcher(&["**/*.jj"], &[]);
        assert!(m.matches(Path::new("Parser.jj")));
        assert!(m.matches(Path::new("a/b/Parser.jj")));
        assert!(!m.matches(Path::new("a/b/Parser.jjt")));
    }

    #[test]
    fn question_mark_matches_one_character() {
        let m = matcher(&["Parser?.jj"], &[]);
        assert!(m.matches(Path::new("Parser1.jj")));
        assert!(!m.matches(Path::new("Parser.jj")));
        assert!(!m.matches(Path::new("Parser12.jj")));
    }

    #[test]
    fn excludes_win_over_includes() {
        let m = matcher(&["**/*.jj"], &["experimental/**"]);
        assert!(m.matches(Path::new("stable/Parser.jj")));
        assert!(!m.matches(Path::new("experimental/Parser.jj")));
    }

    #[test]
    fn trailing_slash_means_whole_subtree() {
        let m = matcher(&["grammars/"], &[]);
        assert!(m.matches(Path::new("grammars/Parser.jj")));
        assert!(m.matches(Path::new("grammars/deep/Parser.jj")));
        assert!(!m.matches(Path::new("other/Parser.jj")));
    }

    #[test]
    fn vcs_noise_is_always_excluded() {
        let m = matcher(&["**/*"], &[]);
        assert!(!m.matches(Path::new(".svn/entries")));
        assert!(!m.matches(Path::new("a/.git/config")));
        assert!(!m.matches(Path::new("Parser.jj~")));
        assert!(m.matches(Path::new("Parser.jj")));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = GlobMatcher::new(&["a{".to_string()], &[]);
        assert!(err.is_err());
    }
}
