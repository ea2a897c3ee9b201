//! Shared configuration loader for the grammar build tools.
//!
//! `defaults/javacc-build.default.toml` is embedded into every binary so
//! that docs and runtime behavior stay in sync. Applications layer a
//! project-local file on top of those defaults via [`Loader`] before
//! deserializing into [`BuildConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/javacc-build.default.toml");

/// Name of the project-local configuration file.
pub const PROJECT_FILE: &str = "javacc-build.toml";

/// Top-level configuration consumed by the build tools.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    pub project: ProjectConfig,
    pub scan: ScanConfig,
    pub tools: ToolsConfig,
    pub javacc: JavaCcConfig,
    pub jjtree: JjTreeConfig,
    pub jtb: JtbConfig,
    pub jjdoc: JjDocConfig,
}

/// Project layout. Relative paths are resolved against the project
/// directory by the application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    pub build_directory: PathBuf,
    pub compile_source_roots: Vec<PathBuf>,
}

/// Grammar discovery knobs shared by all goals.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScanConfig {
    pub excludes: Vec<String>,
    pub stale_millis: u64,
}

/// Where the external tools come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolsConfig {
    pub javacc: String,
    pub jjtree: String,
    pub jtb: String,
    pub jjdoc_main_class: String,
    /// Extra class path entries for the forked JVM.
    pub classpath: Vec<PathBuf>,
    /// Class path roots named indirectly by the URL of a resource inside
    /// them, e.g. a `jar:file:` URL of the tool's main class.
    #[serde(default)]
    pub classpath_urls: Vec<ClasspathUrl>,
    /// Explicit `java` executable for the forked JVM; defaults to the one
    /// found via `JAVA_HOME` or the search path.
    #[serde(default)]
    pub java: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClasspathUrl {
    pub url: String,
    pub resource: String,
}

/// Parser generator options. Unset options are not passed to the tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JavaCcConfig {
    pub source_directory: PathBuf,
    pub output_directory: PathBuf,
    #[serde(default)]
    pub includes: Option<Vec<String>>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub grammar_encoding: Option<String>,
    /// Encoding of the generated sources. The tools default to the platform
    /// encoding; setting this documents the choice and silences the warning.
    #[serde(default)]
    pub output_encoding: Option<String>,
    #[serde(default)]
    pub jdk_version: Option<String>,
    #[serde(default)]
    pub lookahead: Option<u32>,
    #[serde(default)]
    pub choice_ambiguity_check: Option<u32>,
    #[serde(default)]
    pub other_ambiguity_check: Option<u32>,
    #[serde(default)]
    pub is_static: Option<bool>,
    #[serde(default)]
    pub debug_parser: Option<bool>,
    #[serde(default)]
    pub debug_lookahead: Option<bool>,
    #[serde(default)]
    pub debug_token_manager: Option<bool>,
    #[serde(default)]
    pub error_reporting: Option<bool>,
    #[serde(default)]
    pub java_unicode_escape: Option<bool>,
    #[serde(default)]
    pub unicode_input: Option<bool>,
    #[serde(default)]
    pub ignore_case: Option<bool>,
    #[serde(default)]
    pub common_token_action: Option<bool>,
    #[serde(default)]
    pub user_token_manager: Option<bool>,
    #[serde(default)]
    pub user_char_stream: Option<bool>,
    #[serde(default)]
    pub build_parser: Option<bool>,
    #[serde(default)]
    pub build_token_manager: Option<bool>,
    #[serde(default)]
    pub token_manager_uses_parser: Option<bool>,
    #[serde(default)]
    pub token_extends: Option<String>,
    #[serde(default)]
    pub token_factory: Option<String>,
    #[serde(default)]
    pub sanity_check: Option<bool>,
    #[serde(default)]
    pub force_la_check: Option<bool>,
    #[serde(default)]
    pub cache_tokens: Option<bool>,
    #[serde(default)]
    pub keep_line_column: Option<bool>,
    #[serde(default)]
    pub support_class_visibility_public: Option<bool>,
}

/// Tree builder options and directories. The parser generator stage of the
/// chained goal takes its options from `[javacc]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JjTreeConfig {
    pub source_directory: PathBuf,
    pub interim_directory: PathBuf,
    pub output_directory: PathBuf,
    pub timestamp_directory: PathBuf,
    #[serde(default)]
    pub includes: Option<Vec<String>>,
    #[serde(default)]
    pub node_package: Option<String>,
    #[serde(default)]
    pub grammar_encoding: Option<String>,
    #[serde(default)]
    pub jdk_version: Option<String>,
    #[serde(default)]
    pub build_node_files: Option<bool>,
    #[serde(default)]
    pub multi: Option<bool>,
    #[serde(default)]
    pub node_default_void: Option<bool>,
    #[serde(default)]
    pub node_class: Option<String>,
    #[serde(default)]
    pub node_factory: Option<String>,
    #[serde(default)]
    pub node_prefix: Option<String>,
    #[serde(default)]
    pub node_scope_hook: Option<bool>,
    #[serde(default)]
    pub node_uses_parser: Option<bool>,
    #[serde(default)]
    pub track_tokens: Option<bool>,
    #[serde(default)]
    pub is_static: Option<bool>,
    #[serde(default)]
    pub visitor: Option<bool>,
    #[serde(default)]
    pub visitor_data_type: Option<String>,
    #[serde(default)]
    pub visitor_return_type: Option<String>,
    #[serde(default)]
    pub visitor_exception: Option<String>,
}

/// JTB options and directories.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JtbConfig {
    pub source_directory: PathBuf,
    pub interim_directory: PathBuf,
    pub output_directory: PathBuf,
    pub timestamp_directory: PathBuf,
    #[serde(default)]
    pub includes: Option<Vec<String>>,
    /// Shorthand deriving node and visitor packages as
    /// `<package>.syntaxtree` and `<package>.visitor`.
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub node_package_name: Option<String>,
    #[serde(default)]
    pub visitor_package_name: Option<String>,
    #[serde(default)]
    pub suppress_error_checking: Option<bool>,
    #[serde(default)]
    pub javadoc_friendly_comments: Option<bool>,
    #[serde(default)]
    pub descriptive_field_names: Option<bool>,
    #[serde(default)]
    pub node_parent_class: Option<String>,
    #[serde(default)]
    pub parent_pointers: Option<bool>,
    #[serde(default)]
    pub special_tokens: Option<bool>,
    #[serde(default)]
    pub scheme: Option<bool>,
    #[serde(default)]
    pub printer: Option<bool>,
}

/// Documentation generator options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JjDocConfig {
    pub source_directory: PathBuf,
    pub output_directory: PathBuf,
    #[serde(default)]
    pub includes: Option<Vec<String>>,
    #[serde(default)]
    pub grammar_encoding: Option<String>,
    #[serde(default)]
    pub output_encoding: Option<String>,
    #[serde(default)]
    pub css_href: Option<String>,
    #[serde(default)]
    pub text: Option<bool>,
    #[serde(default)]
    pub bnf: Option<bool>,
    #[serde(default)]
    pub one_table: Option<bool>,
}

/// Helper for layering project overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<BuildConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<BuildConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.project.build_directory, PathBuf::from("target"));
        assert_eq!(config.scan.stale_millis, 0);
        assert_eq!(config.tools.javacc, "javacc");
        assert_eq!(config.tools.jjdoc_main_class, "org.javacc.jjdoc.JJDocMain");
        assert_eq!(
            config.javacc.source_directory,
            PathBuf::from("src/main/javacc")
        );
        assert_eq!(
            config.jjtree.timestamp_directory,
            PathBuf::from("target/generated-sources/javacc-timestamp")
        );
        assert!(config.javacc.lookahead.is_none());
        assert!(config.jtb.package_name.is_none());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("javacc.lookahead", 2i64)
            .expect("override to apply")
            .set_override("scan.stale-millis", 5000i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.javacc.lookahead, Some(2));
        assert_eq!(config.scan.stale_millis, 5000);
    }
}
