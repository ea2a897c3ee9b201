//! Preprocessor-only goal for the tree builder, kept for builds that want
//! to run the parser generator as a separate step. Output goes straight
//! into the output root and a timestamp mirror provides the staleness
//! check, since the set of generated files is not predictable up front.

use super::{create_timestamp, Pipeline, JJTREE_INCLUDES};
use crate::engine::BuildError;
use crate::grammar::{package_path, GrammarInfo};
use crate::reconcile::SourceRootRegistry;
use crate::scanner::TargetPolicy;
use crate::tool::{JjTree, Tool};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JjTreePreprocessor {
    output_directory: PathBuf,
    timestamp_directory: PathBuf,
    node_package: Option<String>,
    jjtree: JjTree,
}

impl JjTreePreprocessor {
    pub fn new(
        output_directory: PathBuf,
        timestamp_directory: PathBuf,
        node_package: Option<String>,
        jjtree: JjTree,
    ) -> Self {
        Self {
            output_directory,
            timestamp_directory,
            node_package,
            jjtree,
        }
    }
}

impl Pipeline for JjTreePreprocessor {
    fn default_includes(&self) -> &'static [&'static str] {
        JJTREE_INCLUDES
    }

    fn staleness_target(&self) -> Option<(&Path, TargetPolicy)> {
        Some((&self.timestamp_directory, TargetPolicy::TimestampMirror))
    }

    fn compile_source_roots(&self) -> Vec<PathBuf> {
        // The parser generator goal that consumes the rewritten grammar
        // registers the shared output root; registering it twice would
        // duplicate the root.
        Vec::new()
    }

    fn checks_encodings(&self) -> bool {
        false
    }

    fn prepare(&self) -> Result<(), BuildError> {
        fs::create_dir_all(&self.timestamp_directory).map_err(|source| BuildError::Scratch {
            dir: self.timestamp_directory.clone(),
            source,
        })
    }

    fn process(
        &self,
        grammar: &GrammarInfo,
        _registry: &SourceRootRegistry,
    ) -> Result<(), BuildError> {
        let node_package = grammar.resolve_package_name(self.node_package.as_deref());
        let node_directory = match &node_package {
            Some(package) => package_path(package),
            None => grammar.parser_directory().to_path_buf(),
        };

        let mut jjtree = self.jjtree.clone();
        jjtree.input_file = Some(grammar.grammar_path());
        jjtree.output_directory = Some(self.output_directory.join(node_directory));
        if node_package.is_some() {
            jjtree.node_package = node_package;
        }
        jjtree.run()?;

        create_timestamp(&self.timestamp_directory, grammar);
        Ok(())
    }
}
