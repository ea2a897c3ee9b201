//! Grammar documentation generation.
//!
//! Every included grammar yields one report file below the output
//! directory, mirroring the grammar's relative path with the extension
//! swapped for the report format.

use super::{Pipeline, JJTREE_INCLUDES};
use crate::engine::BuildError;
use crate::grammar::GrammarInfo;
use crate::reconcile::SourceRootRegistry;
use crate::scanner::TargetPolicy;
use crate::tool::{JjDoc, Tool};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JjDocPipeline {
    output_directory: PathBuf,
    jjdoc: JjDoc,
}

impl JjDocPipeline {
    pub fn new(output_directory: PathBuf, jjdoc: JjDoc) -> Self {
        Self {
            output_directory,
            jjdoc,
        }
    }

    /// Report path for one grammar: the grammar's relative path below the
    /// output directory, with `.html` (or `.txt` in plain-text mode) as the
    /// extension.
    pub fn output_file(&self, grammar: &GrammarInfo) -> PathBuf {
        let extension = if self.jjdoc.text == Some(true) {
            "txt"
        } else {
            "html"
        };
        self.output_directory
            .join(grammar.grammar_file())
            .with_extension(extension)
    }
}

impl Pipeline for JjDocPipeline {
    fn default_includes(&self) -> &'static [&'static str] {
        // Documentation covers annotated grammars too.
        JJTREE_INCLUDES
    }

    fn staleness_target(&self) -> Option<(&Path, TargetPolicy)> {
        // Reports are regenerated on every run.
        None
    }

    fn compile_source_roots(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn checks_encodings(&self) -> bool {
        false
    }

    fn process(
        &self,
        grammar: &GrammarInfo,
        _registry: &SourceRootRegistry,
    ) -> Result<(), BuildError> {
        let mut jjdoc = self.jjdoc.clone();
        jjdoc.input_file = Some(grammar.grammar_path());
        jjdoc.output_file = Some(self.output_file(grammar));
        jjdoc.run()?;
        Ok(())
    }
}
