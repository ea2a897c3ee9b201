//! Plain parser generation from `.jj` grammars.

use super::{Pipeline, PARSER_INCLUDES};
use crate::engine::BuildError;
use crate::grammar::GrammarInfo;
use crate::reconcile::SourceRootRegistry;
use crate::scanner::TargetPolicy;
use crate::tool::{JavaCc, Tool};
use std::path::{Path, PathBuf};

/// Runs the parser generator directly against the output root; the package
/// subdirectory is appended per grammar and the generator's own output is
/// the final result.
#[derive(Debug)]
pub struct JavaCcPipeline {
    output_directory: PathBuf,
    javacc: JavaCc,
}

impl JavaCcPipeline {
    /// `javacc` is the option template; input file and output directory are
    /// set per grammar.
    pub fn new(output_directory: PathBuf, javacc: JavaCc) -> Self {
        Self {
            output_directory,
            javacc,
        }
    }
}

impl Pipeline for JavaCcPipeline {
    fn default_includes(&self) -> &'static [&'static str] {
        PARSER_INCLUDES
    }

    fn staleness_target(&self) -> Option<(&Path, TargetPolicy)> {
        Some((&self.output_directory, TargetPolicy::ParserFile))
    }

    fn compile_source_roots(&self) -> Vec<PathBuf> {
        vec![self.output_directory.clone()]
    }

    fn process(
        &self,
        grammar: &GrammarInfo,
        _registry: &SourceRootRegistry,
    ) -> Result<(), BuildError> {
        let mut javacc = self.javacc.clone();
        javacc.input_file = Some(grammar.grammar_path());
        javacc.output_directory = Some(self.output_directory.join(grammar.parser_directory()));
        javacc.run()?;
        Ok(())
    }
}
