//! Two-stage build of annotated grammars: the tree builder rewrites the
//! grammar and emits node classes, then the parser generator consumes the
//! rewritten grammar. Both stages run inside a scratch directory and only
//! the reconciler decides what reaches the real output roots.

use super::{scratch_dir, Pipeline, JJTREE_INCLUDES};
use crate::engine::BuildError;
use crate::grammar::GrammarInfo;
use crate::reconcile::{copy_grammar_output, SourceRootRegistry};
use crate::scanner::TargetPolicy;
use crate::tool::{JavaCc, JjTree, Tool, ToolError};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JjTreeJavaCcPipeline {
    build_directory: PathBuf,
    /// Where the tree node classes land.
    interim_directory: PathBuf,
    /// Where the parser sources land.
    output_directory: PathBuf,
    /// Package for the node classes; a leading `*` is resolved against the
    /// grammar's parser package.
    node_package: Option<String>,
    jjtree: JjTree,
    javacc: JavaCc,
}

impl JjTreeJavaCcPipeline {
    pub fn new(
        build_directory: PathBuf,
        interim_directory: PathBuf,
        output_directory: PathBuf,
        node_package: Option<String>,
        jjtree: JjTree,
        javacc: JavaCc,
    ) -> Self {
        Self {
            build_directory,
            interim_directory,
            output_directory,
            node_package,
            jjtree,
            javacc,
        }
    }
}

impl Pipeline for JjTreeJavaCcPipeline {
    fn default_includes(&self) -> &'static [&'static str] {
        JJTREE_INCLUDES
    }

    fn staleness_target(&self) -> Option<(&Path, TargetPolicy)> {
        Some((&self.output_directory, TargetPolicy::ParserFile))
    }

    fn compile_source_roots(&self) -> Vec<PathBuf> {
        vec![
            self.output_directory.clone(),
            self.interim_directory.clone(),
        ]
    }

    fn process(
        &self,
        grammar: &GrammarInfo,
        registry: &SourceRootRegistry,
    ) -> Result<(), BuildError> {
        let grammar_path = grammar.grammar_path();
        let grammar_directory = grammar_path.parent().map(Path::to_path_buf);

        let scratch = scratch_dir(&self.build_directory)?;
        let node_directory = scratch.path().join("node");
        let parser_directory = scratch.path().join("parser");

        let node_package = grammar.resolve_package_name(self.node_package.as_deref());

        let mut jjtree = self.jjtree.clone();
        jjtree.input_file = Some(grammar_path);
        jjtree.output_directory = Some(node_directory.clone());
        if node_package.is_some() {
            jjtree.node_package = node_package.clone();
        }
        jjtree.run()?;

        let mut javacc = self.javacc.clone();
        javacc.input_file = Some(jjtree.output_file().ok_or(ToolError::NoInputFile {
            tool: "javacc",
        })?);
        javacc.output_directory = Some(parser_directory.clone());
        javacc.run()?;

        // Tree node classes, except the ones the user customized. The
        // constants class is regenerated for every grammar change and always
        // refreshed.
        copy_grammar_output(
            registry,
            &self.interim_directory,
            node_package.as_deref().unwrap_or(grammar.parser_package()),
            &node_directory,
            Some(&format!("{}TreeConstants*", grammar.parser_name())),
        )?;

        copy_grammar_output(
            registry,
            &self.output_directory,
            grammar.parser_package(),
            &parser_directory,
            Some(&format!("{}*", grammar.parser_name())),
        )?;

        // Java files kept next to the grammar travel along unless the
        // grammar already lives in an ordinary source root.
        if let Some(grammar_directory) = grammar_directory {
            if !registry.is_source_root(grammar.source_directory()) {
                copy_grammar_output(
                    registry,
                    &self.output_directory,
                    grammar.parser_package(),
                    &grammar_directory,
                    Some("*"),
                )?;
            }
        }
        Ok(())
    }
}
