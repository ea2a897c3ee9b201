//! Two-stage build of JTB-annotated grammars: JTB rewrites the grammar and
//! emits syntax tree and visitor classes, then the parser generator
//! consumes the rewritten grammar.

use super::{scratch_dir, Pipeline, JTB_INCLUDES};
use crate::engine::BuildError;
use crate::grammar::GrammarInfo;
use crate::reconcile::{copy_grammar_output, SourceRootRegistry};
use crate::scanner::TargetPolicy;
use crate::tool::{JavaCc, Jtb, Tool, ToolError};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JtbJavaCcPipeline {
    build_directory: PathBuf,
    /// Where the node and visitor classes land.
    interim_directory: PathBuf,
    /// Where the parser sources land.
    output_directory: PathBuf,
    /// Shorthand that derives both node and visitor packages as
    /// `<package>.syntaxtree` and `<package>.visitor`.
    package_name: Option<String>,
    node_package_name: Option<String>,
    visitor_package_name: Option<String>,
    jtb: Jtb,
    javacc: JavaCc,
}

impl JtbJavaCcPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        build_directory: PathBuf,
        interim_directory: PathBuf,
        output_directory: PathBuf,
        package_name: Option<String>,
        node_package_name: Option<String>,
        visitor_package_name: Option<String>,
        jtb: Jtb,
        javacc: JavaCc,
    ) -> Self {
        Self {
            build_directory,
            interim_directory,
            output_directory,
            package_name,
            node_package_name,
            visitor_package_name,
            jtb,
            javacc,
        }
    }

    /// Effective package declaration for the node classes; JTB's own
    /// default is the `syntaxtree` package below the parser package.
    pub(crate) fn node_package_declaration(&self) -> String {
        if let Some(package) = &self.package_name {
            format!("{}.syntaxtree", package)
        } else if let Some(package) = &self.node_package_name {
            package.clone()
        } else {
            "*.syntaxtree".to_string()
        }
    }

    /// Effective package declaration for the visitor classes.
    pub(crate) fn visitor_package_declaration(&self) -> String {
        if let Some(package) = &self.package_name {
            format!("{}.visitor", package)
        } else if let Some(package) = &self.visitor_package_name {
            package.clone()
        } else {
            "*.visitor".to_string()
        }
    }
}

impl Pipeline for JtbJavaCcPipeline {
    fn default_includes(&self) -> &'static [&'static str] {
        JTB_INCLUDES
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
        let visitor_directory = scratch.path().join("visitor");
        let parser_directory = scratch.path().join("parser");

        let node_package = grammar
            .resolve_package_name(Some(&self.node_package_declaration()))
            .unwrap_or_default();
        let visitor_package = grammar
            .resolve_package_name(Some(&self.visitor_package_declaration()))
            .unwrap_or_default();

        let mut jtb = self.jtb.clone();
        jtb.input_file = Some(grammar_path);
        jtb.output_directory = Some(scratch.path().to_path_buf());
        jtb.node_directory = Some(node_directory.clone());
        jtb.visitor_directory = Some(visitor_directory.clone());
        jtb.node_package_name = Some(node_package.clone());
        jtb.visitor_package_name = Some(visitor_package.clone());
        jtb.run()?;

        let mut javacc = self.javacc.clone();
        javacc.input_file = Some(jtb.output_file().ok_or(ToolError::NoInputFile {
            tool: "javacc",
        })?);
        javacc.output_directory = Some(parser_directory.clone());
        javacc.run()?;

        // Node classes are user-extensible except the Node* base types JTB
        // regenerates verbatim.
        copy_grammar_output(
            registry,
            &self.interim_directory,
            &node_package,
            &node_directory,
            Some("!Node*"),
        )?;

        // Visitor skeletons are starting points; never overwrite them.
        copy_grammar_output(
            registry,
            &self.interim_directory,
            &visitor_package,
            &visitor_directory,
            Some(""),
        )?;

        copy_grammar_output(
            registry,
            &self.output_directory,
            grammar.parser_package(),
            &parser_directory,
            Some(&format!("{}*", grammar.parser_name())),
        )?;

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
