//! Preprocessor-only goal for the JTB flavor, the counterpart of
//! [`JjTreePreprocessor`](super::JjTreePreprocessor).

use super::{create_timestamp, Pipeline, JTB_INCLUDES};
use crate::engine::BuildError;
use crate::grammar::{package_path, GrammarInfo};
use crate::reconcile::SourceRootRegistry;
use crate::scanner::TargetPolicy;
use crate::tool::{Jtb, Tool};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JtbPreprocessor {
    output_directory: PathBuf,
    timestamp_directory: PathBuf,
    package_name: Option<String>,
    node_package_name: Option<String>,
    visitor_package_name: Option<String>,
    jtb: Jtb,
}

impl JtbPreprocessor {
    pub fn new(
        output_directory: PathBuf,
        timestamp_directory: PathBuf,
        package_name: Option<String>,
        node_package_name: Option<String>,
        visitor_package_name: Option<String>,
        jtb: Jtb,
    ) -> Self {
        Self {
            output_directory,
            timestamp_directory,
            package_name,
            node_package_name,
            visitor_package_name,
            jtb,
        }
    }

    fn node_package_declaration(&self) -> String {
        if let Some(package) = &self.package_name {
            format!("{}.syntaxtree", package)
        } else if let Some(package) = &self.node_package_name {
            package.clone()
        } else {
            "*.syntaxtree".to_string()
        }
    }

    fn visitor_package_declaration(&self) -> String {
        if let Some(package) = &self.package_name {
            format!("{}.visitor", package)
        } else if let Some(package) = &self.visitor_package_name {
            package.clone()
        } else {
            "*.visitor".to_string()
        }
    }
}

impl Pipeline for JtbPreprocessor {
    fn default_includes(&self) -> &'static [&'static str] {
        JTB_INCLUDES
    }

    fn staleness_target(&self) -> Option<(&Path, TargetPolicy)> {
        Some((&self.timestamp_directory, TargetPolicy::TimestampMirror))
    }

    fn compile_source_roots(&self) -> Vec<PathBuf> {
        vec![self.output_directory.clone()]
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
        let node_package = grammar
            .resolve_package_name(Some(&self.node_package_declaration()))
            .unwrap_or_default();
        let visitor_package = grammar
            .resolve_package_name(Some(&self.visitor_package_declaration()))
            .unwrap_or_default();

        let mut jtb = self.jtb.clone();
        jtb.input_file = Some(grammar.grammar_path());
        jtb.output_directory = Some(self.output_directory.join(grammar.parser_directory()));
        jtb.node_directory = Some(self.output_directory.join(package_path(&node_package)));
        jtb.visitor_directory = Some(self.output_directory.join(package_path(&visitor_package)));
        jtb.node_package_name = Some(node_package);
        jtb.visitor_package_name = Some(visitor_package);
        jtb.run()?;

        create_timestamp(&self.timestamp_directory, grammar);
        Ok(())
    }
}
