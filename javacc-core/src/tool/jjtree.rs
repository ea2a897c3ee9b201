//! Facade for the tree-builder preprocessor.
//!
//! The tool rewrites an annotated grammar into a plain parser grammar plus
//! the node classes of the syntax tree. The rewritten grammar keeps the
//! input's base name with a `.jj` extension below the output directory.

use super::{create_dir, push_opt, Launcher, Tool, ToolError};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JjTree {
    launcher: Launcher,
    pub input_file: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub grammar_encoding: Option<String>,
    pub jdk_version: Option<String>,
    pub build_node_files: Option<bool>,
    pub multi: Option<bool>,
    pub node_default_void: Option<bool>,
    pub node_class: Option<String>,
    pub node_factory: Option<String>,
    pub node_package: Option<String>,
    pub node_prefix: Option<String>,
    pub node_scope_hook: Option<bool>,
    pub node_uses_parser: Option<bool>,
    pub track_tokens: Option<bool>,
    pub is_static: Option<bool>,
    pub visitor: Option<bool>,
    pub visitor_data_type: Option<String>,
    pub visitor_return_type: Option<String>,
    pub visitor_exception: Option<String>,
}

impl JjTree {
    pub fn new(launcher: Launcher) -> Self {
        Self {
            launcher,
            input_file: None,
            output_directory: None,
            grammar_encoding: None,
            jdk_version: None,
            build_node_files: None,
            multi: None,
            node_default_void: None,
            node_class: None,
            node_factory: None,
            node_package: None,
            node_prefix: None,
            node_scope_hook: None,
            node_uses_parser: None,
            track_tokens: None,
            is_static: None,
            visitor: None,
            visitor_data_type: None,
            visitor_return_type: None,
            visitor_exception: None,
        }
    }

    /// Path of the rewritten grammar emitted by a successful run, or `None`
    /// while input or output are unset.
    pub fn output_file(&self) -> Option<PathBuf> {
        let input = self.input_file.as_ref()?;
        let output_directory = self.output_directory.as_ref()?;
        let stem = input.file_stem()?;
        let mut name = stem.to_os_string();
        name.push(".jj");
        Some(output_directory.join(name))
    }

    fn check_paths(&self) -> Result<(), ToolError> {
        for (what, path) in [
            ("input file", &self.input_file),
            ("output directory", &self.output_directory),
        ] {
            if let Some(path) = path {
                if !path.is_absolute() {
                    return Err(ToolError::NotAbsolute {
                        tool: self.name(),
                        what,
                        path: path.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Tool for JjTree {
    fn name(&self) -> &'static str {
        "jjtree"
    }

    fn arguments(&self) -> Result<Vec<String>, ToolError> {
        self.check_paths()?;
        let mut args = Vec::new();
        push_opt(&mut args, "GRAMMAR_ENCODING", &self.grammar_encoding);
        push_opt(&mut args, "JDK_VERSION", &self.jdk_version);
        push_opt(&mut args, "BUILD_NODE_FILES", &self.build_node_files);
        push_opt(&mut args, "MULTI", &self.multi);
        push_opt(&mut args, "NODE_DEFAULT_VOID", &self.node_default_void);
        push_opt(&mut args, "NODE_CLASS", &self.node_class);
        push_opt(&mut args, "NODE_FACTORY", &self.node_factory);
        push_opt(&mut args, "NODE_PACKAGE", &self.node_package);
        push_opt(&mut args, "NODE_PREFIX", &self.node_prefix);
        push_opt(&mut args, "NODE_SCOPE_HOOK", &self.node_scope_hook);
        push_opt(&mut args, "NODE_USES_PARSER", &self.node_uses_parser);
        push_opt(&mut args, "TRACK_TOKENS", &self.track_tokens);
        push_opt(&mut args, "STATIC", &self.is_static);
        push_opt(&mut args, "VISITOR", &self.visitor);
        push_opt(&mut args, "VISITOR_DATA_TYPE", &self.visitor_data_type);
        push_opt(&mut args, "VISITOR_RETURN_TYPE", &self.visitor_return_type);
        push_opt(&mut args, "VISITOR_EXCEPTION", &self.visitor_exception);
        if let Some(dir) = &self.output_directory {
            args.push(format!("-OUTPUT_DIRECTORY={}", dir.display()));
        }
        if let Some(input) = &self.input_file {
            args.push(input.display().to_string());
        }
        Ok(args)
    }

    fn execute(&self) -> Result<i32, ToolError> {
        if self.input_file.is_none() {
            return Err(ToolError::NoInputFile { tool: self.name() });
        }
        if let Some(dir) = &self.output_directory {
            create_dir(dir)?;
        }
        self.launcher.execute(self.name(), &self.arguments()?)
    }
}
