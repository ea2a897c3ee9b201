//! Facade for the tree-builder preprocessor of the JTB flavor.
//!
//! Like its sibling it rewrites an annotated grammar into a plain `.jj`
//! grammar, but it emits the syntax tree classes and visitor skeletons into
//! separate `syntaxtree`/`visitor` packages.

use super::{create_dir, push_opt, Launcher, Tool, ToolError};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Jtb {
    launcher: Launcher,
    pub input_file: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub node_directory: Option<PathBuf>,
    pub visitor_directory: Option<PathBuf>,
    pub node_package_name: Option<String>,
    pub visitor_package_name: Option<String>,
    pub suppress_error_checking: Option<bool>,
    pub javadoc_friendly_comments: Option<bool>,
    pub descriptive_field_names: Option<bool>,
    pub node_parent_class: Option<String>,
    pub parent_pointers: Option<bool>,
    pub special_tokens: Option<bool>,
    pub scheme: Option<bool>,
    pub printer: Option<bool>,
}

impl Jtb {
    pub fn new(launcher: Launcher) -> Self {
        Self {
            launcher,
            input_file: None,
            output_directory: None,
            node_directory: None,
            visitor_directory: None,
            node_package_name: None,
            visitor_package_name: None,
            suppress_error_checking: None,
            javadoc_friendly_comments: None,
            descriptive_field_names: None,
            node_parent_class: None,
            parent_pointers: None,
            special_tokens: None,
            scheme: None,
            printer: None,
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
            ("node directory", &self.node_directory),
            ("visitor directory", &self.visitor_directory),
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

impl Tool for Jtb {
    fn name(&self) -> &'static str {
        "jtb"
    }

    fn arguments(&self) -> Result<Vec<String>, ToolError> {
        self.check_paths()?;
        let mut args = Vec::new();
        push_opt(&mut args, "NODE_PACKAGE_NAME", &self.node_package_name);
        push_opt(&mut args, "VISITOR_PACKAGE_NAME", &self.visitor_package_name);
        push_opt(&mut args, "SUPPRESS_ERROR_CHECKING", &self.suppress_error_checking);
        push_opt(
            &mut args,
            "JAVADOC_FRIENDLY_COMMENTS",
            &self.javadoc_friendly_comments,
        );
        push_opt(
            &mut args,
            "DESCRIPTIVE_FIELD_NAMES",
            &self.descriptive_field_names,
        );
        push_opt(&mut args, "NODE_PARENT_CLASS", &self.node_parent_class);
        push_opt(&mut args, "PARENT_POINTERS", &self.parent_pointers);
        push_opt(&mut args, "SPECIAL_TOKENS", &self.special_tokens);
        push_opt(&mut args, "SCHEME", &self.scheme);
        push_opt(&mut args, "PRINTER", &self.printer);
        if let Some(dir) = &self.node_directory {
            args.push(format!("-NODE_DIRECTORY={}", dir.display()));
        }
        if let Some(dir) = &self.visitor_directory {
            args.push(format!("-VISITOR_DIRECTORY={}", dir.display()));
        }
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
        for dir in [
            &self.output_directory,
            &self.node_directory,
            &self.visitor_directory,
        ]
        .into_iter()
        .flatten()
        {
            create_dir(dir)?;
        }
        self.launcher.execute(self.name(), &self.arguments()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facade() -> Jtb {
        Jtb::new(Launcher::from_name("jtb"))
    }

    #[test]
    fn output_file_keeps_base_name_with_jj_extension() {
        let mut jtb = facade();
        jtb.input_file = Some(PathBuf::from("/src/Annotated.jtb"));
        jtb.output_directory = Some(PathBuf::from("/tmp/scratch"));
        assert_eq!(
            jtb.output_file(),
            Some(PathBuf::from("/tmp/scratch/Annotated.jj"))
        );
    }

    #[test]
    fn package_options_and_directories_are_emitted_when_set() {
        let mut jtb = facade();
        jtb.node_package_name = Some("org.demo.syntaxtree".to_string());
        jtb.visitor_package_name = Some("org.demo.visitor".to_string());
        jtb.node_directory = Some(PathBuf::from("/tmp/node"));
        jtb.input_file = Some(PathBuf::from("/src/Annotated.jtb"));
        let args = jtb.arguments().unwrap();
        assert_eq!(
            args,
            vec![
                "-NODE_PACKAGE_NAME=org.demo.syntaxtree",
                "-VISITOR_PACKAGE_NAME=org.demo.visitor",
                "-NODE_DIRECTORY=/tmp/node",
                "/src/Annotated.jtb"
            ]
        );
    }
}
