//! Facade for the grammar documentation generator.
//!
//! The documentation generator terminates its host process when done, so it
//! always runs in a forked JVM rather than as a native executable.

use super::fork::{ForkedJvm, LogStreamConsumer};
use super::{create_dir, push_opt, Tool, ToolError};
use std::path::PathBuf;

pub const DEFAULT_MAIN_CLASS: &str = "org.javacc.jjdoc.JJDocMain";

#[derive(Debug, Clone)]
pub struct JjDoc {
    jvm: ForkedJvm,
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub grammar_encoding: Option<String>,
    pub output_encoding: Option<String>,
    pub css_href: Option<String>,
    pub text: Option<bool>,
    pub bnf: Option<bool>,
    pub one_table: Option<bool>,
}

impl JjDoc {
    /// Wrap a pre-configured JVM. The caller is responsible for the class
    /// path; the main class defaults to [`DEFAULT_MAIN_CLASS`] unless the
    /// JVM already names one.
    pub fn new(jvm: ForkedJvm) -> Self {
        Self {
            jvm,
            input_file: None,
            output_file: None,
            grammar_encoding: None,
            output_encoding: None,
            css_href: None,
            text: None,
            bnf: None,
            one_table: None,
        }
    }

    fn check_paths(&self) -> Result<(), ToolError> {
        for (what, path) in [
            ("input file", &self.input_file),
            ("output file", &self.output_file),
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

impl Tool for JjDoc {
    fn name(&self) -> &'static str {
        "jjdoc"
    }

    fn arguments(&self) -> Result<Vec<String>, ToolError> {
        self.check_paths()?;
        let mut args = Vec::new();
        push_opt(&mut args, "GRAMMAR_ENCODING", &self.grammar_encoding);
        push_opt(&mut args, "OUTPUT_ENCODING", &self.output_encoding);
        push_opt(&mut args, "TEXT", &self.text);
        push_opt(&mut args, "BNF", &self.bnf);
        push_opt(&mut args, "ONE_TABLE", &self.one_table);
        if let Some(output) = &self.output_file {
            args.push(format!("-OUTPUT_FILE={}", output.display()));
        }
        push_opt(&mut args, "CSS", &self.css_href);
        if let Some(input) = &self.input_file {
            args.push(input.display().to_string());
        }
        Ok(args)
    }

    fn execute(&self) -> Result<i32, ToolError> {
        if self.input_file.is_none() {
            return Err(ToolError::NoInputFile { tool: self.name() });
        }
        if let Some(parent) = self.output_file.as_ref().and_then(|f| f.parent()) {
            create_dir(parent)?;
        }
        let mut jvm = self.jvm.clone();
        if jvm.main_class().is_none() {
            jvm.set_main_class(DEFAULT_MAIN_CLASS);
        }
        jvm.add_arguments(self.arguments()?);
        jvm.run(
            self.name(),
            &mut LogStreamConsumer::stdout(),
            &mut LogStreamConsumer::stderr(),
        )
    }
}
