//! Facade for the parser generator executable.

use super::{create_dir, push_opt, Launcher, Tool, ToolError};
use std::path::PathBuf;

/// Typed options for one parser generator run. Only the options that are
/// set end up on the command line, so settings made inside the grammar file
/// itself stay in effect.
#[derive(Debug, Clone)]
pub struct JavaCc {
    launcher: Launcher,
    pub input_file: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub grammar_encoding: Option<String>,
    pub jdk_version: Option<String>,
    pub lookahead: Option<u32>,
    pub choice_ambiguity_check: Option<u32>,
    pub other_ambiguity_check: Option<u32>,
    pub is_static: Option<bool>,
    pub debug_parser: Option<bool>,
    pub debug_lookahead: Option<bool>,
    pub debug_token_manager: Option<bool>,
    pub error_reporting: Option<bool>,
    pub java_unicode_escape: Option<bool>,
    pub unicode_input: Option<bool>,
    pub ignore_case: Option<bool>,
    pub common_token_action: Option<bool>,
    pub user_token_manager: Option<bool>,
    pub user_char_stream: Option<bool>,
    pub build_parser: Option<bool>,
    pub build_token_manager: Option<bool>,
    pub token_manager_uses_parser: Option<bool>,
    pub token_extends: Option<String>,
    pub token_factory: Option<String>,
    pub sanity_check: Option<bool>,
    pub force_la_check: Option<bool>,
    pub cache_tokens: Option<bool>,
    pub keep_line_column: Option<bool>,
    pub support_class_visibility_public: Option<bool>,
}

impl JavaCc {
    pub fn new(launcher: Launcher) -> Self {
        Self {
            launcher,
            input_file: None,
            output_directory: None,
            grammar_encoding: None,
            jdk_version: None,
            lookahead: None,
            choice_ambiguity_check: None,
            other_ambiguity_check: None,
            is_static: None,
            debug_parser: None,
            debug_lookahead: None,
            debug_token_manager: None,
            error_reporting: None,
            java_unicode_escape: None,
            unicode_input: None,
            ignore_case: None,
            common_token_action: None,
            user_token_manager: None,
            user_char_stream: None,
            build_parser: None,
            build_token_manager: None,
            token_manager_uses_parser: None,
            token_extends: None,
            token_factory: None,
            sanity_check: None,
            force_la_check: None,
            cache_tokens: None,
            keep_line_column: None,
            support_class_visibility_public: None,
        }
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

impl Tool for JavaCc {
    fn name(&self) -> &'static str {
        "javacc"
    }

    fn arguments(&self) -> Result<Vec<String>, ToolError> {
        self.check_paths()?;
        let mut args = Vec::new();
        push_opt(&mut args, "GRAMMAR_ENCODING", &self.grammar_encoding);
        push_opt(&mut args, "JDK_VERSION", &self.jdk_version);
        push_opt(&mut args, "LOOKAHEAD", &self.lookahead);
        push_opt(&mut args, "CHOICE_AMBIGUITY_CHECK", &self.choice_ambiguity_check);
        push_opt(&mut args, "OTHER_AMBIGUITY_CHECK", &self.other_ambiguity_check);
        push_opt(&mut args, "STATIC", &self.is_static);
        push_opt(&mut args, "DEBUG_PARSER", &self.debug_parser);
        push_opt(&mut args, "DEBUG_LOOKAHEAD", &self.debug_lookahead);
        push_opt(&mut args, "DEBUG_TOKEN_MANAGER", &self.debug_token_manager);
        push_opt(&mut args, "ERROR_REPORTING", &self.error_reporting);
        push_opt(&mut args, "JAVA_UNICODE_ESCAPE", &self.java_unicode_escape);
        push_opt(&mut args, "UNICODE_INPUT", &self.unicode_input);
        push_opt(&mut args, "IGNORE_CASE", &self.ignore_case);
        push_opt(&mut args, "COMMON_TOKEN_ACTION", &self.common_token_action);
        push_opt(&mut args, "USER_TOKEN_MANAGER", &self.user_token_manager);
        push_opt(&mut args, "USER_CHAR_STREAM", &self.user_char_stream);
        push_opt(&mut args, "BUILD_PARSER", &self.build_parser);
        push_opt(&mut args, "BUILD_TOKEN_MANAGER", &self.build_token_manager);
        push_opt(&mut args, "TOKEN_MANAGER_USES_PARSER", &self.token_manager_uses_parser);
        push_opt(&mut args, "TOKEN_EXTENDS", &self.token_extends);
        push_opt(&mut args, "TOKEN_FACTORY", &self.token_factory);
        push_opt(&mut args, "SANITY_CHECK", &self.sanity_check);
        push_opt(&mut args, "FORCE_LA_CHECK", &self.force_la_check);
        push_opt(&mut args, "CACHE_TOKENS", &self.cache_tokens);
        push_opt(&mut args, "KEEP_LINE_COLUMN", &self.keep_line_column);
        push_opt(
            &mut args,
            "SUPPORT_CLASS_VISIBILITY_PUBLIC",
            &self.support_class_visibility_public,
        );
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
