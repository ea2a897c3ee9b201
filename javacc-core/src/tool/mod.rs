//! Facades around the external JavaCC toolchain.
//!
//! Each tool gets a struct holding typed options; unset options are simply
//! not passed so the tool's own defaults apply. The grammar-transforming
//! tools (javacc, jjtree, jtb) run as native executables resolved through a
//! [`Launcher`]; jjdoc calls `System.exit` internally and therefore always
//! runs in a forked JVM.

pub mod classpath;
pub mod fork;
pub mod javacc;
pub mod jjdoc;
pub mod jjtree;
pub mod jtb;
pub mod launcher;

pub use fork::{ForkedJvm, LogStreamConsumer, StreamConsumer};
pub use javacc::JavaCc;
pub use jjdoc::JjDoc;
pub use jjtree::JjTree;
pub use jtb::Jtb;
pub use launcher::Launcher;

use log::debug;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool}: {what} is not an absolute path: {path}")]
    NotAbsolute {
        tool: &'static str,
        what: &'static str,
        path: PathBuf,
    },
    #[error("{tool}: no input file configured")]
    NoInputFile { tool: &'static str },
    #[error("could not locate `{program}` on the search path: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("no main class configured for forked JVM")]
    NoMainClass,
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{tool} reported exit code {code}: {args:?}")]
    Failed {
        tool: &'static str,
        code: i32,
        args: Vec<String>,
    },
    #[error("invalid class path URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Common run protocol for all tool facades.
pub trait Tool {
    /// Short tool name used in log and error messages.
    fn name(&self) -> &'static str;

    /// The argument vector in the tool's `-OPTION=VALUE` convention, with
    /// the input file last.
    fn arguments(&self) -> Result<Vec<String>, ToolError>;

    /// Launch the tool and wait for it, returning its exit code.
    fn execute(&self) -> Result<i32, ToolError>;

    /// Run the tool and turn a non-zero exit code into an error.
    fn run(&self) -> Result<(), ToolError> {
        let args = self.arguments()?;
        debug!("Running {}: {:?}", self.name(), args);
        let code = self.execute()?;
        if code != 0 {
            return Err(ToolError::Failed {
                tool: self.name(),
                code,
                args,
            });
        }
        Ok(())
    }
}

/// Formats one `-NAME=VALUE` argument.
pub(crate) fn opt(name: &str, value: impl std::fmt::Display) -> String {
    format!("-{}={}", name, value)
}

/// Pushes `-NAME=VALUE` when the option is set.
pub(crate) fn push_opt<T: std::fmt::Display>(args: &mut Vec<String>, name: &str, value: &Option<T>) {
    if let Some(value) = value {
        args.push(opt(name, value));
    }
}

pub(crate) fn create_dir(path: &std::path::Path) -> Result<(), ToolError> {
    std::fs::create_dir_all(path).map_err(|source| ToolError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
