//! Resolution and execution of native tool executables.

use super::fork::{run_with_consumers, LogStreamConsumer};
use super::ToolError;
use std::path::PathBuf;
use std::process::Command;

/// Where to find a tool executable: an explicit path from configuration, or
/// a program name resolved through the search path at run time.
#[derive(Debug, Clone)]
pub enum Launcher {
    Path(PathBuf),
    Name(String),
}

impl Launcher {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Launcher::Path(path.into())
    }

    pub fn from_name(name: impl Into<String>) -> Self {
        Launcher::Name(name.into())
    }

    /// The executable to launch. Name launchers hit the search path here,
    /// so an uninstalled tool surfaces as [`ToolError::Unavailable`] instead
    /// of a spawn failure.
    pub fn resolve(&self) -> Result<PathBuf, ToolError> {
        match self {
            Launcher::Path(path) => Ok(path.clone()),
            Launcher::Name(name) => which::which(name).map_err(|source| ToolError::Unavailable {
                program: name.clone(),
                source,
            }),
        }
    }

    /// Launch the executable with `args`, routing its output through the
    /// standard log classification, and return the exit code.
    pub fn execute(&self, tool: &'static str, args: &[String]) -> Result<i32, ToolError> {
        let executable = self.resolve()?;
        let mut command = Command::new(executable);
        command.args(args);
        run_with_consumers(
            tool,
            command,
            &mut LogStreamConsumer::stdout(),
            &mut LogStreamConsumer::stderr(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_launcher_resolves_to_itself() {
        let launcher = Launcher::from_path("/opt/javacc/bin/javacc");
        assert_eq!(
            launcher.resolve().unwrap(),
            PathBuf::from("/opt/javacc/bin/javacc")
        );
    }

    #[test]
    fn unknown_program_name_is_unavailable() {
        let launcher = Launcher::from_name("definitely-not-a-real-tool-name");
        assert!(matches!(
            launcher.resolve(),
            Err(ToolError::Unavailable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn execute_returns_the_exit_code() {
        let launcher = Launcher::from_path("/bin/sh");
        let args = vec!["-c".to_string(), "exit 7".to_string()];
        assert_eq!(launcher.execute("sh", &args).unwrap(), 7);
    }
}
