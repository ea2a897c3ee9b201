//! Forked JVM execution with live output capture.
//!
//! Some tools in the JavaCC family call `System.exit` and can therefore not
//! be hosted in the current process; they run as `java -cp <classpath>
//! <MainClass> <args>` instead. Both output streams are drained on their own
//! threads while the child runs so neither pipe can fill up and stall it.

use super::{classpath, ToolError};
use log::{debug, Level};
use std::env;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

#[cfg(windows)]
const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: &str = ":";

/// Receives the lines of one child output stream.
pub trait StreamConsumer {
    fn consume_line(&mut self, line: &str);
}

/// Routes tool output to the log. The JavaCC tools prefix their diagnostics
/// with `Error: ` or `Warning: `; those markers pick the level and are
/// stripped from the message. Unmarked stderr output is logged as an error,
/// unmarked stdout output as debug chatter.
#[derive(Debug, Clone, Copy)]
pub struct LogStreamConsumer {
    err: bool,
}

impl LogStreamConsumer {
    pub fn stdout() -> Self {
        Self { err: false }
    }

    pub fn stderr() -> Self {
        Self { err: true }
    }
}

impl StreamConsumer for LogStreamConsumer {
    fn consume_line(&mut self, line: &str) {
        let (level, message) = classify(line, self.err);
        log::log!(level, "{}", message);
    }
}

/// Picks the log level for one line of tool output and strips the level
/// marker if there was one.
fn classify(line: &str, err: bool) -> (Level, &str) {
    if let Some(message) = line.strip_prefix("Error: ") {
        (Level::Error, message)
    } else if let Some(message) = line.strip_prefix("Warning: ") {
        (Level::Warn, message)
    } else if err {
        (Level::Error, line)
    } else {
        (Level::Debug, line)
    }
}

/// Builder for a forked `java` invocation.
#[derive(Debug, Clone, Default)]
pub struct ForkedJvm {
    java: Option<PathBuf>,
    working_directory: Option<PathBuf>,
    class_path: Vec<PathBuf>,
    main_class: Option<String>,
    args: Vec<String>,
}

impl ForkedJvm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `java` executable instead of the one found via
    /// `JAVA_HOME` or the search path.
    pub fn set_java(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.java = Some(path.into());
        self
    }

    pub fn set_working_directory(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Appends a class path entry unless it is already present; insertion
    /// order is preserved.
    pub fn add_class_path_entry(&mut self, entry: impl Into<PathBuf>) -> &mut Self {
        let entry = entry.into();
        if !self.class_path.contains(&entry) {
            self.class_path.push(entry);
        }
        self
    }

    /// Appends the class path root holding `resource`, derived from the
    /// resource's `file:` or `jar:file:` URL.
    pub fn add_class_path_url(&mut self, url: &str, resource: &str) -> Result<&mut Self, ToolError> {
        let root = classpath::resource_root(url, resource)?;
        Ok(self.add_class_path_entry(root))
    }

    pub fn set_main_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.main_class = Some(class.into());
        self
    }

    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    pub fn add_argument(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn add_arguments<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.args.push(arg.into());
        }
        self
    }

    /// The argument vector passed to `java`, without the executable itself.
    pub fn command_line(&self) -> Result<Vec<String>, ToolError> {
        let main_class = self.main_class.clone().ok_or(ToolError::NoMainClass)?;
        let mut args = Vec::new();
        if !self.class_path.is_empty() {
            let joined: Vec<String> = self
                .class_path
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            args.push("-cp".to_string());
            args.push(joined.join(PATH_LIST_SEPARATOR));
        }
        args.push(main_class);
        args.extend(self.args.iter().cloned());
        Ok(args)
    }

    /// Spawn the JVM, stream its output into the consumers and wait for the
    /// exit code.
    pub fn run(
        &self,
        tool: &'static str,
        stdout: &mut (dyn StreamConsumer + Send),
        stderr: &mut (dyn StreamConsumer + Send),
    ) -> Result<i32, ToolError> {
        let java = self.resolve_java()?;
        let args = self.command_line()?;
        debug!("Forking JVM: {} {:?}", java.display(), args);

        let mut command = Command::new(&java);
        command.args(&args);
        if let Some(dir) = &self.working_directory {
            command.current_dir(dir);
        }
        run_with_consumers(tool, command, stdout, stderr)
    }

    fn resolve_java(&self) -> Result<PathBuf, ToolError> {
        if let Some(java) = &self.java {
            return Ok(java.clone());
        }
        if let Ok(home) = env::var("JAVA_HOME") {
            let candidate = Path::new(&home).join("bin").join(java_executable_name());
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        which::which("java").map_err(|source| ToolError::Unavailable {
            program: "java".to_string(),
            source,
        })
    }
}

fn java_executable_name() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// Spawns `command` with piped output and feeds each stream line by line to
/// its consumer until the child exits.
pub(crate) fn run_with_consumers(
    tool: &'static str,
    mut command: Command,
    stdout: &mut (dyn StreamConsumer + Send),
    stderr: &mut (dyn StreamConsumer + Send),
) -> Result<i32, ToolError> {
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    let mut child = command
        .spawn()
        .map_err(|source| ToolError::Launch { tool, source })?;
    let status = drain(&mut child, stdout, stderr)
        .map_err(|source| ToolError::Launch { tool, source })?;
    // A signal death has no code; report it like a generic failure.
    Ok(status.code().unwrap_or(-1))
}

fn drain(
    child: &mut Child,
    stdout: &mut (dyn StreamConsumer + Send),
    stderr: &mut (dyn StreamConsumer + Send),
) -> std::io::Result<ExitStatus> {
    let out_pipe = child.stdout.take();
    let err_pipe = child.stderr.take();
    thread::scope(|scope| {
        let out_handle = scope.spawn(move || consume_stream(out_pipe, stdout));
        let err_handle = scope.spawn(move || consume_stream(err_pipe, stderr));
        let status = child.wait();
        // Reader threads finish once the pipes close; a panic there would be
        // a bug in a consumer, propagate it.
        if let Err(panic) = out_handle.join() {
            std::panic::resume_unwind(panic);
        }
        if let Err(panic) = err_handle.join() {
            std::panic::resume_unwind(panic);
        }
        status
    })
}

fn consume_stream(pipe: Option<impl Read>, consumer: &mut (dyn StreamConsumer + Send)) {
    if let Some(pipe) = pipe {
        let reader = BufReader::new(pipe);
        for line in reader.lines() {
            match line {
                Ok(line) => consumer.consume_line(&line),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sink {
        lines: Vec<String>,
    }

    impl StreamConsumer for Sink {
        fn consume_line(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }
    }

    #[test]
    fn marked_lines_pick_their_level_and_lose_the_prefix() {
        assert_eq!(classify("Error: boom", false), (Level::Error, "boom"));
        assert_eq!(classify("Error: boom", true), (Level::Error, "boom"));
        assert_eq!(
            classify("Warning: lookahead conflict", false),
            (Level::Warn, "lookahead conflict")
        );
    }

    #[test]
    fn unmarked_lines_follow_their_stream() {
        assert_eq!(classify("File generated.", false), (Level::Debug, "File generated."));
        assert_eq!(classify("stack trace", true), (Level::Error, "stack trace"));
    }

    #[test]
    fn command_line_orders_classpath_main_class_and_args() {
        let mut jvm = ForkedJvm::new();
        jvm.add_class_path_entry("/opt/javacc.jar")
            .set_main_class("org.javacc.jjdoc.JJDocMain")
            .add_argument("-TEXT=true")
            .add_argument("/tmp/Simple.jj");
        let args = jvm.command_line().unwrap();
        assert_eq!(
            args,
            vec![
                "-cp",
                "/opt/javacc.jar",
                "org.javacc.jjdoc.JJDocMain",
                "-TEXT=true",
                "/tmp/Simple.jj"
            ]
        );
    }

    #[test]
    fn class_path_entries_are_deduplicated_in_order() {
        let mut jvm = ForkedJvm::new();
        jvm.add_class_path_entry("/a.jar")
            .add_class_path_entry("/b.jar")
            .add_class_path_entry("/a.jar")
            .set_main_class("Main");
        let args = jvm.command_line().unwrap();
        assert_eq!(args[1], format!("/a.jar{}/b.jar", PATH_LIST_SEPARATOR));
    }

    #[test]
    fn missing_main_class_is_an_error() {
        let jvm = ForkedJvm::new();
        assert!(matches!(
            jvm.command_line(),
            Err(ToolError::NoMainClass)
        ));
    }

    #[test]
    fn class_path_url_resolves_to_jar_root() {
        let mut jvm = ForkedJvm::new();
        jvm.add_class_path_url(
            "jar:file:/opt/a%20b/javacc.jar!/org/javacc/jjdoc/JJDocMain.class",
            "org/javacc/jjdoc/JJDocMain.class",
        )
        .unwrap()
        .set_main_class("org.javacc.jjdoc.JJDocMain");
        let args = jvm.command_line().unwrap();
        assert_eq!(args[1], "/opt/a b/javacc.jar");
    }

    #[cfg(unix)]
    #[test]
    fn runs_child_and_captures_both_streams() {
        // Abuse the java override to run a shell instead of a JVM; the
        // stream handling is identical.
        let mut jvm = ForkedJvm::new();
        jvm.set_java("/bin/sh")
            .set_main_class("-c")
            .add_argument("echo out-line; echo err-line >&2; exit 3");
        let mut out = Sink::default();
        let mut err = Sink::default();
        let code = jvm.run("sh", &mut out, &mut err).unwrap();
        assert_eq!(code, 3);
        assert_eq!(out.lines, vec!["out-line"]);
        assert_eq!(err.lines, vec!["err-line"]);
    }
}
