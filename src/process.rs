//! External program invocation.
//!
//! Every program the pipeline runs (slicers, curl) is described by a
//! [CommandLine] whose arguments each carry a [Sensitivity]. The same
//! value renders both the argument vector handed to the OS and the line
//! written to the log, so credentials are redacted in one place.

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{error::Error, LogLevel};

/// How an argument is shown in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sensitivity {
    /// Shown unless logging is off.
    Plain,

    /// Shown only at [LogLevel::Verbose]; replaced by the placeholder at
    /// [LogLevel::Scrubbed].
    Secret(String),
}

/// A single argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    value: String,
    sensitivity: Sensitivity,
}

impl Arg {
    /// An argument that is safe to log.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            sensitivity: Sensitivity::Plain,
        }
    }

    /// An argument logged as `placeholder` unless logging is verbose.
    pub fn secret(value: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            sensitivity: Sensitivity::Secret(placeholder.into()),
        }
    }

    /// Value passed to the program.
    pub fn value(&self) -> &str {
        &self.value
    }

    fn rendered(&self, level: LogLevel) -> Option<&str> {
        match (level, &self.sensitivity) {
            (LogLevel::Quiet, _) => None,
            (LogLevel::Verbose, _) | (LogLevel::Scrubbed, Sensitivity::Plain) => Some(&self.value),
            (LogLevel::Scrubbed, Sensitivity::Secret(placeholder)) => Some(placeholder),
        }
    }
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<Arg>,
}

impl CommandLine {
    /// Run `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
        }
    }

    /// Append an argument that is safe to log.
    pub fn arg(&mut self, value: impl Into<String>) -> &mut Self {
        self.args.push(Arg::plain(value));
        self
    }

    /// Append several arguments that are safe to log.
    pub fn args<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(Arg::plain));
        self
    }

    /// Append an argument that is replaced by `placeholder` in scrubbed
    /// logs.
    pub fn secret(&mut self, value: impl Into<String>, placeholder: impl Into<String>) -> &mut Self {
        self.args.push(Arg::secret(value, placeholder));
        self
    }

    /// Append a path argument.
    pub fn path(&mut self, path: &Path) -> &mut Self {
        self.arg(path.to_string_lossy())
    }

    /// Program to run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Short name of the program, for error messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Argument values, in order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(Arg::value)
    }

    /// The command as it should appear in the log at `level`, `None` when
    /// nothing should be logged.
    pub fn redacted(&self, level: LogLevel) -> Option<String> {
        if level == LogLevel::Quiet {
            return None;
        }

        let mut line = quote(&self.program.to_string_lossy());
        for arg in &self.args {
            if let Some(rendered) = arg.rendered(level) {
                line.push(' ');
                line.push_str(&quote(rendered));
            }
        }
        Some(line)
    }
}

fn quote(value: &str) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) {
        format!("{:?}", value)
    } else {
        value.to_owned()
    }
}

/// Result of a finished program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Exit code, `None` when the program was killed by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl Completion {
    /// Did the program exit with status 0?
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something that can run a [CommandLine] to completion.
pub trait Runner {
    /// Run the command and wait for it to exit. An `Err` means the program
    /// could not be started at all; a non-zero exit is reported through
    /// [Completion].
    fn run(&self, command: &CommandLine) -> impl Future<Output = Result<Completion>>;
}

/// [Runner] that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    async fn run(&self, command: &CommandLine) -> Result<Completion> {
        let output = tokio::process::Command::new(command.program())
            .args(command.values())
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", command.program().display()))?;

        Ok(Completion {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Log `command` at `level`, then run it.
pub async fn run<R: Runner>(runner: &R, command: &CommandLine, level: LogLevel) -> Result<Completion> {
    if let Some(line) = command.redacted(level) {
        tracing::info!(command = line, "running");
    }
    let completion = runner.run(command).await?;
    tracing::debug!(
        program = command.program_name(),
        code = completion.code,
        stdout_bytes = completion.stdout.len(),
        "finished"
    );
    Ok(completion)
}

/// Run `command`, failing with [Error::Process] unless it exits 0.
pub async fn check<R: Runner>(runner: &R, command: &CommandLine, level: LogLevel) -> Result<Completion> {
    let completion = run(runner, command, level).await?;
    if !completion.success() {
        return Err(Error::Process {
            program: command.program_name(),
            code: completion.code,
            stderr: String::from_utf8_lossy(&completion.stderr).trim().to_owned(),
        }
        .into());
    }
    Ok(completion)
}

/// Run `command` and report whether it exited 0.
pub async fn probe<R: Runner>(runner: &R, command: &CommandLine, level: LogLevel) -> Result<bool> {
    Ok(run(runner, command, level).await?.success())
}

/// Path of an executable: `exec_dir/exec_name` when `exec_dir` is an
/// existing directory, otherwise `exec_name` looked up on `PATH`.
pub fn resolve_executable(exec_dir: &Path, exec_name: &str) -> PathBuf {
    if !exec_dir.as_os_str().is_empty() && exec_dir.is_dir() {
        exec_dir.join(exec_name)
    } else {
        PathBuf::from(exec_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upload() -> CommandLine {
        let mut command = CommandLine::new("curl");
        command
            .args(["-k", "--connect-timeout", "15", "-H"])
            .secret("X-Api-Key: hunter2", "X-Api-Key: X-API-KEY")
            .arg("-u")
            .secret("maker:s3cret", "USER:PASS")
            .args(["-F", "file=@/tmp/Cube A.gcode"])
            .secret("http://octopi:5000/api/files/local", "HOST/api/files/local");
        command
    }

    #[test]
    fn test_redacted_scrubbed() {
        assert_eq!(
            upload().redacted(LogLevel::Scrubbed).unwrap(),
            r#"curl -k --connect-timeout 15 -H "X-Api-Key: X-API-KEY" -u USER:PASS -F "file=@/tmp/Cube A.gcode" HOST/api/files/local"#
        );
    }

    #[test]
    fn test_redacted_verbose() {
        let line = upload().redacted(LogLevel::Verbose).unwrap();
        assert!(line.contains("hunter2"));
        assert!(line.contains("maker:s3cret"));
        assert!(line.contains("http://octopi:5000/api/files/local"));
    }

    #[test]
    fn test_redacted_quiet() {
        assert_eq!(upload().redacted(LogLevel::Quiet), None);
    }

    #[test]
    fn test_values_are_never_redacted() {
        let command = upload();
        let values: Vec<&str> = command.values().collect();
        assert!(values.contains(&"X-Api-Key: hunter2"));
        assert_eq!(values.len(), 10);
    }

    #[test]
    fn test_resolve_executable() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_executable(dir.path(), "slic3r"), dir.path().join("slic3r"));
        assert_eq!(
            resolve_executable(&dir.path().join("missing"), "slic3r"),
            PathBuf::from("slic3r")
        );
        assert_eq!(resolve_executable(Path::new(""), "curl"), PathBuf::from("curl"));
    }
}
