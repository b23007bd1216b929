//! Blocking execution of external tools.
//!
//! Every command's exit status is inspected: a non-zero exit becomes
//! [DeployError::Command] carrying the captured stderr, so callers decide
//! whether a failure aborts the workflow or is reported as a warning.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{DeployError, Result};

/// Captured stdout of a successful command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
}

impl CommandOutput {
    /// Non-empty trimmed stdout lines.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// A program invocation: program, arguments and optional working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Build from a command prefix such as `["docker", "compose"]`.
    pub fn from_prefix(prefix: &[String]) -> Result<Self> {
        let (program, rest) = prefix
            .split_first()
            .ok_or_else(|| DeployError::config("empty command"))?;
        Ok(Invocation::new(program).args(rest))
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run to completion, failing on a non-zero exit code.
    pub fn run(&self) -> Result<CommandOutput> {
        let rendered = self.to_string();
        tracing::debug!(command = %rendered, "running");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| DeployError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        if !output.status.success() {
            tracing::debug!(command = %rendered, code = ?output.status.code(), "command failed");
            return Err(DeployError::Command {
                command: rendered,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
