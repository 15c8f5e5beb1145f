//! ProcessRunner trait: the seam between the gates and the operating system.
//!
//! Every gate talks to child processes through this trait. [`SystemRunner`]
//! is the real implementation; tests script a fake.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A command line to run: program, arguments and optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
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

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Arguments as lossy UTF-8, for logging and matching.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a command run with piped output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code; `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Extension point for locating and running child processes.
pub trait ProcessRunner {
    /// Resolve `program` on the search path (or check it directly when it
    /// is a path). `None` when it cannot be found.
    fn locate(&self, program: &Path) -> Option<PathBuf>;

    /// Run with stdout/stderr captured; stdin is closed.
    fn output(&self, cmd: &CommandSpec) -> io::Result<CapturedOutput>;

    /// Run with the console inherited and wait for completion. Returns the
    /// exit code, `None` when terminated by a signal.
    fn status(&self, cmd: &CommandSpec) -> io::Result<Option<i32>>;
}

/// Runs real processes via `std::process` and resolves programs with `which`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn locate(&self, program: &Path) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn output(&self, cmd: &CommandSpec) -> io::Result<CapturedOutput> {
        tracing::debug!(command = %cmd, "capturing");
        let out = cmd.to_command().stdin(Stdio::null()).output()?;
        Ok(CapturedOutput {
            code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }

    fn status(&self, cmd: &CommandSpec) -> io::Result<Option<i32>> {
        tracing::debug!(command = %cmd, "running");
        let status = cmd.to_command().status()?;
        Ok(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_display() {
        let cmd = CommandSpec::new("python3")
            .args(["-m", "pip", "install"])
            .arg("flet")
            .current_dir("/tmp");
        assert_eq!(cmd.to_string(), "python3 -m pip install flet");
        assert_eq!(cmd.arg_strings(), vec!["-m", "pip", "install", "flet"]);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_system_runner_locate_missing() {
        assert!(SystemRunner
            .locate(Path::new("harmoryc-definitely-not-a-real-program"))
            .is_none());
    }
}
