//! Interpreter discovery: pick the first usable Python command on PATH.
//!
//! Preference order follows the platform: the `py -3` launcher on Windows,
//! `python3` elsewhere, then plain `python` everywhere. An explicit command
//! from configuration is tried before the built-in list.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::BootstrapError;
use crate::process::{CommandSpec, ProcessRunner};
use crate::version::PythonVersion;

/// An interpreter command that might exist: program plus leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub program: String,
    pub args: Vec<String>,
}

impl Candidate {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Split a configured command such as `py -3.11` on whitespace.
    /// Returns `None` for a blank string.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace();
        let program = parts.next()?.to_string();
        Some(Self {
            program,
            args: parts.map(String::from).collect(),
        })
    }

    pub fn label(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Built-in candidates, most preferred first.
pub fn default_candidates() -> Vec<Candidate> {
    if cfg!(windows) {
        vec![Candidate::new("py", &["-3"]), Candidate::new("python", &[])]
    } else {
        vec![Candidate::new("python3", &[]), Candidate::new("python", &[])]
    }
}

/// Candidate list with an optional configured command in front.
pub fn candidates_with_override(python: Option<&str>) -> Vec<Candidate> {
    let mut list = Vec::new();
    if let Some(c) = python.and_then(Candidate::parse) {
        list.push(c);
    }
    for c in default_candidates() {
        if !list.contains(&c) {
            list.push(c);
        }
    }
    list
}

/// A resolved, working interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    /// Absolute program path as located on PATH.
    pub program: PathBuf,
    /// Leading arguments (e.g. `-3` for the Windows launcher).
    pub args: Vec<String>,
    /// How the user would type it, for messages.
    pub label: String,
    pub version: PythonVersion,
}

impl Interpreter {
    /// Command line `<program> <leading args> <extra>`.
    pub fn command<I, S>(&self, extra: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        CommandSpec::new(&self.program)
            .args(self.args.iter().map(OsString::from))
            .args(extra)
    }
}

/// Probe one candidate: it must be locatable and answer `--version` with
/// exit 0 and a parsable version.
pub fn probe_candidate<R: ProcessRunner + ?Sized>(
    runner: &R,
    candidate: &Candidate,
) -> Option<Interpreter> {
    let program = runner.locate(Path::new(&candidate.program))?;
    let cmd = CommandSpec::new(&program)
        .args(candidate.args.iter().map(OsString::from))
        .arg("--version");
    let out = match runner.output(&cmd) {
        Ok(out) => out,
        Err(e) => {
            tracing::debug!(candidate = %candidate.label(), error = %e, "probe failed to spawn");
            return None;
        }
    };
    if !out.success() {
        tracing::debug!(candidate = %candidate.label(), code = ?out.code, "probe exited non-zero");
        return None;
    }
    let version = PythonVersion::from_version_output(&out.stdout)
        .or_else(|| PythonVersion::from_version_output(&out.stderr))?;
    Some(Interpreter {
        program,
        args: candidate.args.clone(),
        label: candidate.label(),
        version,
    })
}

/// Gate 1: first candidate that probes successfully, or
/// [`BootstrapError::InterpreterNotFound`].
pub fn resolve_interpreter<R: ProcessRunner + ?Sized>(
    runner: &R,
    candidates: &[Candidate],
) -> Result<Interpreter, BootstrapError> {
    for candidate in candidates {
        if let Some(interp) = probe_candidate(runner, candidate) {
            tracing::info!(
                interpreter = %interp.label,
                version = %interp.version,
                path = %interp.program.display(),
                "resolved interpreter"
            );
            return Ok(interp);
        }
    }
    Err(BootstrapError::InterpreterNotFound {
        tried: candidates
            .iter()
            .map(Candidate::label)
            .collect::<Vec<_>>()
            .join(", "),
    })
}
