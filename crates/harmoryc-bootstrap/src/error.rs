use std::path::PathBuf;

use thiserror::Error;

use crate::version::PythonVersion;

/// Exit status for failures that carry no child exit code.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Terminal failures of the bootstrap gates.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Python was not found on PATH (tried: {tried}). Install Python 3 and retry.")]
    InterpreterNotFound { tried: String },

    #[error("Python {detected} detected, but Python {required} or newer is required")]
    VersionTooLow {
        detected: PythonVersion,
        required: PythonVersion,
    },

    #[error("dependency installation failed: {step} exited with code {code}")]
    DependencyInstallFailed { step: String, code: i32 },

    #[error("modules still missing after installation: {0}")]
    DependenciesStillMissing(String),

    #[error("build failed with code {code}")]
    BuildFailed { code: i32 },

    #[error("entrypoint not found: {}", .0.display())]
    EntrypointMissing(PathBuf),

    #[error("invalid setting {key}={value}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit status for this failure: the wrapped tool's own code
    /// where one exists, otherwise [`FAILURE_EXIT_CODE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DependencyInstallFailed { code, .. } | Self::BuildFailed { code } => {
                nonzero(*code)
            }
            _ => FAILURE_EXIT_CODE,
        }
    }
}

/// Map a child's exit status to a launcher exit code. `None` (terminated by
/// a signal) becomes [`FAILURE_EXIT_CODE`].
pub fn exit_code_of(status: Option<i32>) -> i32 {
    status.unwrap_or(FAILURE_EXIT_CODE)
}

fn nonzero(code: i32) -> i32 {
    if code == 0 {
        FAILURE_EXIT_CODE
    } else {
        code
    }
}
