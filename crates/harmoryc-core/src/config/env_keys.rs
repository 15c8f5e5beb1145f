//! Environment variable keys.
//!
//! Primary keys are `HARMORYC_*`. Alias lists are consulted in order when the
//! primary key is unset.

/// Where the questionnaire lives and how it is bootstrapped.
pub mod launcher {
    /// App root containing `app.py`. Overrides the executable-dir heuristic.
    pub const HARMORYC_APP_DIR: &str = "HARMORYC_APP_DIR";

    /// Interpreter command to try before the built-in candidates, e.g. `py -3.11`.
    pub const HARMORYC_PYTHON: &str = "HARMORYC_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["PYTHON"];

    /// Minimum interpreter version such as `3.9`. Unset means no gate for `run`.
    pub const HARMORYC_MIN_PYTHON: &str = "HARMORYC_MIN_PYTHON";

    /// `isolated` (default, `.venv` under the app root) or `system`.
    pub const HARMORYC_INSTALL_MODE: &str = "HARMORYC_INSTALL_MODE";

    /// Skip the "Press Enter" prompt on failure.
    pub const HARMORYC_NO_PAUSE: &str = "HARMORYC_NO_PAUSE";
}

/// Logging.
pub mod observability {
    pub const HARMORYC_QUIET: &str = "HARMORYC_QUIET";
    pub const HARMORYC_LOG_LEVEL: &str = "HARMORYC_LOG_LEVEL";
    pub const HARMORYC_LOG_JSON: &str = "HARMORYC_LOG_JSON";
}
