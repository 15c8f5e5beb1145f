//! Typed configuration read from the environment.

use super::env_keys::{launcher as launcher_keys, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or};

/// Launcher settings. Every field is optional; CLI flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherConfig {
    pub app_dir: Option<String>,
    pub python: Option<String>,
    pub min_python: Option<String>,
    pub install_mode: Option<String>,
    pub no_pause: bool,
}

impl LauncherConfig {
    /// Read fresh on every call so `.env` loaded after startup is honored.
    pub fn from_env() -> Self {
        Self {
            app_dir: env_optional(launcher_keys::HARMORYC_APP_DIR, &[]),
            python: env_optional(launcher_keys::HARMORYC_PYTHON, launcher_keys::PYTHON_ALIASES),
            min_python: env_optional(launcher_keys::HARMORYC_MIN_PYTHON, &[]),
            install_mode: env_optional(launcher_keys::HARMORYC_INSTALL_MODE, &[]),
            no_pause: env_bool(launcher_keys::HARMORYC_NO_PAUSE, &[], false),
        }
    }
}

/// Log filter when neither `RUST_LOG` nor HARMORYC_LOG_LEVEL is set.
pub const DEFAULT_DIRECTIVES: &str = "harmoryc=info,harmoryc_bootstrap=info";

/// Logging settings.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::HARMORYC_QUIET, &[], false),
                log_level: env_or(obv_keys::HARMORYC_LOG_LEVEL, &[], || {
                    DEFAULT_DIRECTIVES.to_string()
                }),
                log_json: env_bool(obv_keys::HARMORYC_LOG_JSON, &[], false),
            }
        })
    }
}
