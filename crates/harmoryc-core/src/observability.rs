//! Tracing initialization.
//!
//! Reads `ObservabilityConfig` for HARMORYC_QUIET, HARMORYC_LOG_LEVEL and
//! HARMORYC_LOG_JSON. `RUST_LOG` wins over all of them when set.

use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::schema::DEFAULT_DIRECTIVES;
use crate::config::ObservabilityConfig;

/// Initialize the global subscriber. Call once at process startup; later
/// calls are ignored.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = filter_directives(cfg);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    // stdout belongs to the questionnaire.
    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

const QUIET_DIRECTIVES: &str = "harmoryc=warn,harmoryc_bootstrap=warn";

/// Filter directives used when `RUST_LOG` is unset.
fn filter_directives(cfg: &ObservabilityConfig) -> String {
    if cfg.quiet {
        QUIET_DIRECTIVES.to_string()
    } else if cfg.log_level.trim().is_empty() {
        DEFAULT_DIRECTIVES.to_string()
    } else {
        cfg.log_level.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(quiet: bool, log_level: &str) -> ObservabilityConfig {
        ObservabilityConfig {
            quiet,
            log_level: log_level.to_string(),
            log_json: false,
        }
    }

    #[test]
    fn test_quiet_overrides_level() {
        assert_eq!(filter_directives(&cfg(true, "harmoryc=trace")), QUIET_DIRECTIVES);
    }

    #[test]
    fn test_configured_level_is_used() {
        assert_eq!(filter_directives(&cfg(false, "harmoryc=debug")), "harmoryc=debug");
    }

    #[test]
    fn test_blank_level_falls_back_to_default() {
        assert_eq!(filter_directives(&cfg(false, "  ")), DEFAULT_DIRECTIVES);
    }

    #[test]
    fn test_directives_parse() {
        for level in [QUIET_DIRECTIVES, DEFAULT_DIRECTIVES] {
            assert!(EnvFilter::try_new(level).is_ok(), "{level}");
        }
    }
}
