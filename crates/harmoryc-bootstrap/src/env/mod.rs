//! Package environment: where missing requirements get installed.
//!
//! Callers pass the base interpreter and the manifest; this module installs
//! into the system interpreter or a `.venv` under the app root and returns
//! the interpreter the questionnaire should run with.

pub mod builder;

pub use builder::{ensure_dependencies, InstallMode, IsolatedEnv};
