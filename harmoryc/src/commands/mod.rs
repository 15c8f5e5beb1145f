//! Subcommand handlers. Each returns the process exit code on success.
//!
//!   run       - gates 1-4, then start app.py
//!   build     - gates 1-4 with the 3.9 floor, then PyInstaller
//!   check     - read-only report of gates 1-4
//!   clean-env - remove the isolated .venv

pub mod build;
pub mod check;
pub mod env;
pub mod run;
