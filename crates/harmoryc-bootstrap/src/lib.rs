//! Bootstrapper for the HARMORYC questionnaire.
//!
//! A linear chain of gates, each a precondition for the next:
//! interpreter search → version check → dependency check (and install) →
//! working directories → launch `app.py` or package it with PyInstaller.
//! Any failed gate ends the run with a [`BootstrapError`].

pub mod deps;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod launch;
pub mod package;
pub mod pipeline;
pub mod process;
pub mod version;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use error::BootstrapError;
pub use pipeline::{Bootstrap, BootstrapOptions, Target};
pub use process::{ProcessRunner, SystemRunner};
