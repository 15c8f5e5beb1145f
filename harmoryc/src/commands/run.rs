use std::path::Path;

use anyhow::Result;
use harmoryc_bootstrap::{Bootstrap, BootstrapOptions, SystemRunner, Target};
use harmoryc_core::config::LauncherConfig;

/// `harmoryc run` (and the no-argument default)
pub fn cmd_run(root: &Path, system: bool, config: &LauncherConfig) -> Result<i32> {
    let options = BootstrapOptions::from_config(Target::App, system, config)?;
    eprintln!("🚀 Starting HARMORYC questionnaire from {}", root.display());
    eprintln!();
    let code = Bootstrap::new(&SystemRunner, root, options).run()?;
    Ok(code)
}
