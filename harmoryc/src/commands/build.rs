use std::path::Path;

use anyhow::Result;
use harmoryc_bootstrap::{Bootstrap, BootstrapOptions, SystemRunner, Target};
use harmoryc_core::config::LauncherConfig;

/// `harmoryc build`
pub fn cmd_build(root: &Path, system: bool, config: &LauncherConfig) -> Result<i32> {
    let options = BootstrapOptions::from_config(Target::Package, system, config)?;
    eprintln!("📦 Building HARMORYC standalone executable in {}", root.display());
    eprintln!();
    let code = Bootstrap::new(&SystemRunner, root, options).run()?;
    Ok(code)
}
