use std::path::Path;

use anyhow::Result;
use harmoryc_bootstrap::pipeline::Inspection;
use harmoryc_bootstrap::{Bootstrap, BootstrapOptions, SystemRunner, Target};
use harmoryc_core::config::LauncherConfig;

/// `harmoryc check`
///
/// Exit code 0 when a run (or a build, with `--build`) would proceed without
/// installing anything, 1 otherwise.
pub fn cmd_check(
    root: &Path,
    system: bool,
    build: bool,
    json: bool,
    config: &LauncherConfig,
) -> Result<i32> {
    let target = if build { Target::Package } else { Target::App };
    let options = BootstrapOptions::from_config(target, system, config)?;
    let report = Bootstrap::new(&SystemRunner, root, options).inspect();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprint!("{}", render(&report));
    }
    Ok(if report.ready() { 0 } else { 1 })
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

fn render(report: &Inspection) -> String {
    let mut out = String::new();
    let what = match report.target {
        Target::App => "run",
        Target::Package => "build",
    };
    out.push_str(&format!("🔍 HARMORYC launcher check for {} ({})\n\n", what, report.app_root));

    match (&report.interpreter, &report.python_version) {
        (Some(label), Some(version)) => {
            out.push_str(&format!("  ✓ Python: {} ({})\n", label, version));
        }
        _ => out.push_str("  ✗ Python: not found\n"),
    }
    if let (Some(required), Some(ok)) = (&report.required_version, report.version_ok) {
        out.push_str(&format!("  {} Version: >= {}\n", mark(ok), required));
    }

    out.push_str(&format!("  • Install mode: {}\n", report.install_mode));
    if let Some(env) = &report.environment {
        out.push_str(&format!("  • Environment: {}\n", env));
    }
    if let Some(source) = &report.manifest_source {
        out.push_str(&format!("  • Requirements: {}\n", source));
    }
    for module in &report.present {
        out.push_str(&format!("  ✓ {}\n", module));
    }
    for module in &report.missing {
        out.push_str(&format!("  ✗ {} (will be installed)\n", module));
    }

    for dir in &report.missing_dirs {
        out.push_str(&format!("  • {}/ missing (will be created)\n", dir));
    }
    out.push_str(&format!("  {} app.py\n", mark(report.entrypoint_present)));

    if let Some(err) = &report.error {
        out.push_str(&format!("\n  Error: {}\n", err));
    }
    out.push('\n');
    if report.ready() {
        out.push_str("✅ Ready to start.\n");
    } else {
        out.push_str("⚠ Not ready. Run `harmoryc` to install what is missing.\n");
    }
    out
}
