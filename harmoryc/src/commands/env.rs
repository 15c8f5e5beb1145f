//! Environment management: remove the isolated `.venv` of an app root.
//!
//! The next `harmoryc run` recreates it and reinstalls the packages.

use std::fs;
use std::path::Path;

use anyhow::Result;
use harmoryc_bootstrap::env::IsolatedEnv;

/// `harmoryc clean-env`
pub fn cmd_clean(root: &Path, dry_run: bool, force: bool) -> Result<i32> {
    let env = IsolatedEnv::in_root(root);
    clean(&env, dry_run, force, confirm_on_stdin)?;
    Ok(0)
}

fn confirm_on_stdin() -> Result<bool> {
    eprint!("\nRemove the environment? [y/N] ");
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Returns true if the environment was removed.
fn clean(
    env: &IsolatedEnv,
    dry_run: bool,
    force: bool,
    confirm: impl FnOnce() -> Result<bool>,
) -> Result<bool> {
    if !env.exists() {
        eprintln!("No environment found at {}", env.path().display());
        return Ok(false);
    }

    let size = dir_size(env.path());
    eprintln!("🗂  Environment: {} ({})", env.path().display(), format_size(size));
    match env.read_marker() {
        Some(marker) => eprintln!(
            "   Python {}, installed {}",
            marker.python,
            marker.installed_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => eprintln!("   (incomplete: no completion marker)"),
    }

    if dry_run {
        eprintln!();
        eprintln!("(Dry run: nothing removed. Drop --dry-run to delete.)");
        return Ok(false);
    }

    if !force && !confirm()? {
        eprintln!("Cancelled.");
        return Ok(false);
    }

    env.remove()?;
    eprintln!();
    eprintln!("✓ Removed environment, freed {}", format_size(size));
    Ok(true)
}

/// Bytes owned by a directory tree. Symlinks are not followed: a venv links
/// `lib64 -> lib` and `bin/python` to the base interpreter.
fn dir_size(path: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(path) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| match entry.file_type() {
            Ok(ft) if ft.is_symlink() => 0,
            Ok(ft) if ft.is_dir() => dir_size(&entry.path()),
            Ok(_) => fs::symlink_metadata(entry.path()).map(|m| m.len()).unwrap_or(0),
            Err(_) => 0,
        })
        .sum()
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
