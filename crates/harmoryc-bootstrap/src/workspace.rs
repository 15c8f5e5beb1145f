//! App root resolution and the working-directory gate.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BootstrapError;

/// Entry script of the questionnaire.
pub const ENTRYPOINT: &str = "app.py";

/// Directories the questionnaire expects next to `app.py`.
pub const REQUIRED_DIRS: &[&str] = &["assets", "sessions"];

/// Pick the app root: explicit flag, then `HARMORYC_APP_DIR`, then the
/// launcher's own directory when it holds `app.py`, then the current dir.
pub fn resolve_app_root(
    flag: Option<&str>,
    configured: Option<&str>,
    exe_dir: Option<&Path>,
    current_dir: &Path,
) -> PathBuf {
    if let Some(dir) = flag.or(configured) {
        let dir = PathBuf::from(dir);
        return if dir.is_absolute() {
            dir
        } else {
            current_dir.join(dir)
        };
    }
    if let Some(dir) = exe_dir {
        if dir.join(ENTRYPOINT).is_file() {
            return dir.to_path_buf();
        }
    }
    current_dir.to_path_buf()
}

/// Directory containing the running launcher binary.
pub fn current_exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

/// Force the working directory to the app root.
pub fn enter_app_root(root: &Path) -> Result<(), BootstrapError> {
    std::env::set_current_dir(root)
        .map_err(|e| BootstrapError::io(format!("change directory to {}", root.display()), e))?;
    tracing::debug!(root = %root.display(), "entered app root");
    Ok(())
}

/// Gate 4: create each directory under `root` if missing. Returns the ones
/// created during this call. A file in the way is an error.
pub fn ensure_dirs(root: &Path, names: &[&str]) -> Result<Vec<PathBuf>, BootstrapError> {
    let mut created = Vec::new();
    for name in names {
        let dir = root.join(name);
        if dir.is_dir() {
            continue;
        }
        fs::create_dir_all(&dir)
            .map_err(|e| BootstrapError::io(format!("create {}", dir.display()), e))?;
        tracing::info!(dir = %dir.display(), "created");
        created.push(dir);
    }
    Ok(created)
}
