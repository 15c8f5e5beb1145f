//! Standalone executable packaging with PyInstaller.
//!
//! Tries a single-file build first and falls back to a one-folder build.
//! Output goes to `dist/` under the app root.

use std::path::Path;

use crate::error::{exit_code_of, BootstrapError};
use crate::interpreter::Interpreter;
use crate::process::{CommandSpec, ProcessRunner};
use crate::workspace::ENTRYPOINT;

pub const APP_NAME: &str = "HARMORYC_Questionnaire";

/// Bundled next to the executable when present.
pub const EXTRA_FILES: &[&str] = &[
    "assets",
    "sessions",
    "experiment_data.json",
    "questions_config.json",
];

/// PyInstaller output directory.
pub const DIST_DIR: &str = "dist";

/// Separator between source and destination in `--add-data`.
#[cfg(windows)]
const ADD_DATA_SEP: char = ';';
#[cfg(not(windows))]
const ADD_DATA_SEP: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleLayout {
    OneFile,
    OneDir,
}

impl BundleLayout {
    fn flag(self) -> &'static str {
        match self {
            Self::OneFile => "--onefile",
            Self::OneDir => "--onedir",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::OneFile => "onefile",
            Self::OneDir => "onedir",
        }
    }
}

/// `--add-data` values for the extra files that exist under `root`.
pub fn add_data_args(root: &Path) -> Vec<String> {
    EXTRA_FILES
        .iter()
        .filter(|name| root.join(name).exists())
        .map(|name| format!("{}{}{}", name, ADD_DATA_SEP, name))
        .collect()
}

/// Full PyInstaller command for one layout.
pub fn pyinstaller_command(interp: &Interpreter, root: &Path, layout: BundleLayout) -> CommandSpec {
    let mut args: Vec<String> = vec![
        "-m".into(),
        "PyInstaller".into(),
        "--noconsole".into(),
        "--clean".into(),
        "--name".into(),
        APP_NAME.into(),
        layout.flag().into(),
    ];
    for data in add_data_args(root) {
        args.push("--add-data".into());
        args.push(data);
    }
    args.push(ENTRYPOINT.into());
    interp.command(args).current_dir(root)
}

/// Build the standalone executable. Returns the layout that succeeded or
/// [`BootstrapError::BuildFailed`] with the last exit code.
pub fn build_standalone<R: ProcessRunner + ?Sized>(
    runner: &R,
    interp: &Interpreter,
    root: &Path,
) -> Result<BundleLayout, BootstrapError> {
    let entry = root.join(ENTRYPOINT);
    if !entry.is_file() {
        return Err(BootstrapError::EntrypointMissing(entry));
    }

    let mut last_code = 0;
    for layout in [BundleLayout::OneFile, BundleLayout::OneDir] {
        if layout == BundleLayout::OneDir {
            eprintln!("⚠ Onefile build failed. Falling back to onedir...");
        }
        let cmd = pyinstaller_command(interp, root, layout);
        eprintln!("Running: {}", cmd);
        let status = runner
            .status(&cmd)
            .map_err(|e| BootstrapError::io("run PyInstaller", e))?;
        last_code = exit_code_of(status);
        if last_code == 0 {
            tracing::info!(layout = layout.describe(), dist = %root.join(DIST_DIR).display(), "build complete");
            return Ok(layout);
        }
        tracing::warn!(layout = layout.describe(), code = last_code, "build attempt failed");
    }
    Err(BootstrapError::BuildFailed { code: last_code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{resolve_interpreter, Candidate};
    use crate::testing::FakeRunner;
    use std::fs;

    fn project(runner: &FakeRunner) -> (tempfile::TempDir, Interpreter) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(ENTRYPOINT), "").unwrap();
        let interp = resolve_interpreter(runner, &[Candidate::new("python3", &[])]).unwrap();
        (tmp, interp)
    }

    #[test]
    fn test_add_data_only_for_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("assets")).unwrap();
        fs::write(tmp.path().join("experiment_data.json"), "{}").unwrap();

        let args = add_data_args(tmp.path());

        assert_eq!(
            args,
            vec![
                format!("assets{}assets", ADD_DATA_SEP),
                format!("experiment_data.json{}experiment_data.json", ADD_DATA_SEP),
            ]
        );
    }

    #[test]
    fn test_pyinstaller_command_shape() {
        let runner = FakeRunner::new().with_python("python3", "Python 3.11.4");
        let (tmp, interp) = project(&runner);
        fs::create_dir_all(tmp.path().join("sessions")).unwrap();

        let cmd = pyinstaller_command(&interp, tmp.path(), BundleLayout::OneFile);

        assert_eq!(
            cmd.arg_strings(),
            vec![
                "-m".to_string(),
                "PyInstaller".to_string(),
                "--noconsole".to_string(),
                "--clean".to_string(),
                "--name".to_string(),
                APP_NAME.to_string(),
                "--onefile".to_string(),
                "--add-data".to_string(),
                format!("sessions{}sessions", ADD_DATA_SEP),
                ENTRYPOINT.to_string(),
            ]
        );
        assert_eq!(cmd.cwd.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn test_onefile_success_skips_onedir() {
        let runner = FakeRunner::new().with_python("python3", "Python 3.11.4");
        let (tmp, interp) = project(&runner);

        let layout = build_standalone(&runner, &interp, tmp.path()).unwrap();

        assert_eq!(layout, BundleLayout::OneFile);
        assert_eq!(runner.build_calls().len(), 1);
    }

    #[test]
    fn test_falls_back_to_onedir() {
        let runner = FakeRunner::new()
            .with_python("python3", "Python 3.11.4")
            .with_build_exits(&[1, 0]);
        let (tmp, interp) = project(&runner);

        let layout = build_standalone(&runner, &interp, tmp.path()).unwrap();

        assert_eq!(layout, BundleLayout::OneDir);
        let calls = runner.build_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains(&"--onefile".to_string()));
        assert!(calls[1].contains(&"--onedir".to_string()));
    }

    #[test]
    fn test_both_layouts_fail_propagates_last_code() {
        let runner = FakeRunner::new()
            .with_python("python3", "Python 3.11.4")
            .with_build_exits(&[1, 4]);
        let (tmp, interp) = project(&runner);

        let err = build_standalone(&runner, &interp, tmp.path()).unwrap_err();

        assert!(matches!(err, BootstrapError::BuildFailed { code: 4 }));
        assert_eq!(err.exit_code(), 4);
    }
}
