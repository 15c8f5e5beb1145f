//! Install missing requirements, either into an isolated `.venv` under the
//! app root or into the system interpreter's site-packages.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deps::{join_modules, missing_requirements, DependencyManifest, Requirement};
use crate::error::{exit_code_of, BootstrapError};
use crate::interpreter::{probe_candidate, Candidate, Interpreter};
use crate::process::ProcessRunner;

/// Isolated environment location, relative to the app root.
pub const VENV_DIR: &str = ".venv";

/// Marker file written once the environment matches the manifest.
const ENV_MARKER_FILE: &str = ".harmoryc_complete";

/// Where installation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallMode {
    /// `.venv` under the app root; the system environment is never touched.
    #[default]
    Isolated,
    /// `pip install` into the resolved system interpreter.
    System,
}

impl InstallMode {
    /// `--system` wins; otherwise the configured value; otherwise isolated.
    pub fn resolve(system_flag: bool, configured: Option<&str>) -> Result<Self, BootstrapError> {
        if system_flag {
            return Ok(Self::System);
        }
        match configured {
            Some(value) => value.parse().map_err(|reason| BootstrapError::InvalidSetting {
                key: harmoryc_core::config::env_keys::launcher::HARMORYC_INSTALL_MODE.to_string(),
                value: value.to_string(),
                reason,
            }),
            None => Ok(Self::default()),
        }
    }
}

impl FromStr for InstallMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolated" | "venv" => Ok(Self::Isolated),
            "system" | "global" => Ok(Self::System),
            other => Err(format!("expected 'isolated' or 'system', got '{}'", other)),
        }
    }
}

/// Contents of the completion marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvMarker {
    pub manifest_hash: String,
    pub python: String,
    pub installed_at: DateTime<Utc>,
}

/// The `.venv` directory of one app root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedEnv {
    path: PathBuf,
}

impl IsolatedEnv {
    pub fn in_root(root: &Path) -> Self {
        Self {
            path: root.join(VENV_DIR),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn python_path(&self) -> PathBuf {
        venv_python_path(&self.path)
    }

    pub fn read_marker(&self) -> Option<EnvMarker> {
        let content = fs::read_to_string(self.path.join(ENV_MARKER_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// True when the marker says this environment was built for `manifest`.
    pub fn is_current_for(&self, manifest: &DependencyManifest) -> bool {
        self.read_marker()
            .is_some_and(|m| m.manifest_hash == manifest.fingerprint())
    }

    fn write_marker(
        &self,
        manifest: &DependencyManifest,
        interp: &Interpreter,
    ) -> Result<(), BootstrapError> {
        let marker = EnvMarker {
            manifest_hash: manifest.fingerprint(),
            python: interp.version.to_string(),
            installed_at: Utc::now(),
        };
        let path = self.path.join(ENV_MARKER_FILE);
        let json = serde_json::to_string_pretty(&marker)
            .map_err(|e| BootstrapError::io("serialize env marker", e.into()))?;
        fs::write(&path, json)
            .map_err(|e| BootstrapError::io(format!("write {}", path.display()), e))
    }

    pub fn remove(&self) -> Result<(), BootstrapError> {
        if !self.exists() {
            return Ok(());
        }
        fs::remove_dir_all(&self.path)
            .map_err(|e| BootstrapError::io(format!("remove {}", self.path.display()), e))
    }

    /// Probe the environment's own interpreter.
    pub fn interpreter<R: ProcessRunner + ?Sized>(&self, runner: &R) -> Option<Interpreter> {
        let python = self.python_path();
        let candidate = Candidate {
            program: python.to_string_lossy().into_owned(),
            args: Vec::new(),
        };
        probe_candidate(runner, &candidate).map(|mut interp| {
            interp.label = format!("{} ({})", VENV_DIR, interp.version);
            interp
        })
    }

    fn create<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        base: &Interpreter,
    ) -> Result<(), BootstrapError> {
        tracing::info!(path = %self.path.display(), base = %base.label, "creating isolated environment");
        let cmd = base.command([
            "-m".into(),
            "venv".into(),
            self.path.clone().into_os_string(),
        ]);
        let status = runner
            .status(&cmd)
            .map_err(|e| BootstrapError::io(format!("run {}", base.label), e))?;
        if status != Some(0) {
            return Err(BootstrapError::DependencyInstallFailed {
                step: "venv creation".to_string(),
                code: exit_code_of(status),
            });
        }
        Ok(())
    }
}

/// Interpreter path inside a venv. Checks both layouts so a venv made on
/// another platform is still recognized; defaults to the native layout.
pub fn venv_python_path(env_dir: &Path) -> PathBuf {
    let unix = env_dir.join("bin").join("python");
    let windows = env_dir.join("Scripts").join("python.exe");
    if unix.exists() {
        unix
    } else if windows.exists() || cfg!(windows) {
        windows
    } else {
        unix
    }
}

/// Result of the dependency gate.
#[derive(Debug, Clone)]
pub struct DependencyOutcome {
    /// Interpreter to launch or package with.
    pub interpreter: Interpreter,
    /// Requirements handed to pip during this run; empty when nothing was
    /// installed.
    pub installed: Vec<Requirement>,
    /// Whether `.venv` was created during this run.
    pub created_env: bool,
}

/// Gate 3: make every requirement importable. Installs at most once per
/// call and re-checks afterwards.
pub fn ensure_dependencies<R: ProcessRunner + ?Sized>(
    runner: &R,
    base: &Interpreter,
    manifest: &DependencyManifest,
    mode: InstallMode,
    root: &Path,
) -> Result<DependencyOutcome, BootstrapError> {
    match mode {
        InstallMode::System => ensure_system(runner, base, manifest, root),
        InstallMode::Isolated => ensure_isolated(runner, base, manifest, root),
    }
}

fn ensure_system<R: ProcessRunner + ?Sized>(
    runner: &R,
    base: &Interpreter,
    manifest: &DependencyManifest,
    root: &Path,
) -> Result<DependencyOutcome, BootstrapError> {
    let missing = missing_requirements(runner, base, &manifest.requirements)?;
    if !missing.is_empty() {
        pip_install(runner, base, &missing, root)?;
        verify_installed(runner, base, &missing)?;
    }
    Ok(DependencyOutcome {
        interpreter: base.clone(),
        installed: missing,
        created_env: false,
    })
}

fn ensure_isolated<R: ProcessRunner + ?Sized>(
    runner: &R,
    base: &Interpreter,
    manifest: &DependencyManifest,
    root: &Path,
) -> Result<DependencyOutcome, BootstrapError> {
    let env = IsolatedEnv::in_root(root);
    let marker = env.read_marker();

    // A venv without a marker was interrupted mid-install.
    if env.exists() && marker.is_none() {
        tracing::warn!(path = %env.path().display(), "incomplete environment, rebuilding");
        env.remove()?;
    }

    let mut created_env = false;
    if !env.python_path().exists() {
        env.create(runner, base)?;
        created_env = true;
    }

    let venv_interp = env
        .interpreter(runner)
        .ok_or_else(|| BootstrapError::DependencyInstallFailed {
            step: format!("{} interpreter probe", VENV_DIR),
            code: 1,
        })?;

    let missing = if created_env {
        manifest.requirements.clone()
    } else {
        missing_requirements(runner, &venv_interp, &manifest.requirements)?
    };
    let current = env.is_current_for(manifest);

    // A changed manifest goes through pip even when every module imports:
    // a new pin on an installed package is not visible to the import check.
    if missing.is_empty() && (current || manifest.is_empty()) {
        if !current {
            env.write_marker(manifest, &venv_interp)?;
        }
        return Ok(DependencyOutcome {
            interpreter: venv_interp,
            installed: Vec::new(),
            created_env,
        });
    }

    let to_install = if current {
        missing.clone()
    } else {
        manifest.requirements.clone()
    };
    pip_install(runner, &venv_interp, &to_install, root)?;
    verify_installed(runner, &venv_interp, &missing)?;
    env.write_marker(manifest, &venv_interp)?;

    Ok(DependencyOutcome {
        interpreter: venv_interp,
        installed: to_install,
        created_env,
    })
}

fn pip_install<R: ProcessRunner + ?Sized>(
    runner: &R,
    interp: &Interpreter,
    reqs: &[Requirement],
    root: &Path,
) -> Result<(), BootstrapError> {
    tracing::info!(packages = %join_modules(reqs), interpreter = %interp.label, "installing");
    let mut args: Vec<String> = vec![
        "-m".into(),
        "pip".into(),
        "install".into(),
        "--disable-pip-version-check".into(),
    ];
    args.extend(reqs.iter().map(|r| r.spec.clone()));
    let cmd = interp.command(args).current_dir(root);
    let status = runner
        .status(&cmd)
        .map_err(|e| BootstrapError::io(format!("run {}", interp.label), e))?;
    if status != Some(0) {
        return Err(BootstrapError::DependencyInstallFailed {
            step: "pip install".to_string(),
            code: exit_code_of(status),
        });
    }
    Ok(())
}

fn verify_installed<R: ProcessRunner + ?Sized>(
    runner: &R,
    interp: &Interpreter,
    expected: &[Requirement],
) -> Result<(), BootstrapError> {
    let still_missing = missing_requirements(runner, interp, expected)?;
    if !still_missing.is_empty() {
        return Err(BootstrapError::DependenciesStillMissing(join_modules(
            &still_missing,
        )));
    }
    Ok(())
}
