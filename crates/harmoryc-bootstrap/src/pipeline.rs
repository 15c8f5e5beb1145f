//! The gate chain: interpreter → version → dependencies → directories →
//! launch or package. Each step returns a `Result`; the first error ends
//! the run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use harmoryc_core::config::env_keys::launcher as launcher_keys;
use harmoryc_core::config::LauncherConfig;

use crate::deps::{missing_requirements, DependencyManifest, ManifestSource};
use crate::env::builder::{ensure_dependencies, DependencyOutcome, InstallMode, IsolatedEnv};
use crate::error::BootstrapError;
use crate::interpreter::{candidates_with_override, default_candidates, resolve_interpreter, Candidate, Interpreter};
use crate::launch::launch_app;
use crate::package::{build_standalone, DIST_DIR};
use crate::process::ProcessRunner;
use crate::version::{check_version, PythonVersion, BUILD_MIN_VERSION};
use crate::workspace::{ensure_dirs, ENTRYPOINT, REQUIRED_DIRS};

const TOTAL_STEPS: usize = 5;

/// What the last step hands control to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Run `app.py`.
    App,
    /// Produce a standalone executable with PyInstaller.
    Package,
}

impl Target {
    fn default_min_version(self) -> Option<PythonVersion> {
        match self {
            Self::App => None,
            Self::Package => Some(BUILD_MIN_VERSION),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub target: Target,
    pub install_mode: InstallMode,
    pub min_version: Option<PythonVersion>,
    pub candidates: Vec<Candidate>,
}

impl BootstrapOptions {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            install_mode: InstallMode::default(),
            min_version: target.default_min_version(),
            candidates: default_candidates(),
        }
    }

    /// Options from env config. `system_flag` is the CLI `--system`. A
    /// configured minimum can only raise the target's own minimum.
    pub fn from_config(
        target: Target,
        system_flag: bool,
        cfg: &LauncherConfig,
    ) -> Result<Self, BootstrapError> {
        let configured_min = cfg
            .min_python
            .as_deref()
            .map(|v| {
                v.parse::<PythonVersion>()
                    .map_err(|reason| BootstrapError::InvalidSetting {
                        key: launcher_keys::HARMORYC_MIN_PYTHON.to_string(),
                        value: v.to_string(),
                        reason,
                    })
            })
            .transpose()?;
        let min_version = match (target.default_min_version(), configured_min) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        Ok(Self {
            target,
            install_mode: InstallMode::resolve(system_flag, cfg.install_mode.as_deref())?,
            min_version,
            candidates: candidates_with_override(cfg.python.as_deref()),
        })
    }
}

/// Everything the gates established before the hand-off.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub base: Interpreter,
    pub manifest: DependencyManifest,
    pub deps: DependencyOutcome,
    pub created_dirs: Vec<PathBuf>,
}

impl Prepared {
    /// Interpreter to launch or package with.
    pub fn interpreter(&self) -> &Interpreter {
        &self.deps.interpreter
    }
}

pub struct Bootstrap<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    root: PathBuf,
    options: BootstrapOptions,
}

impl<'a, R: ProcessRunner + ?Sized> Bootstrap<'a, R> {
    pub fn new(runner: &'a R, root: impl Into<PathBuf>, options: BootstrapOptions) -> Self {
        Self {
            runner,
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &BootstrapOptions {
        &self.options
    }

    /// Steps 1-4.
    pub fn prepare(&self) -> Result<Prepared, BootstrapError> {
        step(1, "Locating Python...");
        let base = resolve_interpreter(self.runner, &self.options.candidates)?;
        eprintln!("   ✓ {} (Python {})", base.label, base.version);

        step(2, "Checking Python version...");
        match self.options.min_version {
            Some(min) => {
                check_version(base.version, min)?;
                eprintln!("   ✓ Python {} satisfies >= {}.{}", base.version, min.major, min.minor);
            }
            None => eprintln!("   ✓ no minimum required"),
        }

        // Nothing below is worth doing for a folder that cannot be launched.
        let entry = self.root.join(ENTRYPOINT);
        if !entry.is_file() {
            return Err(BootstrapError::EntrypointMissing(entry));
        }

        step(3, "Checking dependencies...");
        let manifest = DependencyManifest::load(&self.root, self.options.target)?;
        let deps = ensure_dependencies(
            self.runner,
            &base,
            &manifest,
            self.options.install_mode,
            &self.root,
        )?;
        if deps.installed.is_empty() {
            eprintln!("   ✓ all {} package(s) present", manifest.requirements.len());
        } else {
            eprintln!("   ✓ installed {} package(s)", deps.installed.len());
        }

        step(4, "Preparing folders...");
        let created_dirs = ensure_dirs(&self.root, REQUIRED_DIRS)?;
        for dir in &created_dirs {
            eprintln!("   ✓ created {}", dir.display());
        }

        Ok(Prepared {
            base,
            manifest,
            deps,
            created_dirs,
        })
    }

    /// Run every gate and hand off. Returns the exit status of the launched
    /// questionnaire, or 0 after a successful build.
    pub fn run(&self) -> Result<i32, BootstrapError> {
        let prepared = self.prepare()?;
        match self.options.target {
            Target::App => {
                step(5, "Starting the questionnaire...");
                launch_app(self.runner, prepared.interpreter(), &self.root)
            }
            Target::Package => {
                step(5, "Building standalone executable...");
                let layout = build_standalone(self.runner, prepared.interpreter(), &self.root)?;
                eprintln!(
                    "✅ {} build complete. See {}",
                    layout.describe(),
                    self.root.join(DIST_DIR).display()
                );
                Ok(0)
            }
        }
    }

    /// Read-only report of gates 1-4: nothing is installed or created.
    pub fn inspect(&self) -> Inspection {
        let mut report = Inspection {
            app_root: self.root.display().to_string(),
            target: self.options.target,
            install_mode: match self.options.install_mode {
                InstallMode::Isolated => "isolated".to_string(),
                InstallMode::System => "system".to_string(),
            },
            interpreter: None,
            python_version: None,
            required_version: self.options.min_version.map(|v| v.to_string()),
            version_ok: None,
            manifest_source: None,
            environment: None,
            present: Vec::new(),
            missing: Vec::new(),
            missing_dirs: REQUIRED_DIRS
                .iter()
                .filter(|d| !self.root.join(d).is_dir())
                .map(|d| d.to_string())
                .collect(),
            entrypoint_present: self.root.join(ENTRYPOINT).is_file(),
            error: None,
        };

        let base = match resolve_interpreter(self.runner, &self.options.candidates) {
            Ok(interp) => interp,
            Err(e) => {
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.interpreter = Some(base.label.clone());
        report.python_version = Some(base.version.to_string());
        if let Some(min) = self.options.min_version {
            let ok = check_version(base.version, min).is_ok();
            report.version_ok = Some(ok);
        }

        let manifest = match DependencyManifest::load(&self.root, self.options.target) {
            Ok(m) => m,
            Err(e) => {
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.manifest_source = Some(match &manifest.source {
            ManifestSource::File(p) => p.display().to_string(),
            ManifestSource::Builtin => "built-in".to_string(),
        });

        let checked = match self.options.install_mode {
            InstallMode::System => Some(base),
            InstallMode::Isolated => {
                let env = IsolatedEnv::in_root(&self.root);
                let interp = if env.read_marker().is_some() {
                    env.interpreter(self.runner)
                } else {
                    None
                };
                report.environment = Some(match &interp {
                    Some(_) => env.path().display().to_string(),
                    None => "not created".to_string(),
                });
                interp
            }
        };

        match checked {
            Some(interp) => match missing_requirements(self.runner, &interp, &manifest.requirements) {
                Ok(missing) => {
                    report.present = manifest
                        .requirements
                        .iter()
                        .filter(|r| !missing.contains(r))
                        .map(|r| r.module.clone())
                        .collect();
                    report.missing = missing.into_iter().map(|r| r.module).collect();
                }
                Err(e) => report.error = Some(e.to_string()),
            },
            None => {
                report.missing = manifest.requirements.into_iter().map(|r| r.module).collect();
            }
        }
        report
    }
}

/// Result of `Bootstrap::inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub app_root: String,
    pub target: Target,
    pub install_mode: String,
    pub interpreter: Option<String>,
    pub python_version: Option<String>,
    pub required_version: Option<String>,
    pub version_ok: Option<bool>,
    pub manifest_source: Option<String>,
    pub environment: Option<String>,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub missing_dirs: Vec<String>,
    pub entrypoint_present: bool,
    pub error: Option<String>,
}

impl Inspection {
    /// True when a run would launch without installing anything.
    pub fn ready(&self) -> bool {
        self.error.is_none()
            && self.interpreter.is_some()
            && self.version_ok != Some(false)
            && self.missing.is_empty()
            && self.entrypoint_present
    }
}

fn step(n: usize, msg: &str) {
    eprintln!("[{}/{}] {}", n, TOTAL_STEPS, msg);
}
