//! Dependency manifest and presence check.
//!
//! The manifest is `requirements.txt` in the app root when present, otherwise
//! a built-in list per target. Presence is checked by importing each module
//! with the chosen interpreter.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::BootstrapError;
use crate::interpreter::Interpreter;
use crate::pipeline::Target;
use crate::process::ProcessRunner;

pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Runtime packages of the questionnaire.
const APP_PACKAGES: &[&str] = &["flet", "websockets"];
/// Extra packages needed only to build the standalone executable.
const BUILD_PACKAGES: &[&str] = &["pyinstaller"];

/// Distribution names whose import name differs from the normalized name.
const MODULE_ALIASES: &[(&str, &str)] = &[
    ("pyinstaller", "PyInstaller"),
    ("pillow", "PIL"),
    ("pyyaml", "yaml"),
    ("opencv-python", "cv2"),
    ("beautifulsoup4", "bs4"),
    ("python-dateutil", "dateutil"),
    ("scikit-learn", "sklearn"),
];

/// One required package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Distribution name as pip knows it, e.g. `pyinstaller`.
    pub name: String,
    /// Import name used for the presence check, e.g. `PyInstaller`.
    pub module: String,
    /// Full requirement handed to pip, e.g. `flet>=0.21`.
    pub spec: String,
}

impl Requirement {
    /// Parse one requirements line. Comments, blank lines and pip options
    /// (`-r`, `--index-url`, ...) yield `None`.
    ///
    /// `name @ <url>` keeps its declared name. A bare URL or VCS line
    /// (`git+https://...`, `https://.../pkg.whl`) is named by its `#egg=`
    /// fragment and skipped without one, since no import name can be
    /// derived for it.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = match line.find(" #") {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            return None;
        }
        let mut name: String = line
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();
        if matches!(line[name.len()..].chars().next(), Some('+' | ':')) {
            match egg_name(line) {
                Some(egg) => name = egg,
                None => {
                    tracing::warn!(requirement = %line, "URL requirement without #egg= name, skipped");
                    return None;
                }
            }
        }
        if name.is_empty() {
            return None;
        }
        Some(Self {
            module: module_name_for(&name),
            name,
            spec: line.to_string(),
        })
    }
}

fn egg_name(url: &str) -> Option<String> {
    let (_, fragment) = url.split_once("#egg=")?;
    let name: String = fragment
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    (!name.is_empty()).then_some(name)
}

/// Import name for a distribution name.
pub fn module_name_for(name: &str) -> String {
    let normalized = name.to_ascii_lowercase().replace('_', "-");
    MODULE_ALIASES
        .iter()
        .find(|(dist, _)| *dist == normalized)
        .map(|(_, module)| module.to_string())
        .unwrap_or_else(|| normalized.replace('-', "_"))
}

/// Where a manifest came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    File(PathBuf),
    Builtin,
}

/// Ordered, declared set of required packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyManifest {
    pub requirements: Vec<Requirement>,
    pub source: ManifestSource,
}

impl DependencyManifest {
    pub fn builtin(target: Target) -> Self {
        let mut manifest = Self {
            requirements: Vec::new(),
            source: ManifestSource::Builtin,
        };
        manifest.extend_names(APP_PACKAGES);
        if target == Target::Package {
            manifest.extend_names(BUILD_PACKAGES);
        }
        manifest
    }

    pub fn parse(content: &str, source: ManifestSource) -> Self {
        let mut requirements: Vec<Requirement> = Vec::new();
        for req in content.lines().filter_map(Requirement::from_line) {
            if !requirements.iter().any(|r| r.module == req.module) {
                requirements.push(req);
            }
        }
        Self {
            requirements,
            source,
        }
    }

    /// Load `<root>/requirements.txt` or fall back to the built-in list.
    /// The packaging target always includes PyInstaller.
    pub fn load(root: &Path, target: Target) -> Result<Self, BootstrapError> {
        let path = root.join(REQUIREMENTS_FILE);
        let mut manifest = if path.is_file() {
            let content = fs::read_to_string(&path)
                .map_err(|e| BootstrapError::io(format!("read {}", path.display()), e))?;
            Self::parse(&content, ManifestSource::File(path))
        } else {
            Self::builtin(target)
        };
        if target == Target::Package {
            manifest.extend_names(BUILD_PACKAGES);
        }
        Ok(manifest)
    }

    fn extend_names(&mut self, names: &[&str]) {
        for name in names {
            if let Some(req) = Requirement::from_line(name) {
                if !self.requirements.iter().any(|r| r.module == req.module) {
                    self.requirements.push(req);
                }
            }
        }
    }

    pub fn specs(&self) -> Vec<String> {
        self.requirements.iter().map(|r| r.spec.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Stable hash of the requirement specs, used to tell whether an
    /// isolated environment was built for this manifest.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for spec in self.specs() {
            hasher.update(spec.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// Gate 3: requirements whose module fails to import under `interp`.
pub fn missing_requirements<R: ProcessRunner + ?Sized>(
    runner: &R,
    interp: &Interpreter,
    requirements: &[Requirement],
) -> Result<Vec<Requirement>, BootstrapError> {
    let mut missing = Vec::new();
    for req in requirements {
        let cmd = interp.command(["-c".to_string(), format!("import {}", req.module)]);
        let out = runner
            .output(&cmd)
            .map_err(|e| BootstrapError::io(format!("run {}", interp.label), e))?;
        if out.success() {
            tracing::debug!(module = %req.module, "present");
        } else {
            tracing::info!(module = %req.module, "missing");
            missing.push(req.clone());
        }
    }
    Ok(missing)
}

pub fn join_modules(reqs: &[Requirement]) -> String {
    reqs.iter()
        .map(|r| r.module.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
