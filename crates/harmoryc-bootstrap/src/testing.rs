//! Scripted `ProcessRunner` for unit tests. No real Python is needed.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

use crate::deps::Requirement;
use crate::env::builder::venv_python_path;
use crate::process::{CapturedOutput, CommandSpec, ProcessRunner};

const VENV_VERSION: &str = "Python 3.11.4";

/// Answer to `--version`.
#[derive(Clone)]
enum VersionReply {
    Stdout(String),
    Stderr(String),
    Broken,
}

pub struct FakeRunner {
    programs: HashMap<String, VersionReply>,
    importable: RefCell<HashSet<String>>,
    pip_exit: i32,
    pip_provides: bool,
    venv_exit: i32,
    build_exits: RefCell<VecDeque<i32>>,
    app_exit: Cell<Option<i32>>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            programs: HashMap::new(),
            importable: RefCell::new(HashSet::new()),
            pip_exit: 0,
            pip_provides: true,
            venv_exit: 0,
            build_exits: RefCell::new(VecDeque::new()),
            app_exit: Cell::new(Some(0)),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_python(mut self, program: &str, version_line: &str) -> Self {
        self.programs
            .insert(program.to_string(), VersionReply::Stdout(version_line.to_string()));
        self
    }

    pub fn with_python_stderr(mut self, program: &str, version_line: &str) -> Self {
        self.programs
            .insert(program.to_string(), VersionReply::Stderr(version_line.to_string()));
        self
    }

    /// On PATH but `--version` exits non-zero.
    pub fn with_broken_program(mut self, program: &str) -> Self {
        self.programs.insert(program.to_string(), VersionReply::Broken);
        self
    }

    pub fn with_module(self, module: &str) -> Self {
        self.importable.borrow_mut().insert(module.to_string());
        self
    }

    pub fn with_pip_exit(mut self, code: i32) -> Self {
        self.pip_exit = code;
        self
    }

    /// pip exits 0 but nothing becomes importable.
    pub fn with_pip_installing_nothing(mut self) -> Self {
        self.pip_provides = false;
        self
    }

    pub fn with_venv_exit(mut self, code: i32) -> Self {
        self.venv_exit = code;
        self
    }

    /// Exit codes for successive PyInstaller runs; 0 once exhausted.
    pub fn with_build_exits(self, codes: &[i32]) -> Self {
        self.build_exits.borrow_mut().extend(codes.iter().copied());
        self
    }

    /// `None` simulates termination by a signal.
    pub fn with_app_exit(self, code: Option<i32>) -> Self {
        self.app_exit.set(code);
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().iter().map(CommandSpec::arg_strings).collect()
    }

    fn count(&self, pred: impl Fn(&[String]) -> bool) -> usize {
        self.calls().iter().filter(|a| pred(a)).count()
    }

    pub fn import_checks(&self) -> usize {
        self.count(is_import_check)
    }

    pub fn pip_installs(&self) -> usize {
        self.count(is_pip_install)
    }

    pub fn last_pip_install(&self) -> Option<Vec<String>> {
        self.calls().into_iter().rev().find(|a| is_pip_install(a))
    }

    pub fn venv_creations(&self) -> usize {
        self.count(is_venv)
    }

    pub fn build_calls(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().filter(|a| is_build(a)).collect()
    }

    pub fn app_launches(&self) -> Vec<CommandSpec> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| is_app(&c.arg_strings()))
            .cloned()
            .collect()
    }
}

fn has_pair(args: &[String], a: &str, b: &str) -> bool {
    args.windows(2).any(|w| w[0] == a && w[1] == b)
}

fn is_import_check(args: &[String]) -> bool {
    args.iter().any(|a| a == "-c")
}

fn is_pip_install(args: &[String]) -> bool {
    has_pair(args, "pip", "install")
}

fn is_venv(args: &[String]) -> bool {
    has_pair(args, "-m", "venv")
}

fn is_build(args: &[String]) -> bool {
    has_pair(args, "-m", "PyInstaller")
}

fn is_app(args: &[String]) -> bool {
    !is_build(args) && args.last().is_some_and(|a| a.ends_with("app.py"))
}

impl ProcessRunner for FakeRunner {
    fn locate(&self, program: &Path) -> Option<PathBuf> {
        let key = program.to_string_lossy();
        if self.programs.contains_key(key.as_ref()) {
            return Some(program.to_path_buf());
        }
        if program.is_absolute() && program.exists() {
            return Some(program.to_path_buf());
        }
        None
    }

    fn output(&self, cmd: &CommandSpec) -> io::Result<CapturedOutput> {
        self.calls.borrow_mut().push(cmd.clone());
        let args = cmd.arg_strings();

        if args.last().map(String::as_str) == Some("--version") {
            let key = cmd.program.to_string_lossy().into_owned();
            let reply = self
                .programs
                .get(&key)
                .cloned()
                .unwrap_or_else(|| VersionReply::Stdout(VENV_VERSION.to_string()));
            return Ok(match reply {
                VersionReply::Stdout(line) => CapturedOutput {
                    code: Some(0),
                    stdout: format!("{}\n", line),
                    stderr: String::new(),
                },
                VersionReply::Stderr(line) => CapturedOutput {
                    code: Some(0),
                    stdout: String::new(),
                    stderr: format!("{}\n", line),
                },
                VersionReply::Broken => CapturedOutput {
                    code: Some(9009),
                    stdout: String::new(),
                    stderr: "Python was not found".to_string(),
                },
            });
        }

        if let Some(pos) = args.iter().position(|a| a == "-c") {
            let code = args
                .get(pos + 1)
                .and_then(|stmt| stmt.strip_prefix("import "))
                .map(|module| self.importable.borrow().contains(module))
                .unwrap_or(false);
            return Ok(CapturedOutput {
                code: Some(if code { 0 } else { 1 }),
                stdout: String::new(),
                stderr: if code {
                    String::new()
                } else {
                    "ModuleNotFoundError".to_string()
                },
            });
        }

        Ok(CapturedOutput {
            code: Some(0),
            ..Default::default()
        })
    }

    fn status(&self, cmd: &CommandSpec) -> io::Result<Option<i32>> {
        self.calls.borrow_mut().push(cmd.clone());
        let args = cmd.arg_strings();

        if is_venv(&args) {
            if self.venv_exit != 0 {
                return Ok(Some(self.venv_exit));
            }
            let dir = args
                .iter()
                .skip_while(|a| *a != "venv")
                .nth(1)
                .map(PathBuf::from)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "venv without path"))?;
            let python = venv_python_path(&dir);
            if let Some(parent) = python.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&python, "")?;
            return Ok(Some(0));
        }

        if is_pip_install(&args) {
            if self.pip_exit != 0 {
                return Ok(Some(self.pip_exit));
            }
            if self.pip_provides {
                let mut importable = self.importable.borrow_mut();
                for spec in args.iter().skip_while(|a| *a != "install").skip(1) {
                    if let Some(req) = Requirement::from_line(spec) {
                        importable.insert(req.module);
                    }
                }
            }
            return Ok(Some(0));
        }

        if is_build(&args) {
            return Ok(Some(self.build_exits.borrow_mut().pop_front().unwrap_or(0)));
        }

        if is_app(&args) {
            return Ok(self.app_exit.get());
        }

        Ok(Some(0))
    }
}
