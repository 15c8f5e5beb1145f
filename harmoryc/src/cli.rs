use clap::{Parser, Subcommand};

/// HARMORYC launcher - prepares Python and starts or packages the questionnaire
#[derive(Parser, Debug)]
#[command(name = "harmoryc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder containing app.py (default: the launcher's folder if it holds
    /// app.py, otherwise the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub app_dir: Option<String>,

    /// Interpreter command to try first, e.g. "py -3.11"
    #[arg(long, global = true, value_name = "CMD", env = "HARMORYC_PYTHON")]
    pub python: Option<String>,

    /// Exit immediately on failure instead of waiting for Enter
    #[arg(long, global = true, default_value = "false")]
    pub no_pause: bool,

    /// Defaults to `run` so a plain double-click starts the questionnaire
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check Python and dependencies, create folders, then start app.py
    Run {
        /// Install missing packages into the system Python instead of .venv
        #[arg(long, default_value = "false")]
        system: bool,
    },

    /// Build a standalone executable with PyInstaller (requires Python 3.9+)
    Build {
        /// Install missing packages into the system Python instead of .venv
        #[arg(long, default_value = "false")]
        system: bool,
    },

    /// Report interpreter, version and dependency status without changing anything
    Check {
        /// Check against the system Python instead of .venv
        #[arg(long, default_value = "false")]
        system: bool,

        /// Check what `build` needs (Python 3.9+ and PyInstaller)
        #[arg(long, default_value = "false")]
        build: bool,

        /// Output the report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Remove the isolated environment (.venv)
    CleanEnv {
        /// Show what would be removed without deleting
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Run { system: false }
    }
}
