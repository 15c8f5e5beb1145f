mod cli;
mod commands;

use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use cli::{Cli, Commands};
use harmoryc_bootstrap::workspace;
use harmoryc_bootstrap::BootstrapError;
use harmoryc_core::config::LauncherConfig;

fn main() {
    let cli = Cli::parse();
    let no_pause_flag = cli.no_pause;

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!();
            eprintln!("❌ {:#}", e);
            exit_code_for(&e)
        }
    };

    // Re-read: the app root's .env may set HARMORYC_NO_PAUSE.
    if code != 0 && !no_pause_flag && !LauncherConfig::from_env().no_pause {
        pause_before_exit();
    }
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = workspace::resolve_app_root(
        cli.app_dir.as_deref(),
        LauncherConfig::from_env().app_dir.as_deref(),
        workspace::current_exe_dir().as_deref(),
        &cwd,
    );
    workspace::enter_app_root(&root)?;

    // After entering the root so its .env is the one loaded.
    harmoryc_core::observability::init_tracing();
    let mut config = LauncherConfig::from_env();
    if cli.python.is_some() {
        config.python = cli.python;
    }
    tracing::debug!(root = %root.display(), ?config, "launcher configured");

    match cli.command.unwrap_or_default() {
        Commands::Run { system } => commands::run::cmd_run(&root, system, &config),
        Commands::Build { system } => commands::build::cmd_build(&root, system, &config),
        Commands::Check { system, build, json } => {
            commands::check::cmd_check(&root, system, build, json, &config)
        }
        Commands::CleanEnv { dry_run, force } => commands::env::cmd_clean(&root, dry_run, force),
    }
}

/// Gate failures carry their own exit status; anything else is 1.
fn exit_code_for(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<BootstrapError>()
        .map(BootstrapError::exit_code)
        .unwrap_or(harmoryc_bootstrap::error::FAILURE_EXIT_CODE)
}

/// Keep a double-clicked console window open long enough to read the error.
fn pause_before_exit() {
    if !std::io::stdin().is_terminal() {
        return;
    }
    eprint!("Press Enter to exit...");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
