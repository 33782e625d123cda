//! vim-flavor CLI
//!
//! Installs Vim plugins declared in a VimFlavor file at the versions pinned
//! by VimFlavor.lock, and deploys them into a vimfiles directory.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands, DeployArgs};
use commands::PathOverrides;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }

    let paths = PathOverrides {
        flavorfile: cli.flavorfile,
        lockfile: cli.lockfile,
        cache_dir: cli.cache_dir,
    };

    match cli.command {
        Some(cmd) => execute_command(cmd, &paths),
        None => {
            println!("{} Vim plugin manager", "vim-flavor".green().bold());
            println!();
            println!("Run {} for available commands.", "vim-flavor --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, paths: &PathOverrides) -> Result<()> {
    match cmd {
        Commands::Install(args) => cmd_install(args, paths),
        Commands::Upgrade(args) => cmd_upgrade(args, paths),
        Commands::Completions { shell } => commands::run_completions(shell),
    }
}

fn cmd_install(args: DeployArgs, paths: &PathOverrides) -> Result<()> {
    let cwd = std::env::current_dir()?;
    commands::run_install(&cwd, paths, args.vimfiles.as_deref(), &args.groups)
}

fn cmd_upgrade(args: DeployArgs, paths: &PathOverrides) -> Result<()> {
    let cwd = std::env::current_dir()?;
    commands::run_upgrade(&cwd, paths, args.vimfiles.as_deref(), &args.groups)
}
