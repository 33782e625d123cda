//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// vim-flavor - Install and upgrade Vim plugins pinned by a lockfile
#[derive(Parser, Debug)]
#[command(name = "vim-flavor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Flavorfile to read (default: ./VimFlavor)
    #[arg(long, global = true, value_name = "PATH")]
    pub flavorfile: Option<PathBuf>,

    /// Lockfile to read and write (default: ./VimFlavor.lock)
    #[arg(long, global = true, value_name = "PATH")]
    pub lockfile: Option<PathBuf>,

    /// Repository cache directory (default: ~/.vim-flavor)
    #[arg(long, global = true, value_name = "PATH", env = "VIM_FLAVOR_HOME")]
    pub cache_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install flavors, keeping versions already recorded in the lockfile
    ///
    /// Examples:
    ///   vim-flavor install                  # Deploy into ~/.vim
    ///   vim-flavor install ./vimfiles       # Deploy into ./vimfiles
    ///   vim-flavor install --group default  # Only flavors in group default
    Install(DeployArgs),

    /// Upgrade flavors to the newest versions their constraints allow
    Upgrade(DeployArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments shared by `install` and `upgrade`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DeployArgs {
    /// Vimfiles directory to deploy into (default: ~/.vim)
    pub vimfiles: Option<PathBuf>,

    /// Deploy only flavors in this group (repeatable)
    #[arg(short, long = "group", value_name = "NAME")]
    pub groups: Vec<String>,
}
