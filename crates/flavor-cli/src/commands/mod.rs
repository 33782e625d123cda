//! Command implementations for flavor-cli

pub mod completions;
pub mod install;

pub use completions::run_completions;
pub use install::{PathOverrides, run_install, run_upgrade};
