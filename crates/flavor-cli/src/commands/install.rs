//! Install and upgrade command implementations

use std::path::{Path, PathBuf};

use colored::Colorize;

use flavor_core::config::{self, FlavorConfig};
use flavor_core::{ChangeKind, Facade, InstallReport};

use crate::error::{CliError, Result};

/// Paths given on the command line, each overriding its default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOverrides {
    pub flavorfile: Option<PathBuf>,
    pub lockfile: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl PathOverrides {
    /// Build the run configuration for a project rooted at `cwd`.
    pub fn resolve(&self, cwd: &Path) -> Result<FlavorConfig> {
        let cache_root = match &self.cache_dir {
            Some(dir) => cwd.join(dir),
            None => config::default_cache_root()?,
        };
        let mut resolved = FlavorConfig::in_dir(cwd, cache_root);
        if let Some(path) = &self.flavorfile {
            resolved = resolved.with_flavorfile(cwd.join(path));
        }
        if let Some(path) = &self.lockfile {
            resolved = resolved.with_lockfile(cwd.join(path));
        }
        Ok(resolved)
    }
}

/// Run the install command
///
/// Keeps every version already in the lockfile that still satisfies its
/// constraint.
pub fn run_install(
    cwd: &Path,
    paths: &PathOverrides,
    vimfiles: Option<&Path>,
    groups: &[String],
) -> Result<()> {
    println!("{} Installing flavors...", "=>".blue().bold());
    let (mut facade, vimfiles) = prepare(cwd, paths, vimfiles, groups)?;
    let report = facade.install(&vimfiles)?;
    print_report(&report, &vimfiles);
    Ok(())
}

/// Run the upgrade command
///
/// Moves every flavor to the newest version its constraint allows.
pub fn run_upgrade(
    cwd: &Path,
    paths: &PathOverrides,
    vimfiles: Option<&Path>,
    groups: &[String],
) -> Result<()> {
    println!("{} Upgrading flavors...", "=>".blue().bold());
    let (mut facade, vimfiles) = prepare(cwd, paths, vimfiles, groups)?;
    let report = facade.upgrade(&vimfiles)?;
    print_report(&report, &vimfiles);
    Ok(())
}

fn prepare(
    cwd: &Path,
    paths: &PathOverrides,
    vimfiles: Option<&Path>,
    groups: &[String],
) -> Result<(Facade, PathBuf)> {
    let config = paths.resolve(cwd)?;
    let vimfiles = match vimfiles {
        Some(path) => cwd.join(path),
        None => config::default_vimfiles_path()?,
    };
    if vimfiles.exists() && !vimfiles.is_dir() {
        return Err(CliError::user(format!(
            "{} is not a directory",
            vimfiles.display()
        )));
    }
    tracing::debug!(
        flavorfile = %config.flavorfile_path.display(),
        lockfile = %config.lockfile_path.display(),
        cache_root = %config.cache_root.display(),
        vimfiles = %vimfiles.display(),
        "Resolved paths"
    );

    let facade = Facade::new(config).with_groups(groups.iter().cloned());
    Ok((facade, vimfiles))
}

fn print_report(report: &InstallReport, vimfiles: &Path) {
    for flavor in &report.flavors {
        let change = match &flavor.change {
            ChangeKind::Unchanged => flavor.change.to_string().dimmed(),
            ChangeKind::Added => flavor.change.to_string().green(),
            ChangeKind::Upgraded { .. } => flavor.change.to_string().cyan(),
            ChangeKind::Downgraded { .. } => flavor.change.to_string().yellow(),
        };
        println!(
            "   {} {} {} ({})",
            "+".green(),
            flavor.name.cyan(),
            flavor.version,
            change
        );
    }
    for name in &report.removed {
        println!("   {} {} (removed)", "-".red(), name.cyan());
    }

    println!();
    if report.flavors.is_empty() {
        println!("{} No flavors to deploy.", "OK".green().bold());
    } else {
        println!(
            "{} Deployed {} flavor(s) into {}",
            "OK".green().bold(),
            report.flavors.len(),
            vimfiles.display()
        );
    }
}
