//! Runs the generated bootstrap script under a real Vim, when one is installed

use std::fs;
use std::path::Path;
use std::process::Command;

use flavor_core::{BootstrapScript, runtimepath_order};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn vim_available() -> bool {
    Command::new("vim")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Source `script` in a clean Vim with `home` as `$HOME` and return the
/// resulting `'runtimepath'` entries.
fn runtimepath_after_sourcing(home: &Path, script: &Path) -> Vec<String> {
    let out = home.join("rtp.txt");
    let status = Command::new("vim")
        .args(["-u", "NONE", "-i", "NONE", "-N", "-e", "-s"])
        .arg("-c")
        .arg(format!("source {}", script.display()))
        .arg("-c")
        .arg(format!(
            "call writefile(split(&runtimepath, ','), '{}')",
            out.display()
        ))
        .arg("-c")
        .arg("qall!")
        .env("HOME", home)
        .env_remove("VIMINIT")
        .env_remove("MYVIMRC")
        .env_remove("XDG_CONFIG_HOME")
        .status()
        .unwrap();
    assert!(status.success(), "vim exited with {status}");

    let home_str = home.to_string_lossy();
    fs::read_to_string(&out)
        .unwrap()
        .lines()
        .map(|entry| {
            if let Some(rest) = entry.strip_prefix("~/") {
                format!("{home_str}/{rest}")
            } else if let Some(rest) = entry.strip_prefix("$HOME/") {
                format!("{home_str}/{rest}")
            } else {
                entry.to_string()
            }
        })
        .collect()
}

/// Entries under `base`, with `base` replaced by `!`.
fn managed_entries(entries: &[String], base: &str) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.as_str() == base || e.starts_with(&format!("{base}/")))
        .map(|e| format!("!{}", &e[base.len()..]))
        .collect()
}

fn deploy_dirs(flavors: &Path, names: &[&str]) {
    for name in names {
        fs::create_dir_all(flavors.join(name).join("plugin")).unwrap();
    }
}

#[test]
fn test_bootstrap_orders_runtimepath() {
    if !vim_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let home = temp.path().canonicalize().unwrap();
    let vimfiles = home.join(".vim");
    let flavors = vimfiles.join("flavors");
    deploy_dirs(&flavors, &["foo", "bar", "baz"]);
    let script = BootstrapScript::new(["foo", "bar", "baz"]).write(&flavors).unwrap();

    let entries = runtimepath_after_sourcing(&home, &script);
    let base = vimfiles.to_string_lossy();

    assert_eq!(
        managed_entries(&entries, &base),
        vec![
            "!",
            "!/flavors/bar",
            "!/flavors/baz",
            "!/flavors/foo",
            "!/flavors/foo/after",
            "!/flavors/baz/after",
            "!/flavors/bar/after",
            "!/after",
        ]
    );
    assert_eq!(
        managed_entries(&entries, &base),
        runtimepath_order("!", &["foo", "bar", "baz"])
    );
}

#[test]
fn test_bootstrap_discovers_flavors_at_run_time() {
    if !vim_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let home = temp.path().canonicalize().unwrap();
    let vimfiles = home.join(".vim");
    let flavors = vimfiles.join("flavors");
    deploy_dirs(&flavors, &["foo"]);
    let script = BootstrapScript::new(["foo"]).write(&flavors).unwrap();

    // Added after the script was generated
    deploy_dirs(&flavors, &["late"]);
    fs::write(flavors.join("not-a-dir.vim"), "").unwrap();

    let entries = runtimepath_after_sourcing(&home, &script);

    assert_eq!(
        managed_entries(&entries, &vimfiles.to_string_lossy()),
        runtimepath_order("!", &["foo", "late"])
    );
}
