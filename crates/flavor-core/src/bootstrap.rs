//! Bootstrap script generation
//!
//! `flavors/bootstrap.vim` wires deployed flavors into `'runtimepath'`. It
//! finds the flavors by globbing its own directory each time it is sourced,
//! so the order below holds for whatever is deployed at that moment:
//!
//! ```text
//! base
//! base/flavors/<a> base/flavors/<b> ... base/flavors/<z>
//! base/flavors/<z>/after ... base/flavors/<b>/after base/flavors/<a>/after
//! base/after
//! ```
//!
//! Unrelated entries (for example `$VIMRUNTIME`) keep their place between
//! `base` and `base/after`.

use std::path::{Path, PathBuf};

use flavor_fs::{FlavorPath, NormalizedPath};

use crate::Result;

const SCRIPT_BODY: &str = r#"
function! s:normalize(path) abort
  let path = substitute(fnamemodify(expand(a:path), ':p'), '\\', '/', 'g')
  return substitute(path, '/\+$', '', '')
endfunction

function! s:bootstrap(vimfiles_path) abort
  let base = s:normalize(a:vimfiles_path)
  let flavors = base . '/flavors'
  let flavor_paths = []
  for path in sort(split(glob(flavors . '/*', 1), "\n"))
    if isdirectory(path)
      call add(flavor_paths, flavors . '/' . fnamemodify(path, ':t'))
    endif
  endfor
  let after_paths = reverse(map(copy(flavor_paths), 'v:val . "/after"'))

  let entries = []
  let base_found = 0
  let after_found = 0
  for entry in split(&runtimepath, ',')
    let path = s:normalize(entry)
    if stridx(path, flavors . '/') == 0
      continue
    elseif path ==# base
      call add(entries, entry)
      call extend(entries, flavor_paths)
      let base_found = 1
    elseif path ==# base . '/after'
      call extend(entries, after_paths)
      call add(entries, entry)
      let after_found = 1
    else
      call add(entries, entry)
    endif
  endfor

  if !base_found
    let entries = [base] + flavor_paths + entries
  endif
  if !after_found
    let entries = entries + after_paths + [base . '/after']
  endif

  let &runtimepath = join(entries, ',')
endfunction

call s:bootstrap(s:vimfiles_path)
"#;

/// Generator for `flavors/bootstrap.vim`.
#[derive(Debug, Clone, Default)]
pub struct BootstrapScript {
    deployed: Vec<String>,
}

impl BootstrapScript {
    /// Script for a flavors directory currently holding `deployed`.
    ///
    /// The names only appear in the header comment. The script itself
    /// discovers flavors when it runs.
    pub fn new<I, S>(deployed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deployed: Vec<String> = deployed.into_iter().map(Into::into).collect();
        deployed.sort();
        deployed.dedup();
        Self { deployed }
    }

    /// Script text.
    pub fn render(&self) -> String {
        let mut script = String::from(
            "\" Generated by vim-flavor. Changes are overwritten on the next install.\n\
             \" Load it from your vimrc with:\n\
             \"   runtime flavors/bootstrap.vim\n",
        );
        if !self.deployed.is_empty() {
            script.push_str(&format!("\" Deployed: {}\n", self.deployed.join(", ")));
        }
        script.push_str("\nlet s:vimfiles_path = expand('<sfile>:p:h:h')\n");
        script.push_str(SCRIPT_BODY);
        script
    }

    /// Write the script into `flavors_dir`, returning its path.
    pub fn write(&self, flavors_dir: &Path) -> Result<PathBuf> {
        let path = flavors_dir.join(FlavorPath::BootstrapScript);
        flavor_fs::io::write_text(&NormalizedPath::new(&path), &self.render())?;
        tracing::debug!(path = %path.display(), "Wrote bootstrap script");
        Ok(path)
    }
}

/// Generate the bootstrap script text for `deployed` flavor directory names.
pub fn generate<I, S>(deployed: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    BootstrapScript::new(deployed).render()
}

/// The `'runtimepath'` entries the bootstrap script produces under `base`
/// for flavor directories named `deployed`, leaving out unrelated entries.
pub fn runtimepath_order<S: AsRef<str>>(base: &str, deployed: &[S]) -> Vec<String> {
    let base = NormalizedPath::new(base);
    let flavors = base.join(FlavorPath::FlavorsDir.as_str());

    let mut names: Vec<&str> = deployed.iter().map(|name| name.as_ref()).collect();
    names.sort_unstable();
    names.dedup();

    let plugins: Vec<NormalizedPath> = names.iter().map(|name| flavors.join(name)).collect();

    let mut order = Vec::with_capacity(plugins.len() * 2 + 2);
    order.push(base.to_string());
    order.extend(plugins.iter().map(ToString::to_string));
    order.extend(
        plugins
            .iter()
            .rev()
            .map(|p| p.join(FlavorPath::AfterDir.as_str()).to_string()),
    );
    order.push(base.join(FlavorPath::AfterDir.as_str()).to_string());
    order
}
