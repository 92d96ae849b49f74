//! Working-directory resolution.
//!
//! Scripts and native modules open assets with relative paths, so the process
//! moves into the directory holding the executable before anything else runs.
//! That makes the binary behave the same whether it was started by a file
//! manager, through a symlink, via `PATH` lookup, or from another shell cwd.
//!
//! Failure here is never fatal: the bootstrap carries on in the inherited
//! working directory.

pub mod exe;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::WorkdirError;
pub use exe::SelfExe;

/// Directory containing the running executable.
pub fn exe_dir() -> Result<PathBuf, WorkdirError> {
  let exe = SelfExe::current().locate()?;
  exe
    .parent()
    .map(Path::to_path_buf)
    .ok_or_else(|| WorkdirError::NoParent(exe.clone()))
}

/// Change the process working directory to `dir`.
pub fn switch_to(dir: &Path) -> Result<(), WorkdirError> {
  std::env::set_current_dir(dir).map_err(|source| WorkdirError::Chdir {
    dir: dir.to_path_buf(),
    source,
  })
}

/// Move into the executable's directory, reporting whether that worked.
pub fn resolve_and_chdir() -> bool {
  let strategy = SelfExe::current();
  info!(strategy = %strategy, "switching to application directory");

  let result = exe_dir().and_then(|dir| switch_to(&dir).map(|_| dir));
  match result {
    Ok(dir) => {
      info!(dir = %dir.display(), "switched to application directory");
      true
    }
    Err(e) => {
      warn!(error = %e, "keeping inherited working directory");
      false
    }
  }
}
