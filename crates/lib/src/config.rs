//! Bootstrap configuration.

use std::path::PathBuf;

use crate::consts::ENTRY_SCRIPT;

/// Knobs of the bootstrap sequence.
///
/// The binary always runs with [`BootConfig::default`]: switch into the
/// executable's directory, then run `init.lua` from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfig {
  /// Entry script, resolved against the working directory after the switch.
  pub entry_script: PathBuf,
  /// Whether to move into the executable's directory before anything else.
  pub switch_directory: bool,
}

impl Default for BootConfig {
  fn default() -> Self {
    Self {
      entry_script: PathBuf::from(ENTRY_SCRIPT),
      switch_directory: true,
    }
  }
}

impl BootConfig {
  pub fn with_entry_script(mut self, path: impl Into<PathBuf>) -> Self {
    self.entry_script = path.into();
    self
  }

  pub fn without_directory_switch(mut self) -> Self {
    self.switch_directory = false;
    self
  }
}
