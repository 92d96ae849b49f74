//! Error types for the bootstrap sequence.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Header `debug.traceback` puts between the message and the frames.
const TRACEBACK_HEADER: &str = "stack traceback:";

/// Where a script failure surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// Reading or compiling the entry script.
  Load,
  /// Top-level execution of the entry script.
  Run,
  /// The callable returned by the entry script.
  Entry,
}

impl Phase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Load => "load",
      Self::Run => "run",
      Self::Entry => "entry",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A failure escaping the entry script, split into message and call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
  pub phase: Phase,
  pub message: String,
  /// Rendered frames, one per line, without the `stack traceback:` header.
  pub traceback: Option<String>,
}

impl ScriptError {
  pub fn new(phase: Phase, message: impl Into<String>) -> Self {
    Self {
      phase,
      message: message.into(),
      traceback: None,
    }
  }

  /// Split the output of the traceback handler into message and frames.
  pub fn from_handler_output(phase: Phase, text: &str) -> Self {
    if let Some(frames) = text.strip_prefix(TRACEBACK_HEADER) {
      // `error()` with no value: the handler renders the stack alone
      return Self {
        phase,
        message: String::new(),
        traceback: Some(frames.trim_start_matches('\n').to_string()),
      };
    }
    let header = format!("\n{}", TRACEBACK_HEADER);
    match text.split_once(&header) {
      Some((message, frames)) => Self {
        phase,
        message: message.to_string(),
        traceback: Some(frames.trim_start_matches('\n').to_string()),
      },
      None => Self::new(phase, text),
    }
  }

  /// Number of rendered call-stack frames.
  pub fn frame_count(&self) -> usize {
    self
      .traceback
      .as_deref()
      .map(|t| t.lines().filter(|l| !l.trim().is_empty()).count())
      .unwrap_or(0)
  }
}

impl fmt::Display for ScriptError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message)?;
    if let Some(frames) = &self.traceback {
      write!(f, "\n{}\n{}", TRACEBACK_HEADER, frames)?;
    }
    Ok(())
  }
}

impl std::error::Error for ScriptError {}

#[derive(Debug, Error)]
pub enum BootError {
  /// The interpreter could not be prepared for the entry script.
  #[error("failed to set up the Lua interpreter: {0}")]
  Setup(#[from] mlua::Error),

  #[error("{0}")]
  Script(ScriptError),
}

impl BootError {
  pub fn script(&self) -> Option<&ScriptError> {
    match self {
      Self::Script(err) => Some(err),
      Self::Setup(_) => None,
    }
  }
}

/// Why the working directory could not be switched. Never fatal.
#[derive(Debug, Error)]
pub enum WorkdirError {
  #[error("automatic application directory detection is not supported on this platform")]
  Unsupported,

  #[error("failed to locate the running executable: {0}")]
  SelfExe(#[source] io::Error),

  #[error("executable path has no parent directory: {}", .0.display())]
  NoParent(PathBuf),

  #[error("failed to change directory to {}: {source}", dir.display())]
  Chdir {
    dir: PathBuf,
    #[source]
    source: io::Error,
  },
}
