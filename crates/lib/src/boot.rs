//! Host bootstrap.
//!
//! Owns the interpreter for the whole run and drives it through a fixed
//! sequence:
//!
//! ```text
//! INIT -> DIRSWITCH -> INTERP_UP -> STDLIB_LOADED -> PRELOADED -> ARGS_PUBLISHED
//!      -> HANDLER_ARMED -> SCRIPT_LOADING -> SCRIPT_RUNNING -> (ENTRY_CALL) -> DONE
//! ```
//!
//! Any error while loading or running the entry script, or inside the entry
//! point it returns, ends in `FAILED`. The interpreter is dropped on every
//! path before [`Bootstrap::run`] returns. `CLOSED` is recorded when that
//! teardown is observed, not merely assumed.

use std::cell::Cell;
use std::ffi::OsStr;
use std::fmt;
use std::rc::Rc;

use mlua::prelude::*;
use tracing::debug;

use crate::config::BootConfig;
use crate::consts::{APP_NAME, EXIT_FAILURE, EXIT_SUCCESS};
use crate::error::{BootError, Phase};
use crate::lua::preload;
use crate::lua::runtime;
use crate::lua::traceback::{TracebackHandler, is_callable};
use crate::workdir;

/// States of the bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  Init,
  DirSwitch,
  InterpUp,
  StdlibLoaded,
  Preloaded,
  ArgsPublished,
  HandlerArmed,
  ScriptLoading,
  ScriptRunning,
  EntryCall,
  Done,
  Failed,
  /// The interpreter has been torn down.
  Closed,
}

impl Stage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Init => "init",
      Self::DirSwitch => "dirswitch",
      Self::InterpUp => "interp_up",
      Self::StdlibLoaded => "stdlib_loaded",
      Self::Preloaded => "preloaded",
      Self::ArgsPublished => "args_published",
      Self::HandlerArmed => "handler_armed",
      Self::ScriptLoading => "script_loading",
      Self::ScriptRunning => "script_running",
      Self::EntryCall => "entry_call",
      Self::Done => "done",
      Self::Failed => "failed",
      Self::Closed => "closed",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// What happened during one bootstrap run.
#[derive(Debug)]
pub struct Report {
  /// Every stage entered, in order.
  pub stages: Vec<Stage>,
  /// Whether the process moved into the executable's directory.
  pub directory_switched: bool,
  pub outcome: Result<(), BootError>,
}

impl Report {
  pub fn is_success(&self) -> bool {
    self.outcome.is_ok()
  }

  pub fn error(&self) -> Option<&BootError> {
    self.outcome.as_ref().err()
  }

  pub fn exit_code(&self) -> i32 {
    if self.is_success() { EXIT_SUCCESS } else { EXIT_FAILURE }
  }

  /// How many times `stage` was entered.
  pub fn count(&self, stage: Stage) -> usize {
    self.stages.iter().filter(|s| **s == stage).count()
  }
}

/// Stored in the interpreter's app data. Dropped together with the state,
/// bumping the shared counter.
struct CloseSignal(Rc<Cell<usize>>);

impl Drop for CloseSignal {
  fn drop(&mut self) {
    self.0.set(self.0.get() + 1);
  }
}

pub struct Bootstrap {
  config: BootConfig,
  stages: Vec<Stage>,
  closed: Rc<Cell<usize>>,
}

impl Bootstrap {
  pub fn new(config: BootConfig) -> Self {
    Self {
      config,
      stages: vec![Stage::Init],
      closed: Rc::new(Cell::new(0)),
    }
  }

  /// Run the whole sequence with `argv` as the process arguments.
  pub fn run<S: AsRef<OsStr>>(mut self, argv: &[S]) -> Report {
    self.enter(Stage::DirSwitch);
    let directory_switched = if self.config.switch_directory {
      workdir::resolve_and_chdir()
    } else {
      debug!("application directory switch disabled");
      false
    };

    let outcome = self.boot(argv);
    if let Err(e) = &outcome {
      match e.script() {
        Some(script) => debug!(phase = %script.phase, "entry script failed"),
        None => debug!(error = %e, "interpreter setup failed"),
      }
      self.enter(Stage::Failed);
    }
    for _ in 0..self.closed.replace(0) {
      debug!("interpreter closed");
      self.enter(Stage::Closed);
    }

    Report {
      stages: self.stages,
      directory_switched,
      outcome,
    }
  }

  fn enter(&mut self, stage: Stage) {
    debug!(stage = %stage, "bootstrap stage");
    self.stages.push(stage);
  }

  /// Everything between interpreter creation and teardown. The interpreter
  /// lives in this frame only, so it is dropped on every return path.
  fn boot<S: AsRef<OsStr>>(&mut self, argv: &[S]) -> Result<(), BootError> {
    let lua = runtime::create_interpreter();
    lua.set_app_data(CloseSignal(Rc::clone(&self.closed)));
    self.enter(Stage::InterpUp);

    runtime::load_std_libs(&lua)?;
    self.enter(Stage::StdlibLoaded);

    preload::install_preloaders(&lua)?;
    self.enter(Stage::Preloaded);

    runtime::publish_args(&lua, argv)?;
    self.enter(Stage::ArgsPublished);

    let handler = TracebackHandler::arm(&lua)?;
    self.enter(Stage::HandlerArmed);

    self.enter(Stage::ScriptLoading);
    let loader = runtime::entry_loader(&lua)?;
    let path = runtime::os_str_to_lua(&lua, self.config.entry_script.as_os_str())?;
    let chunk = handler
      .call(Phase::Load, LuaValue::Function(loader), LuaMultiValue::from_iter([LuaValue::String(path)]))
      .map_err(BootError::Script)?
      .pop_front()
      .unwrap_or(LuaValue::Nil);

    self.enter(Stage::ScriptRunning);
    let returned = handler
      .call(Phase::Run, chunk, LuaMultiValue::new())
      .map_err(BootError::Script)?;

    match returned.into_iter().next() {
      Some(entry) if is_callable(&entry) => {
        self.enter(Stage::EntryCall);
        let args = runtime::call_args(&lua, argv)?;
        debug!(args = args.len(), "calling entry point");
        handler.call(Phase::Entry, entry, args).map_err(BootError::Script)?;
      }
      Some(other) => debug!(kind = other.type_name(), "entry script returned a non-callable value"),
      None => debug!("entry script returned nothing"),
    }

    self.enter(Stage::Done);
    Ok(())
  }
}

/// Bootstrap with the default configuration and return the process status.
///
/// A failure, traceback included, is handed to `on_error` before the status is
/// returned.
pub fn run<S, F>(argv: &[S], on_error: F) -> i32
where
  S: AsRef<OsStr>,
  F: FnOnce(&BootError),
{
  debug!(app = APP_NAME, args = argv.len(), "starting");
  let report = Bootstrap::new(BootConfig::default()).run(argv);
  debug!(stages = ?report.stages, "bootstrap finished");
  if let Some(err) = report.error() {
    on_error(err);
  }
  report.exit_code()
}
