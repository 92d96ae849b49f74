//! minlua-lib: bootstrap layer for a Lua application linked into one executable.
//!
//! The crate provides the pieces the `minlua` binary strings together:
//! - `workdir`: moves the process into the directory holding the executable
//! - `lua::preload`: registers statically linked native modules in `package.preload`
//! - `boot`: owns the interpreter and runs the entry script under a traceback handler
//! - `native`: the native modules compiled into this crate

pub mod boot;
pub mod config;
pub mod consts;
pub mod error;
pub mod lua;
pub mod native;
pub mod workdir;

pub use boot::{Bootstrap, Report, Stage, run};
pub use config::BootConfig;
pub use error::{BootError, Phase, ScriptError};
