//! Lua interpreter plumbing.
//!
//! # Submodules
//!
//! - [`runtime`] - Interpreter creation and the `arg` global
//! - [`preload`] - Native module registration in `package.preload`
//! - [`traceback`] - Protected calls under `debug.traceback`

pub mod preload;
pub mod runtime;
pub mod traceback;
