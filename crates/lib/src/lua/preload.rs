//! Native module registration.
//!
//! Native modules are linked into the executable, so there is nothing on disk
//! for `require` to find. Instead each module's initializer is stored in
//! `package.preload`, which Lua's first searcher consults before any
//! `package.path` or `package.cpath` lookup. Initializers run lazily, the
//! first time a script requires the name, and `require` caches the result in
//! `package.loaded` as usual.
//!
//! # Extending the set
//!
//! Built-in modules are listed in [`BUILTIN_PRELOADS`] behind cargo features.
//! Crates linked into the final executable can add their own without touching
//! this module:
//!
//! ```ignore
//! use minlua_lib::lua::preload::{EXTRA_PRELOADS, Preload};
//!
//! #[minlua_lib::lua::preload::linkme::distributed_slice(EXTRA_PRELOADS)]
//! static MIXER: Preload = Preload::new("mixer", mixer::open);
//! ```

pub use linkme;

use linkme::distributed_slice;
use mlua::prelude::*;
use tracing::debug;

use crate::native;

/// Native initializer: builds the module value handed back to `require`.
pub type Initializer = fn(&Lua) -> LuaResult<LuaTable>;

/// A (logical name, initializer) pair.
#[derive(Clone, Copy)]
pub struct Preload {
  /// Name passed to `require`, e.g. `"collision.native"`
  pub name: &'static str,
  pub init: Initializer,
}

impl Preload {
  pub const fn new(name: &'static str, init: Initializer) -> Self {
    Self { name, init }
  }
}

/// Modules compiled into this crate.
pub const BUILTIN_PRELOADS: &[Preload] = &[
  #[cfg(feature = "collision")]
  Preload::new("collision.native", native::collision::open),
  #[cfg(feature = "memarray")]
  Preload::new("memarray", native::memarray::open),
];

const _: () = assert!(names_unique(BUILTIN_PRELOADS), "duplicate built-in module name");

/// Modules contributed by other crates at link time.
#[distributed_slice]
pub static EXTRA_PRELOADS: [Preload];

const fn str_eq(a: &str, b: &str) -> bool {
  let (a, b) = (a.as_bytes(), b.as_bytes());
  if a.len() != b.len() {
    return false;
  }
  let mut i = 0;
  while i < a.len() {
    if a[i] != b[i] {
      return false;
    }
    i += 1;
  }
  true
}

const fn names_unique(entries: &[Preload]) -> bool {
  let mut i = 0;
  while i < entries.len() {
    let mut j = i + 1;
    while j < entries.len() {
      if str_eq(entries[i].name, entries[j].name) {
        return false;
      }
      j += 1;
    }
    i += 1;
  }
  true
}

/// Every module registered by [`install_preloaders`], built-ins first.
pub fn entries() -> impl Iterator<Item = &'static Preload> {
  BUILTIN_PRELOADS.iter().chain(EXTRA_PRELOADS.iter())
}

/// Register every native module in `package.preload`.
///
/// Must be called once per interpreter, after the standard library is open
/// and before any script runs. Returns the number of registered modules.
pub fn install_preloaders(lua: &Lua) -> LuaResult<usize> {
  install(lua, entries())
}

/// Register `entries` in `package.preload` without running any initializer.
pub fn install<'a>(lua: &Lua, entries: impl IntoIterator<Item = &'a Preload>) -> LuaResult<usize> {
  let package: LuaTable = lua.globals().get("package")?;
  let preload: LuaTable = package.get("preload")?;

  let mut count = 0;
  for entry in entries {
    let name = entry.name;
    let init = entry.init;
    let loader = lua.create_function(move |lua, _: LuaMultiValue| {
      debug!(module = name, "opening native module");
      init(lua)
    })?;
    preload.set(name, loader)?;
    count += 1;
  }

  debug!(count, "installed native module preloaders");
  Ok(count)
}
