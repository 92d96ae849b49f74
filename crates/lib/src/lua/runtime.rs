use std::ffi::OsStr;

use mlua::prelude::*;
use mlua::{LuaOptions, StdLib};

use crate::consts::ARG_GLOBAL;

/// Create a bare interpreter with no standard libraries opened.
///
/// The state is created unsafe so that [`load_std_libs`] may open `debug`,
/// which the traceback handler depends on.
pub fn create_interpreter() -> Lua {
  // SAFETY: the unsafe state only lifts mlua's restriction on the `debug`
  // library and on loading C modules. Every native module we expose is a
  // Rust closure registered through `package.preload`.
  unsafe { Lua::unsafe_new_with(StdLib::NONE, LuaOptions::new()) }
}

/// Open the full standard library, `debug` included.
pub fn load_std_libs(lua: &Lua) -> LuaResult<()> {
  lua.load_std_libs(StdLib::ALL)
}

/// Convert a process argument into a Lua string, byte for byte where the
/// platform allows it.
pub fn os_str_to_lua(lua: &Lua, value: &OsStr) -> LuaResult<LuaString> {
  #[cfg(unix)]
  {
    use std::os::unix::ffi::OsStrExt;
    lua.create_string(value.as_bytes())
  }
  #[cfg(not(unix))]
  {
    lua.create_string(value.to_string_lossy().as_bytes())
  }
}

/// Publish the whole argument vector as the global `arg` table.
///
/// `arg[0]` is the program path and `arg[1..]` the script arguments.
pub fn publish_args<S: AsRef<OsStr>>(lua: &Lua, argv: &[S]) -> LuaResult<LuaTable> {
  let arg = lua.create_table_with_capacity(argv.len().saturating_sub(1), 1)?;
  for (i, value) in argv.iter().enumerate() {
    arg.raw_set(i as i64, os_str_to_lua(lua, value.as_ref())?)?;
  }
  lua.globals().set(ARG_GLOBAL, arg.clone())?;
  Ok(arg)
}

/// Chunk that compiles the file named by its first argument and returns it.
///
/// Runs inside the protected call so missing files and syntax errors reach the
/// traceback handler like any runtime error.
pub fn entry_loader(lua: &Lua) -> LuaResult<LuaFunction> {
  lua
    .load(
      r#"
      local path = ...
      local chunk, err = loadfile(path)
      if not chunk then
        error(err, 0)
      end
      return chunk
      "#,
    )
    .set_name("=(entry loader)")
    .into_function()
}

/// Script arguments (`argv[1..]`) as call arguments for the entry point.
pub fn call_args<S: AsRef<OsStr>>(lua: &Lua, argv: &[S]) -> LuaResult<LuaMultiValue> {
  argv
    .iter()
    .skip(1)
    .map(|value| os_str_to_lua(lua, value.as_ref()).map(LuaValue::String))
    .collect()
}
