//! Protected calls under `debug.traceback`.
//!
//! The handler is looked up once and then reused for every protected call
//! the bootstrap makes, so a failure at the top level of the entry script and
//! a failure inside its returned entry point are rendered the same way.
//!
//! `debug.traceback` leaves non-string error values untouched, which would
//! drop the stack for tables and for errors raised by native modules (mlua
//! passes those as userdata). The armed handler therefore turns the value
//! into a message first and only then asks for the traceback.

use mlua::prelude::*;

use crate::error::{Phase, ScriptError};

/// Message handler wrapping `debug.traceback`. Level 2 skips the handler
/// frame so the stack starts where the error was raised.
const MESSAGE_HANDLER: &str = r#"
local traceback = ...
return function(err)
  local kind = type(err)
  if kind == "number" then
    err = tostring(err)
  elseif kind == "userdata" then
    err = tostring(err)
  elseif kind == "table" then
    local mt = getmetatable(err)
    if type(mt) == "table" and mt.__tostring then
      err = tostring(err)
    else
      err = "(error object is a table value)"
    end
  elseif kind ~= "string" then
    err = "(error object is a " .. kind .. " value)"
  end
  return traceback(err, 2)
end
"#;

pub struct TracebackHandler {
  handler: LuaFunction,
  xpcall: LuaFunction,
}

impl TracebackHandler {
  /// Fetch `debug.traceback` once and wrap it in the message handler, with
  /// `xpcall` to drive it.
  pub fn arm(lua: &Lua) -> LuaResult<Self> {
    let globals = lua.globals();
    let debug: LuaTable = globals.get("debug")?;
    let traceback: LuaFunction = debug.get("traceback")?;
    let handler: LuaFunction = lua
      .load(MESSAGE_HANDLER)
      .set_name("=(traceback handler)")
      .call(traceback)?;
    let xpcall: LuaFunction = globals.get("xpcall")?;
    Ok(Self { handler, xpcall })
  }

  /// Call `func` with `args`, routing any error through the handler.
  pub fn call(&self, phase: Phase, func: LuaValue, args: LuaMultiValue) -> Result<LuaMultiValue, ScriptError> {
    let mut call_args = args;
    call_args.push_front(LuaValue::Function(self.handler.clone()));
    call_args.push_front(func);

    let mut results = self
      .xpcall
      .call::<LuaMultiValue>(call_args)
      .map_err(|e| ScriptError::from_handler_output(phase, &e.to_string()))?;

    match results.pop_front() {
      Some(LuaValue::Boolean(true)) => Ok(results),
      _ => Err(error_from_value(phase, results.pop_front().unwrap_or(LuaValue::Nil))),
    }
  }
}

/// Render an error value the way a standalone interpreter would.
fn error_from_value(phase: Phase, value: LuaValue) -> ScriptError {
  let text = match &value {
    LuaValue::String(s) => s.to_string_lossy(),
    LuaValue::Error(e) => e.to_string(),
    LuaValue::Integer(_) | LuaValue::Number(_) => value.to_string().unwrap_or_default(),
    LuaValue::Table(t) if has_metamethod(t, "__tostring") => value
      .to_string()
      .unwrap_or_else(|_| format!("(error object is a {} value)", value.type_name())),
    LuaValue::UserData(_) => value
      .to_string()
      .unwrap_or_else(|_| format!("(error object is a {} value)", value.type_name())),
    other => format!("(error object is a {} value)", other.type_name()),
  };
  ScriptError::from_handler_output(phase, &text)
}

fn has_metamethod(table: &LuaTable, name: &str) -> bool {
  table
    .metatable()
    .map(|mt| matches!(mt.raw_get::<LuaValue>(name), Ok(LuaValue::Function(_))))
    .unwrap_or(false)
}

/// Whether `value` can be called: a function, or a table with `__call`.
pub fn is_callable(value: &LuaValue) -> bool {
  match value {
    LuaValue::Function(_) => true,
    LuaValue::Table(t) => has_metamethod(t, "__call"),
    _ => false,
  }
}
