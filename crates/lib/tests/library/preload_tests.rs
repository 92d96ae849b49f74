//! Native modules resolved through `package.preload` from a real entry script.

use minlua_lib::lua::preload;
use minlua_lib::{Phase, Stage};

use super::common::App;

#[test]
fn builtin_modules_are_registered() {
  let names: Vec<&str> = preload::entries().map(|e| e.name).collect();
  assert!(names.contains(&"memarray"));
  assert!(names.contains(&"collision.native"));
}

#[test]
fn memarray_is_importable_without_a_file() {
  let app = App::with_init(
    r#"
    local memarray = require("memarray")
    local collision = require("collision.native")
    local buf = memarray.new("int", 3)
    buf[2] = 9
    local out = assert(io.open(arg[1], "w"))
    out:write(#buf, " ", buf[2], " ", tostring(collision.circle_overlap(0, 0, 1, 1, 0, 1)))
    out:close()
    "#,
  );
  assert!(!app.path("memarray.lua").exists());
  let out = app.output();

  let report = app.run(&["prog", out.to_str().unwrap()]);
  assert!(report.is_success(), "{:?}", report.error());
  assert_eq!(app.read_output(), "3 9 true");
}

#[test]
fn unregistered_module_fails_like_a_missing_one() {
  let app = App::with_init(r#"require("definitely.not.registered")"#);

  let report = app.run(&["prog"]);
  let err = report.error().and_then(|e| e.script()).unwrap();
  assert!(
    err.message.contains("module 'definitely.not.registered' not found"),
    "{}",
    err.message
  );
}

#[test]
fn script_loaded_module_can_require_native_module() {
  let app = App::with_init(
    r#"
    package.path = arg[1] .. "/?.lua;" .. package.path
    return function()
      local shapes = require("shapes")
      assert(shapes.hit(), "expected overlap")
    end
    "#,
  );
  std::fs::write(
    app.path("shapes.lua"),
    r#"
    local collision = require("collision.native")
    return { hit = function() return collision.aabb_overlap(0, 0, 2, 2, 1, 1, 2, 2) end }
    "#,
  )
  .unwrap();
  let dir = app.temp.path().to_str().unwrap().to_string();

  let report = app.run(&["prog", &dir]);
  assert!(report.is_success(), "{:?}", report.error());
}

#[test]
fn native_module_error_keeps_message_and_traceback() {
  let app = App::with_init(
    r#"
    local memarray = require("memarray")
    local function build() return memarray.new("quad", 1) end
    build()
    "#,
  );

  let report = app.run(&["prog"]);
  assert_eq!(report.exit_code(), 1);
  let err = report.error().and_then(|e| e.script()).unwrap();
  assert_eq!(err.phase, Phase::Run);
  assert!(err.message.contains("unknown memarray type 'quad'"), "{}", err);
  assert!(!err.message.contains("error object is"), "{}", err);
  assert!(err.frame_count() > 1, "{}", err);
}

#[test]
fn native_error_inside_entry_point_keeps_traceback() {
  let app = App::with_init(
    r#"
    local memarray = require("memarray")
    return function()
      local buf = memarray.new("int", 2)
      buf[5] = 1
    end
    "#,
  );

  let report = app.run(&["prog"]);
  let err = report.error().and_then(|e| e.script()).unwrap();
  assert_eq!(err.phase, Phase::Entry);
  assert!(err.message.contains("out of range"), "{}", err);
  assert!(err.frame_count() > 1, "{}", err);
}

#[test]
fn huge_memarray_fails_the_script_without_aborting() {
  let app = App::with_init(r#"require("memarray").new("double", 2^60)"#);

  let report = app.run(&["prog"]);
  assert_eq!(report.exit_code(), 1);
  assert_eq!(report.count(Stage::Closed), 1);
  let err = report.error().and_then(|e| e.script()).unwrap();
  assert!(err.message.contains("exceeds"), "{}", err);
}
