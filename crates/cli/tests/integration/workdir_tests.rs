//! The binary runs from its own directory regardless of the launch directory.

use predicates::prelude::*;
use serial_test::serial;

use super::common::TestApp;

#[test]
#[serial]
fn relative_paths_resolve_next_to_the_binary() {
  let app = TestApp::with_init(
    r#"
    local f = assert(io.open("marker.txt", "w"))
    f:write("here")
    f:close()
    "#,
  );

  app.cmd().assert().success();

  assert_eq!(std::fs::read_to_string(app.path("marker.txt")).unwrap(), "here");
  assert!(!app.launch_dir().join("marker.txt").exists());
}

#[test]
#[serial]
fn sibling_modules_are_required_from_the_app_directory() {
  let app = TestApp::with_init(
    r#"
    local helper = require("lib.helper")
    return function(name) print(helper.greet(name)) end
    "#,
  );
  app.write_file("lib/helper.lua", "return { greet = function(n) return 'hello ' .. n end }");

  app
    .cmd()
    .arg("world")
    .assert()
    .success()
    .stdout(predicate::str::contains("hello world"));
}

#[test]
#[serial]
fn directory_switch_is_logged() {
  let app = TestApp::with_init("return nil");

  app
    .cmd()
    .assert()
    .success()
    .stderr(predicate::str::contains("switched to application directory"));
}

#[test]
#[serial]
fn launch_directory_init_is_not_used() {
  let app = TestApp::empty();
  std::fs::write(app.launch_dir().join("init.lua"), "print('wrong init')").unwrap();

  app
    .cmd()
    .assert()
    .code(1)
    .stdout(predicate::str::contains("wrong init").not());
}
