//! Bootstrap sequence tests.

use minlua_lib::workdir::{self, SelfExe};
use minlua_lib::{BootConfig, Bootstrap, Phase, Stage};
use serial_test::serial;

use super::common::App;

const SUCCESS_STAGES: &[Stage] = &[
  Stage::Init,
  Stage::DirSwitch,
  Stage::InterpUp,
  Stage::StdlibLoaded,
  Stage::Preloaded,
  Stage::ArgsPublished,
  Stage::HandlerArmed,
  Stage::ScriptLoading,
  Stage::ScriptRunning,
];

fn with_tail(tail: &[Stage]) -> Vec<Stage> {
  SUCCESS_STAGES.iter().chain(tail).copied().collect()
}

#[test]
fn arg_table_matches_argv() {
  let app = App::with_init(
    r#"
    local out = assert(io.open(arg[1], "w"))
    local n = 0
    for _ in pairs(arg) do n = n + 1 end
    out:write(n, "\n")
    for i = 0, n - 1 do out:write(arg[i], "\n") end
    out:close()
    "#,
  );
  let out = app.output();
  let argv = ["prog", out.to_str().unwrap(), "a", "b c"];

  let report = app.run(&argv);
  assert!(report.is_success(), "{:?}", report.error());

  let content = app.read_output();
  let mut lines = content.lines();
  assert_eq!(lines.next(), Some("4"));
  assert_eq!(lines.collect::<Vec<_>>(), argv.to_vec());
}

#[test]
fn script_without_callable_skips_entry_call() {
  let app = App::with_init("print(arg[0], arg[1])");

  let report = app.run(&["prog", "a", "b"]);
  assert!(report.is_success());
  assert_eq!(report.exit_code(), 0);
  assert_eq!(report.stages, with_tail(&[Stage::Done, Stage::Closed]));
  assert_eq!(report.count(Stage::EntryCall), 0);
}

#[test]
fn preloaders_installed_and_interpreter_closed_once() {
  let app = App::with_init("return nil");

  let report = app.run(&["prog"]);
  assert!(report.is_success());
  assert_eq!(report.count(Stage::Preloaded), 1);
  assert_eq!(report.count(Stage::InterpUp), 1);
  assert_eq!(report.count(Stage::Closed), 1);
  assert_eq!(report.stages.last(), Some(&Stage::Closed));
}

#[test]
fn non_callable_return_value_is_ignored() {
  let app = App::with_init("return { not_a = 'function' }");

  let report = app.run(&["prog", "x"]);
  assert!(report.is_success());
  assert_eq!(report.count(Stage::EntryCall), 0);
}

#[test]
fn entry_point_receives_remaining_args() {
  let app = App::with_init(
    r##"
    return function(...)
      local out = assert(io.open(arg[1], "w"))
      out:write(select("#", ...), "\n", table.concat({ ... }, "\n"))
      out:close()
    end
    "##,
  );
  let out = app.output();
  let out = out.to_str().unwrap();

  let report = app.run(&["prog", out, "x", "y"]);
  assert!(report.is_success(), "{:?}", report.error());
  assert_eq!(report.stages, with_tail(&[Stage::EntryCall, Stage::Done, Stage::Closed]));
  assert_eq!(app.read_output(), format!("3\n{}\nx\ny", out));
}

#[test]
fn callable_table_is_an_entry_point() {
  let app = App::with_init(
    r#"
    return setmetatable({}, {
      __call = function(self, path, word)
        local out = assert(io.open(path, "w"))
        out:write(word)
        out:close()
      end,
    })
    "#,
  );
  let out = app.output();

  let report = app.run(&["prog", out.to_str().unwrap(), "called"]);
  assert!(report.is_success(), "{:?}", report.error());
  assert_eq!(app.read_output(), "called");
}

#[test]
fn entry_point_error_reports_message_and_traceback() {
  let app = App::with_init(r#"return function(x) error("boom: "..x) end"#);

  let report = app.run(&["prog", "42"]);
  assert_ne!(report.exit_code(), 0);
  assert_eq!(
    report.stages,
    with_tail(&[Stage::EntryCall, Stage::Failed, Stage::Closed])
  );

  let err = report.error().and_then(|e| e.script()).unwrap();
  assert_eq!(err.phase, Phase::Entry);
  assert!(err.message.contains("boom: 42"), "{}", err.message);
  assert!(err.frame_count() > 1, "{}", err);

  let rendered = report.error().unwrap().to_string();
  assert!(rendered.contains("boom: 42"));
  assert!(rendered.contains("stack traceback:"));
}

#[test]
fn top_level_error_fails_in_run_phase() {
  let app = App::with_init("local t = nil\nreturn t.field");

  let report = app.run(&["prog"]);
  assert!(!report.is_success());
  assert_eq!(report.stages, with_tail(&[Stage::Failed, Stage::Closed]));

  let err = report.error().and_then(|e| e.script()).unwrap();
  assert_eq!(err.phase, Phase::Run);
  assert!(err.message.contains("attempt to index"), "{}", err.message);
  assert!(err.frame_count() > 1, "{}", err);
}

#[test]
fn syntax_error_fails_while_loading() {
  let app = App::with_init("this is not lua");

  let report = app.run(&["prog"]);
  assert_ne!(report.exit_code(), 0);
  assert_eq!(report.count(Stage::ScriptRunning), 0);
  assert_eq!(report.count(Stage::Failed), 1);
  assert_eq!(report.count(Stage::Closed), 1);

  let err = report.error().and_then(|e| e.script()).unwrap();
  assert_eq!(err.phase, Phase::Load);
  assert!(err.message.contains("init.lua:1:"), "{}", err.message);
  assert!(err.traceback.is_some());
}

#[test]
fn missing_entry_script_is_a_load_error() {
  let app = App::empty();

  let report = app.run(&["prog"]);
  assert!(!report.is_success());

  let err = report.error().and_then(|e| e.script()).unwrap();
  assert_eq!(err.phase, Phase::Load);
  assert!(err.message.contains("cannot open"), "{}", err.message);
  assert!(err.to_string().contains("stack traceback:"));
}

#[test]
#[serial]
fn directory_switch_follows_config() {
  let app = App::with_init("return nil");
  let before = std::env::current_dir().unwrap();
  let supported = SelfExe::current() != SelfExe::Unsupported;

  let enabled = BootConfig::default().with_entry_script(app.path("init.lua"));
  let switched = Bootstrap::new(enabled).run(&["prog"]);
  let after_switch = std::env::current_dir().unwrap();
  std::env::set_current_dir(&before).unwrap();

  assert!(switched.is_success(), "{:?}", switched.error());
  assert_eq!(switched.directory_switched, supported);
  if supported {
    let exe_dir = workdir::exe_dir().unwrap();
    assert_eq!(after_switch, exe_dir);
  }

  let disabled = app.run(&["prog"]);
  assert!(disabled.is_success());
  assert!(!disabled.directory_switched);
  assert!(disabled.stages.contains(&Stage::DirSwitch));
  assert_eq!(std::env::current_dir().unwrap(), before);
}
