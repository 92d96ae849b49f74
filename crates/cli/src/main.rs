mod output;

use std::ffi::OsString;
use std::process::ExitCode;

fn main() -> ExitCode {
  output::init_logging();

  let argv: Vec<OsString> = std::env::args_os().collect();
  let code = minlua_lib::run(&argv, |err| output::print_error(&err.to_string()));
  ExitCode::from(code as u8)
}
