//! Terminal output: logging setup and failure reports.

use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::EnvFilter;

/// Environment variable holding `tracing` filter directives.
pub const LOG_ENV: &str = "MINLUA_LOG";

const DEFAULT_FILTER: &str = "info";

pub mod symbols {
  pub const ERROR: &str = "✗";
}

/// Filter from `MINLUA_LOG`, falling back to `info`.
pub fn log_filter() -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr log subscriber.
pub fn init_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(log_filter())
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

/// Print a failure report. The first line is highlighted; the traceback
/// that follows is printed as is.
pub fn print_error(message: &str) {
  let (first, rest) = message.split_once('\n').unwrap_or((message, ""));
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    first.if_supports_color(Stream::Stderr, |s| s.red())
  );
  if !rest.is_empty() {
    eprintln!("{}", rest);
  }
}
