use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::error::WorkdirError;

/// Buffer size of the first `/proc/self/exe` read.
pub const INITIAL_CAPACITY: usize = 256;

/// How the running executable can be located on this platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelfExe {
  /// Read the `/proc/self/exe` symlink (Linux, Android)
  ProcFs,
  /// Ask the operating system (macOS, Windows, BSDs)
  OsQuery,
  /// No reliable mechanism
  Unsupported,
}

impl SelfExe {
  /// Strategy for the platform this binary was compiled for
  pub fn current() -> Self {
    if cfg!(any(target_os = "linux", target_os = "android")) {
      Self::ProcFs
    } else if cfg!(any(
      target_os = "macos",
      target_os = "windows",
      target_os = "freebsd",
      target_os = "netbsd",
      target_os = "openbsd",
      target_os = "dragonfly"
    )) {
      Self::OsQuery
    } else {
      Self::Unsupported
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ProcFs => "procfs",
      Self::OsQuery => "os-query",
      Self::Unsupported => "unsupported",
    }
  }

  /// Absolute, symlink-free path of the running executable
  pub fn locate(&self) -> Result<PathBuf, WorkdirError> {
    let raw = match self {
      Self::ProcFs => proc_self_exe()?,
      Self::OsQuery => std::env::current_exe().map_err(WorkdirError::SelfExe)?,
      Self::Unsupported => return Err(WorkdirError::Unsupported),
    };
    dunce::canonicalize(&raw).map_err(WorkdirError::SelfExe)
  }
}

impl fmt::Display for SelfExe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Run `read` with a buffer that doubles until the result fits.
///
/// `read` fills the buffer and returns the number of bytes written, like
/// `readlink(2)`. A result equal to the buffer length means the value may
/// have been truncated, so the read is retried with twice the capacity.
pub fn read_growing<F>(mut read: F) -> io::Result<Vec<u8>>
where
  F: FnMut(&mut [u8]) -> io::Result<usize>,
{
  let mut capacity = INITIAL_CAPACITY;
  loop {
    let mut buffer = vec![0u8; capacity];
    let len = read(&mut buffer)?;
    if len == 0 {
      return Err(io::Error::new(io::ErrorKind::InvalidData, "empty executable path"));
    }
    if len < capacity {
      buffer.truncate(len);
      return Ok(buffer);
    }
    capacity = capacity
      .checked_mul(2)
      .ok_or_else(|| io::Error::new(io::ErrorKind::OutOfMemory, "executable path too long"))?;
  }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn proc_self_exe() -> Result<PathBuf, WorkdirError> {
  use std::ffi::OsString;
  use std::os::unix::ffi::OsStringExt;

  let bytes = read_growing(|buffer| {
    // SAFETY: the path is a NUL-terminated literal and `buffer` is valid for
    // `buffer.len()` bytes of writes. readlink never writes a terminator.
    let ret = unsafe { libc::readlink(c"/proc/self/exe".as_ptr(), buffer.as_mut_ptr().cast(), buffer.len()) };
    if ret < 0 {
      Err(io::Error::last_os_error())
    } else {
      Ok(ret as usize)
    }
  })
  .map_err(WorkdirError::SelfExe)?;

  Ok(PathBuf::from(OsString::from_vec(bytes)))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn proc_self_exe() -> Result<PathBuf, WorkdirError> {
  Err(WorkdirError::Unsupported)
}
