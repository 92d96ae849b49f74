/// Entry script looked up in the working directory after the directory switch.
pub const ENTRY_SCRIPT: &str = "init.lua";

/// Global holding the raw argument vector, index 0 being the program path.
pub const ARG_GLOBAL: &str = "arg";

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Name the host reports itself under in logs and failure output.
pub const APP_NAME: &str = "minlua";
