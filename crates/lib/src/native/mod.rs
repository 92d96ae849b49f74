//! Native modules compiled into the executable.
//!
//! Each module exposes an `open` initializer with the
//! [`Initializer`](crate::lua::preload::Initializer) signature and is
//! registered in [`BUILTIN_PRELOADS`](crate::lua::preload::BUILTIN_PRELOADS).

#[cfg(feature = "collision")]
pub mod collision;
#[cfg(feature = "memarray")]
pub mod memarray;
