//! Filesystem utilities for patchport.
//!
//! Converted mapping and patch files are written atomically so an interrupted
//! batch never leaves a half-written output on disk.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
