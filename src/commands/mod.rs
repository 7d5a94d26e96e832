//! Command implementations for patchport.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod patches;
mod remap;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Remap(args) => remap::cmd_remap(args),
        Command::Patches(args) => patches::cmd_patches(args),
    }
}
