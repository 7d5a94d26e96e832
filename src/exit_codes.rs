//! Exit code constants for the patchport CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable inputs, malformed table)
//! - 2: Conversion failure (at least one file could not be converted)
//! - 3: Git operation failure
//! - 4: Repository state error (dirty or unknown repository state)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable inputs, malformed translation table.
pub const USER_ERROR: i32 = 1;

/// Conversion failure: one or more files failed to parse, translate, or reconcile.
pub const CONVERSION_FAILURE: i32 = 2;

/// Git operation failure: checkout or state query errors.
pub const GIT_FAILURE: i32 = 3;

/// Repository state error: uncommitted changes or an unreadable HEAD.
pub const REPO_STATE_FAILURE: i32 = 4;
