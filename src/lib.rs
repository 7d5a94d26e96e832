//! Patchport: port hierarchical rename-mapping files and their unified-diff
//! patches between naming namespaces.
//!
//! The core is the pair of tightly coupled subsystems:
//! - the mapping-file codec ([`mapping`]): parses tab-indented rename tables
//!   into a structural tree while invoking a per-entry translation hook, and
//!   serializes them back deterministically;
//! - the patch reconciler ([`reconcile`]): re-expresses a unified diff written
//!   against one namespace's files as an equivalent diff against another
//!   namespace's files, recomputing line numbers, hunk boundaries, and context.
//!
//! Everything else is plumbing around those two: the unified diff model
//! ([`diff`]), the generic indentation tree ([`tree`]), the translation oracle
//! interface ([`oracle`]), the git collaborator ([`git`]), and the batch
//! driver ([`batch`]).

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod git;
pub mod mapping;
pub mod oracle;
pub mod reconcile;
pub mod tree;
