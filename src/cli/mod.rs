//! CLI argument parsing for patchport.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Patchport: port rename-mapping files and their patches between naming
/// namespaces.
///
/// Mapping files are tab-indented rename tables keyed by stable obfuscated
/// identities. `remap` translates the files themselves; `patches` re-expresses
/// unified-diff patches written against one namespace's files as equivalent
/// patches against another's.
#[derive(Parser, Debug)]
#[command(name = "patchport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for patchport.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate mapping files from one namespace to another.
    ///
    /// Accepts a single mapping file or a directory tree; directory trees are
    /// walked recursively and relative paths preserved in the output.
    Remap(RemapArgs),

    /// Reconcile a directory of patch files against another namespace.
    ///
    /// Each patch is read, its changed lines translated and relocated in the
    /// target namespace's files, and an equivalent patch written to the
    /// output directory. The input repository is checked out at each patch's
    /// parent commit to recover pre-images; HEAD is restored afterwards.
    Patches(PatchesArgs),
}

/// Arguments for the `remap` command.
#[derive(Parser, Debug)]
pub struct RemapArgs {
    /// Mapping file or directory tree to translate.
    pub input: PathBuf,

    /// Translation table file between the two namespaces.
    #[arg(short, long)]
    pub table: PathBuf,

    /// Output file or directory (defaults to in-place).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `patches` command.
#[derive(Parser, Debug)]
pub struct PatchesArgs {
    /// Directory of patch files to reconcile.
    pub patch_dir: PathBuf,

    /// Translation table file between the two namespaces.
    #[arg(short, long)]
    pub table: PathBuf,

    /// Git repository holding the source-namespace mapping history.
    #[arg(long)]
    pub input_repo: PathBuf,

    /// Directory holding the target-namespace files; reconciled patches are
    /// written here too.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Optional config file (defaults to patchport.yaml in the current
    /// directory when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers (overrides config).
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Context lines around each reconciled hunk (overrides config).
    #[arg(long)]
    pub context_lines: Option<usize>,

    /// Wall-clock budget for the whole run, in seconds (overrides config).
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
