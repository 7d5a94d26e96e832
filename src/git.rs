//! Git collaborator for patchport.
//!
//! Provides a safe wrapper around git commands with captured stdout/stderr
//! and structured error handling, plus the small repository surface the
//! reconciler needs: HEAD inspection, dirty-state detection, and serialized
//! checkout windows. Checkout is not reentrant across commits, so all reads
//! of "the tree at ref X" happen inside a mutex-guarded window.

use crate::error::{PortError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }
}

/// Run a git command with the specified working directory.
///
/// Returns `Ok(GitOutput)` on exit code 0, `Err(PortError::Git)` otherwise.
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            PortError::Git(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);
    if !output.status.success() {
        return Err(PortError::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            if git_output.stderr.is_empty() {
                &git_output.stdout
            } else {
                &git_output.stderr
            }
        )));
    }

    Ok(git_output)
}

/// The input repository whose history holds the namespace-A content.
///
/// All checkouts go through [`Repository::read_at`], which holds a lock for
/// the duration of the read so concurrent workers never observe a tree that
/// belongs to another worker's checkout.
pub struct Repository {
    root: PathBuf,
    checkout_window: Mutex<()>,
    retired: AtomicBool,
}

impl Repository {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Repository {
            root: root.into(),
            checkout_window: Mutex::new(()),
            retired: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// What HEAD points to: the branch name if on a branch, else the
    /// detached commit SHA.
    pub fn head_ref(&self) -> Result<String> {
        match run_git(&self.root, &["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            Ok(output) => Ok(output.stdout),
            // Detached HEAD; fall back to the commit itself.
            Err(_) => Ok(run_git(&self.root, &["rev-parse", "HEAD"])?.stdout),
        }
    }

    /// Output of `git diff-index HEAD --`; non-empty means dirty.
    pub fn uncommitted_changes(&self) -> Result<String> {
        Ok(run_git(&self.root, &["diff-index", "HEAD", "--"])?.stdout)
    }

    /// Fail the whole batch up front if the repository is dirty; converting
    /// against an unknown tree would silently produce wrong output.
    pub fn ensure_clean(&self) -> Result<()> {
        let changes = self.uncommitted_changes().map_err(|e| {
            PortError::RepoState(format!("cannot inspect repository state: {}", e))
        })?;
        if !changes.is_empty() {
            return Err(PortError::RepoState(format!(
                "uncommitted changes in {}; commit or stash them first:\n{}",
                self.root.display(),
                changes
            )));
        }
        Ok(())
    }

    pub fn checkout(&self, refname: &str) -> Result<()> {
        run_git(&self.root, &["checkout", "--quiet", refname])?;
        Ok(())
    }

    /// Check out `refname` and run `read` against the tree while holding the
    /// checkout window. The closure must copy what it needs; the tree may be
    /// switched away the moment this returns.
    ///
    /// Once a [`HeadGuard`] has restored the original ref the repository is
    /// retired and further windows are refused, so a worker abandoned at the
    /// batch deadline cannot move HEAD afterwards.
    pub fn read_at<T>(
        &self,
        refname: &str,
        read: impl FnOnce(&Path) -> Result<T>,
    ) -> Result<T> {
        let _window = self
            .checkout_window
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.retired.load(Ordering::Acquire) {
            return Err(PortError::Git(format!(
                "refusing checkout of `{}`: {} was already restored to its original ref",
                refname,
                self.root.display()
            )));
        }
        self.checkout(refname)?;
        read(&self.root)
    }

    /// Record the current HEAD and return a guard restoring it on drop.
    pub fn guard_head(&self) -> Result<HeadGuard<'_>> {
        let original = self.head_ref().map_err(|e| {
            PortError::RepoState(format!("cannot determine repository HEAD: {}", e))
        })?;
        Ok(HeadGuard {
            repo: self,
            original,
        })
    }
}

/// Restores the repository to its original ref when dropped, so the batch
/// leaves the checkout as it found it regardless of success or failure.
pub struct HeadGuard<'a> {
    repo: &'a Repository,
    original: String,
}

impl HeadGuard<'_> {
    pub fn original_ref(&self) -> &str {
        &self.original
    }
}

impl Drop for HeadGuard<'_> {
    fn drop(&mut self) {
        // The restore takes the checkout window too, so it cannot interleave
        // with a still-running worker's read; retiring the repository first
        // keeps any later window from moving HEAD again.
        let _window = self
            .repo
            .checkout_window
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.repo.retired.store(true, Ordering::Release);
        if let Err(e) = self.repo.checkout(&self.original) {
            eprintln!(
                "warning: failed to restore {} to `{}`: {}",
                self.repo.root().display(),
                self.original,
                e
            );
        }
    }
}
