//! Unified diff model: data structures and codec for multi-file patches.
//!
//! Supports the `git format-patch` mailbox shape: free-form header lines, one
//! or more per-file diffs (extended headers kept as opaque info lines), and an
//! optional trailing signature block after a bare `--` line. Parsing is
//! tolerant of extended headers; export is the exact textual inverse.

mod apply;
mod parser;

#[cfg(test)]
mod tests;

pub use apply::apply;
pub use parser::ParseError;

use std::fmt::Write;
use std::path::Path;

/// Path sentinel marking file creation (as source) or deletion (as destination).
pub const DEV_NULL: &str = "/dev/null";

/// How a diff line moves the source and destination line counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Present only in the destination; advances the destination counter.
    Added,
    /// Present only in the source; advances the source counter.
    Removed,
    /// Context; advances both counters.
    Unchanged,
}

impl LineKind {
    pub fn advances_source(&self) -> bool {
        matches!(self, LineKind::Removed | LineKind::Unchanged)
    }

    pub fn advances_dest(&self) -> bool {
        matches!(self, LineKind::Added | LineKind::Unchanged)
    }

    fn prefix(&self) -> char {
        match self {
            LineKind::Added => '+',
            LineKind::Removed => '-',
            LineKind::Unchanged => ' ',
        }
    }
}

/// One line of a hunk: its text (without the prefix character) and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub text: String,
    pub kind: LineKind,
}

impl DiffLine {
    pub fn new(text: impl Into<String>, kind: LineKind) -> Self {
        DiffLine {
            text: text.into(),
            kind,
        }
    }

    /// The line as it appears in a diff, prefix included.
    pub fn formatted(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.text)
    }
}

/// One contiguous change region with its source/destination line ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub source_start: usize,
    pub source_count: usize,
    pub dest_start: usize,
    pub dest_count: usize,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Count of lines advancing (source, destination); must equal the
    /// declared `source_count`/`dest_count`.
    pub fn advancing(&self) -> (usize, usize) {
        let source = self.lines.iter().filter(|l| l.kind.advances_source()).count();
        let dest = self.lines.iter().filter(|l| l.kind.advances_dest()).count();
        (source, dest)
    }

    fn export_into(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "@@ -{},{} +{},{} @@",
            self.source_start, self.source_count, self.dest_start, self.dest_count
        );
        for line in &self.lines {
            out.push_str(&line.formatted());
            out.push('\n');
        }
    }
}

/// A single file's change: paths, opaque leading info lines, and hunks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileDiff {
    pub source: String,
    pub dest: String,
    pub info: Vec<String>,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// `source == /dev/null`: the whole file is being created.
    pub fn is_creation(&self) -> bool {
        self.source == DEV_NULL
    }

    /// `dest == /dev/null`: the whole file is being deleted.
    pub fn is_deletion(&self) -> bool {
        self.dest == DEV_NULL
    }

    fn export_into(&self, out: &mut String) {
        for line in &self.info {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("--- ");
        out.push_str(&prefixed_path(&self.source, "a/"));
        out.push_str("\n+++ ");
        out.push_str(&prefixed_path(&self.dest, "b/"));
        out.push('\n');
        for hunk in &self.hunks {
            hunk.export_into(out);
        }
    }
}

/// Re-add the `a/`/`b/` segment stripped at parse time; sentinel paths
/// starting with `/` are emitted as-is.
fn prefixed_path(path: &str, prefix: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}{}", prefix, path)
    }
}

/// A multi-file patch: header lines, per-file diffs, trailing footer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Patch {
    pub header: Vec<String>,
    pub files: Vec<FileDiff>,
    pub footer: Vec<String>,
}

impl Patch {
    /// Parse a patch from its textual form.
    pub fn parse(content: &str) -> Result<Patch, ParseError> {
        parser::parse(content)
    }

    /// Read and parse a patch file.
    pub fn read<P: AsRef<Path>>(path: P) -> crate::error::Result<Patch> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| crate::error::PortError::io(path, e))?;
        Self::parse(&content).map_err(|e| crate::error::PortError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The commit a mailbox patch was generated from, taken from the first
    /// header line (`From <sha> Mon Sep 17 00:00:00 2001`).
    pub fn source_commit(&self) -> Option<&str> {
        let first = self.header.first()?;
        let rest = first.strip_prefix("From ")?;
        let sha = rest.split_whitespace().next()?;
        (!sha.is_empty() && sha.chars().all(|c| c.is_ascii_hexdigit())).then_some(sha)
    }

    /// Serialize back to text; the exact inverse of parsing.
    pub fn export(&self) -> String {
        let mut out = String::new();
        for line in &self.header {
            out.push_str(line);
            out.push('\n');
        }
        for file in &self.files {
            file.export_into(&mut out);
        }
        for line in &self.footer {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
