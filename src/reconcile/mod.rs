//! Patch reconciliation: re-expressing a source-namespace patch against the
//! target namespace's files.
//!
//! The hunks of the incoming patch carry line numbers that only mean anything
//! in the source namespace, so they cannot be applied to the target files
//! directly. Instead, each changed line is translated through the definition
//! tables recorded while parsing the pre- and post-images, located by exact
//! text in the corresponding target content, and a fresh set of hunks is
//! derived from those positions. Context lines are taken from the target
//! files, never from the incoming patch.

mod segment;
mod translate;

#[cfg(test)]
mod tests;

pub use translate::{DefinitionTable, RecordingOracle};

use crate::diff::{apply, DiffLine, FileDiff, Hunk, LineKind, Patch, DEV_NULL};
use crate::error::{PortError, Result};
use crate::mapping;
use crate::oracle::Oracle;
use crate::tree::IndentTree;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Default number of context lines around each change, matching
/// `git format-patch`.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub context_lines: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// Read access to one side's file tree, keyed by patch-relative path.
pub trait FileSource {
    fn read_lines(&self, path: &str) -> Result<Vec<String>>;
}

/// Files on disk under a root directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }
}

impl FileSource for DirSource {
    fn read_lines(&self, path: &str) -> Result<Vec<String>> {
        let full = self.root.join(path);
        let content = std::fs::read_to_string(&full).map_err(|e| PortError::io(&full, e))?;
        Ok(content
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect())
    }
}

/// Pre-captured file contents, used for trees read inside a checkout window
/// that may be switched away before reconciliation runs.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: &str) {
        self.files.insert(
            path.into(),
            content
                .lines()
                .map(|l| l.trim_end_matches('\r').to_string())
                .collect(),
        );
    }
}

impl FileSource for MemorySource {
    fn read_lines(&self, path: &str) -> Result<Vec<String>> {
        self.files.get(path).cloned().ok_or_else(|| {
            PortError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not captured from the source revision",
                ),
            )
        })
    }
}

/// A reconciled patch plus non-fatal warnings worth surfacing to the user.
#[derive(Debug)]
pub struct Reconciled {
    pub patch: Patch,
    pub warnings: Vec<String>,
}

/// Reconcile a whole patch against the target namespace.
///
/// `source_tree` provides the source-namespace files as they stood before the
/// patch; `target_tree` provides the target namespace's current files. Files
/// whose reconciled form shows no change are dropped from the output; the
/// original header and footer are carried over unchanged.
pub fn reconcile_patch(
    patch: &Patch,
    oracle: &dyn Oracle,
    source_tree: &dyn FileSource,
    target_tree: &dyn FileSource,
    options: &ReconcileOptions,
) -> Result<Reconciled> {
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for file in &patch.files {
        if file.is_creation() && file.is_deletion() {
            return Err(PortError::Reconcile {
                line: file.info.first().cloned().unwrap_or_default(),
                message: "file diff is both a creation and a deletion".to_string(),
            });
        }
        let reconciled = if file.is_creation() {
            reconcile_creation(file, oracle)?
        } else if file.is_deletion() {
            reconcile_deletion(file, target_tree)?
        } else {
            reconcile_modification(file, oracle, source_tree, target_tree, options, &mut warnings)?
        };
        if let Some(diff) = reconciled {
            files.push(diff);
        }
    }

    Ok(Reconciled {
        patch: Patch {
            header: patch.header.clone(),
            files,
            footer: patch.footer.clone(),
        },
        warnings,
    })
}

/// One image of a mapping file with everything line translation needs.
struct Image {
    lines: Vec<String>,
    tree: IndentTree,
    table: DefinitionTable,
}

impl Image {
    /// Parse the lines, recording every definition query the codec makes.
    fn build(lines: Vec<String>, oracle: &dyn Oracle, path: &str) -> Result<Image> {
        let recorder = RecordingOracle::new(oracle);
        mapping::parse_lines(&lines, &recorder).map_err(|e| PortError::Parse {
            path: PathBuf::from(path),
            message: e.to_string(),
        })?;
        let tree = IndentTree::build(&lines);
        Ok(Image {
            lines,
            tree,
            table: recorder.into_table(),
        })
    }

    /// Translate one line; a miss is fatal.
    fn translate_line(&self, index: usize) -> Result<String> {
        translate::translate_line(index, &self.lines, &self.tree, &self.table)
    }

    /// Translate the whole image, keeping the original text of any line
    /// whose identity the oracle cannot resolve. Mirrors the codec's
    /// miss-is-a-warning behavior so unresolved lines still pair with the
    /// target file's kept-original form.
    fn translate_all(&self) -> Result<Vec<String>> {
        (0..self.lines.len())
            .map(|index| match self.translate_line(index) {
                Ok(line) => Ok(line),
                Err(PortError::TranslationMiss { .. }) => Ok(self.lines[index].clone()),
                Err(e) => Err(e),
            })
            .collect()
    }
}

/// A created file has no target counterpart yet: translate the full new
/// content and emit it as one whole-file addition hunk. Every line is new,
/// so translation misses are fatal here.
fn reconcile_creation(file: &FileDiff, oracle: &dyn Oracle) -> Result<Option<FileDiff>> {
    let content = apply(&[] as &[&str], file);
    let image = Image::build(content, oracle, &file.dest)?;

    let lines: Vec<DiffLine> = (0..image.lines.len())
        .map(|index| Ok(DiffLine::new(image.translate_line(index)?, LineKind::Added)))
        .collect::<Result<_>>()?;
    let count = lines.len();

    Ok(Some(FileDiff {
        source: DEV_NULL.to_string(),
        dest: file.dest.clone(),
        info: file.info.clone(),
        hunks: vec![Hunk {
            source_start: 0,
            source_count: 0,
            dest_start: 1,
            dest_count: count,
            lines,
        }],
    }))
}

/// A deleted file is removed wholesale: the hunk carries the target file's
/// own current content, not a translation of the source side.
fn reconcile_deletion(file: &FileDiff, target_tree: &dyn FileSource) -> Result<Option<FileDiff>> {
    let target = target_tree.read_lines(&file.source)?;
    if target.is_empty() {
        return Ok(None);
    }

    let count = target.len();
    let lines = target
        .into_iter()
        .map(|text| DiffLine::new(text, LineKind::Removed))
        .collect();

    Ok(Some(FileDiff {
        source: file.source.clone(),
        dest: DEV_NULL.to_string(),
        info: file.info.clone(),
        hunks: vec![Hunk {
            source_start: 1,
            source_count: count,
            dest_start: 0,
            dest_count: 0,
            lines,
        }],
    }))
}

fn reconcile_modification(
    file: &FileDiff,
    oracle: &dyn Oracle,
    source_tree: &dyn FileSource,
    target_tree: &dyn FileSource,
    options: &ReconcileOptions,
    warnings: &mut Vec<String>,
) -> Result<Option<FileDiff>> {
    let pre = Image::build(source_tree.read_lines(&file.source)?, oracle, &file.source)?;
    let target_pre = target_tree.read_lines(&file.source)?;

    if pre.translate_all()? != target_pre {
        warnings.push(format!(
            "{}: target content differs from the translated source file",
            file.source
        ));
    }

    let post = Image::build(apply(&pre.lines, file), oracle, &file.dest)?;
    let target_post = post.translate_all()?;

    // Locate each changed line of the incoming patch in the target content,
    // claiming one occurrence per line so duplicates stay distinct.
    let mut removed = HashSet::new();
    let mut added = HashSet::new();
    for hunk in &file.hunks {
        let mut source_pos = hunk.source_start.saturating_sub(1);
        let mut dest_pos = hunk.dest_start.saturating_sub(1);
        for line in &hunk.lines {
            match line.kind {
                LineKind::Removed => {
                    expect_line(&pre.lines, source_pos, &line.text, &file.source)?;
                    let text = pre.translate_line(source_pos)?;
                    locate(&target_pre, &text, &mut removed, "target file")?;
                    source_pos += 1;
                }
                LineKind::Added => {
                    let text = post.translate_line(dest_pos)?;
                    locate(&target_post, &text, &mut added, "reconciled content")?;
                    dest_pos += 1;
                }
                LineKind::Unchanged => {
                    expect_line(&pre.lines, source_pos, &line.text, &file.source)?;
                    source_pos += 1;
                    dest_pos += 1;
                }
            }
        }
    }

    let hunks = segment::segment(
        &target_pre,
        &target_post,
        &removed,
        &added,
        options.context_lines,
    )?;
    if hunks.is_empty() {
        return Ok(None);
    }

    Ok(Some(FileDiff {
        source: file.source.clone(),
        dest: file.dest.clone(),
        info: file.info.clone(),
        hunks,
    }))
}

/// Hunk line numbers that point at different text mean the patch does not
/// belong to the revision it was read against.
fn expect_line(lines: &[String], index: usize, expected: &str, path: &str) -> Result<()> {
    if lines.get(index).map(String::as_str) == Some(expected) {
        return Ok(());
    }
    Err(PortError::Reconcile {
        line: expected.to_string(),
        message: format!(
            "{} line {} does not match the patch; was it generated from this revision?",
            path,
            index + 1
        ),
    })
}

/// First unclaimed occurrence of `text`, claimed on success.
fn locate(
    lines: &[String],
    text: &str,
    claimed: &mut HashSet<usize>,
    side: &str,
) -> Result<usize> {
    let found = lines
        .iter()
        .enumerate()
        .find(|(k, line)| line.as_str() == text && !claimed.contains(k))
        .map(|(k, _)| k);
    match found {
        Some(k) => {
            claimed.insert(k);
            Ok(k)
        }
        None => Err(PortError::Reconcile {
            line: text.to_string(),
            message: format!("translated line not found in the {}", side),
        }),
    }
}
