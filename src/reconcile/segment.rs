//! Pairing sweep and hunk segmentation.
//!
//! Once the changed lines have been located in the target namespace's pre-
//! and post-images, a single linear sweep walks both images in step and
//! produces an ordered line stream. Change runs separated by a short stretch
//! of unchanged lines are merged into one hunk; each hunk is padded with
//! context on both sides.

use crate::diff::{DiffLine, Hunk, LineKind};
use crate::error::{PortError, Result};
use std::collections::HashSet;

/// One swept line with the source and destination counters as they stood
/// before it, needed later to number the hunks.
#[derive(Debug)]
struct SweptLine {
    line: DiffLine,
    source_before: usize,
    dest_before: usize,
}

/// Walk `source` and `dest` in step, consuming marked removals from the
/// source side and marked additions from the destination side. A removal
/// standing at the same position as an addition is emitted first. Every
/// unmarked pair must match exactly; anything else means the located changes
/// do not account for the difference between the two images.
fn sweep<S: AsRef<str>>(
    source: &[S],
    dest: &[S],
    removed: &HashSet<usize>,
    added: &HashSet<usize>,
) -> Result<Vec<SweptLine>> {
    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;

    loop {
        if i < source.len() && removed.contains(&i) {
            out.push(SweptLine {
                line: DiffLine::new(source[i].as_ref(), LineKind::Removed),
                source_before: i,
                dest_before: j,
            });
            i += 1;
        } else if j < dest.len() && added.contains(&j) {
            out.push(SweptLine {
                line: DiffLine::new(dest[j].as_ref(), LineKind::Added),
                source_before: i,
                dest_before: j,
            });
            j += 1;
        } else if i < source.len() && j < dest.len() {
            if source[i].as_ref() != dest[j].as_ref() {
                return Err(PortError::Reconcile {
                    line: source[i].as_ref().to_string(),
                    message: format!(
                        "line {} does not match the reconciled content `{}`; \
                         the target files have drifted from the source namespace",
                        i + 1,
                        dest[j].as_ref()
                    ),
                });
            }
            out.push(SweptLine {
                line: DiffLine::new(source[i].as_ref(), LineKind::Unchanged),
                source_before: i,
                dest_before: j,
            });
            i += 1;
            j += 1;
        } else if i < source.len() {
            return Err(PortError::Reconcile {
                line: source[i].as_ref().to_string(),
                message: format!("trailing line {} has no counterpart after the change", i + 1),
            });
        } else if j < dest.len() {
            return Err(PortError::Reconcile {
                line: dest[j].as_ref().to_string(),
                message: format!(
                    "reconciled content has a trailing line {} not produced by the change",
                    j + 1
                ),
            });
        } else {
            break;
        }
    }

    Ok(out)
}

/// Cancel removal/addition pairs that carry identical text at the same
/// aligned position. A source-namespace change that translates to the text
/// already present in the target is invisible there and must not produce a
/// hunk. A pair only cancels when the surviving lines before both sides line
/// up, so a genuine move of identical text is kept.
fn cancel_noop_pairs<S: AsRef<str>>(
    source: &[S],
    dest: &[S],
    removed: &mut HashSet<usize>,
    added: &mut HashSet<usize>,
) {
    loop {
        let removals: Vec<usize> = {
            let mut v: Vec<usize> = removed.iter().copied().collect();
            v.sort_unstable();
            v
        };
        let additions: Vec<usize> = {
            let mut v: Vec<usize> = added.iter().copied().collect();
            v.sort_unstable();
            v
        };

        let mut cancel = None;
        'search: for &i in &removals {
            let rank_i = i - removals.iter().filter(|&&r| r < i).count();
            for &j in &additions {
                if dest[j].as_ref() == source[i].as_ref() {
                    let rank_j = j - additions.iter().filter(|&&a| a < j).count();
                    if rank_i == rank_j {
                        cancel = Some((i, j));
                        break 'search;
                    }
                }
            }
        }

        match cancel {
            Some((i, j)) => {
                removed.remove(&i);
                added.remove(&j);
            }
            None => break,
        }
    }
}

/// Build the hunks describing the difference between `source` and `dest`,
/// given the change positions located earlier.
///
/// Two change runs land in the same hunk when the unchanged gap between them
/// is at most `2 * context_lines`; with a wider gap their context paddings
/// cannot touch and they become separate hunks. Returns no hunks when
/// nothing changed.
pub fn segment<S: AsRef<str>>(
    source: &[S],
    dest: &[S],
    removed: &HashSet<usize>,
    added: &HashSet<usize>,
    context_lines: usize,
) -> Result<Vec<Hunk>> {
    let mut removed = removed.clone();
    let mut added = added.clone();
    cancel_noop_pairs(source, dest, &mut removed, &mut added);
    let swept = sweep(source, dest, &removed, &added)?;

    let changed: Vec<usize> = swept
        .iter()
        .enumerate()
        .filter(|(_, s)| s.line.kind != LineKind::Unchanged)
        .map(|(k, _)| k)
        .collect();
    if changed.is_empty() {
        return Ok(Vec::new());
    }

    // Group changed positions into runs that share a hunk.
    let mut groups: Vec<(usize, usize)> = Vec::new();
    let mut start = changed[0];
    let mut end = changed[0];
    for &k in &changed[1..] {
        if k - end - 1 > 2 * context_lines {
            groups.push((start, end));
            start = k;
        }
        end = k;
    }
    groups.push((start, end));

    let mut hunks = Vec::new();
    for (first, last) in groups {
        let lo = first.saturating_sub(context_lines);
        let hi = (last + context_lines).min(swept.len() - 1);

        let lines: Vec<DiffLine> = swept[lo..=hi].iter().map(|s| s.line.clone()).collect();
        let source_count = lines.iter().filter(|l| l.kind.advances_source()).count();
        let dest_count = lines.iter().filter(|l| l.kind.advances_dest()).count();

        // Unified convention: a zero count names the line before the hunk.
        let source_before = swept[lo].source_before;
        let dest_before = swept[lo].dest_before;
        hunks.push(Hunk {
            source_start: if source_count == 0 { source_before } else { source_before + 1 },
            source_count,
            dest_start: if dest_count == 0 { dest_before } else { dest_before + 1 },
            dest_count,
            lines,
        });
    }

    Ok(hunks)
}
