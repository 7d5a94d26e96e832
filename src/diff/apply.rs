//! Hunk application.

use super::{FileDiff, LineKind};

/// Apply a file diff to its exact source content, producing the destination
/// content.
///
/// Source lines before each hunk are copied through unchanged; inside a hunk,
/// added lines emit their text, removed lines consume one source line, and
/// unchanged lines emit and consume one. Remaining source lines are appended
/// after the last hunk.
///
/// The result is only meaningful when `source` is exactly the content the
/// diff was generated from; verifying that correspondence is the caller's
/// job.
pub fn apply<S: AsRef<str>>(source: &[S], diff: &FileDiff) -> Vec<String> {
    let mut out = Vec::new();
    let mut index = 0; // 0-based cursor into source

    for hunk in &diff.hunks {
        // A zero-source-count hunk is an insertion *after* line source_start,
        // so that line itself is still copied through.
        let copy_until = if hunk.source_count == 0 {
            hunk.source_start
        } else {
            hunk.source_start.saturating_sub(1)
        };
        while index < copy_until && index < source.len() {
            out.push(source[index].as_ref().to_string());
            index += 1;
        }

        for line in &hunk.lines {
            match line.kind {
                LineKind::Added => out.push(line.text.clone()),
                LineKind::Removed => index += 1,
                LineKind::Unchanged => {
                    out.push(line.text.clone());
                    index += 1;
                }
            }
        }
    }

    while index < source.len() {
        out.push(source[index].as_ref().to_string());
        index += 1;
    }

    out
}
