//! Parser for multi-file unified diffs.
//!
//! A state machine over the input lines:
//! - a line starting with `diff` and carrying at least three tokens starts a
//!   new file diff, flushing the previous one;
//! - a `--- <src>` line immediately followed by `+++ <dst>` sets the paths,
//!   stripping one leading path segment unless the path starts with `/`;
//! - `@@ -s[,sc] +d[,dc] @@` opens a hunk (an omitted count defaults to 1);
//!   while a hunk is open, `-`/`+`/` ` prefixed lines are consumed until both
//!   remaining counts reach zero;
//! - a bare `--` or `-- ` line outside any hunk begins the trailing footer and
//!   ends diff parsing for the rest of the file.

use super::{DiffLine, FileDiff, Hunk, LineKind, Patch};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header regex")
});

/// Diff parse failure with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Strip the `a/`/`b/` segment a diff tool prepends; sentinel paths starting
/// with `/` (i.e. `/dev/null`) pass through untouched.
fn strip_path_prefix(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        match path.split_once('/') {
            Some((_, rest)) => rest.to_string(),
            None => path.to_string(),
        }
    }
}

/// An in-progress hunk with its remaining line budget.
struct OpenHunk {
    hunk: Hunk,
    source_remaining: i64,
    dest_remaining: i64,
}

impl OpenHunk {
    fn is_complete(&self) -> bool {
        self.source_remaining <= 0 && self.dest_remaining <= 0
    }
}

pub fn parse(content: &str) -> Result<Patch, ParseError> {
    let lines: Vec<&str> = content.lines().collect();

    let mut patch = Patch::default();
    let mut current: Option<FileDiff> = None;
    let mut open_hunk: Option<OpenHunk> = None;
    let mut in_footer = false;

    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        let number = index + 1;
        index += 1;

        if in_footer {
            patch.footer.push(line.to_string());
            continue;
        }

        // Hunk body takes priority over everything else; a `--` or `diff`
        // shaped line inside a hunk is content, not structure.
        if let Some(hunk) = open_hunk.as_mut() {
            let diff_line = match line.chars().next() {
                Some('+') => DiffLine::new(&line[1..], LineKind::Added),
                Some('-') => DiffLine::new(&line[1..], LineKind::Removed),
                Some(' ') => DiffLine::new(&line[1..], LineKind::Unchanged),
                // Some tools emit entirely empty context lines.
                None => DiffLine::new("", LineKind::Unchanged),
                // "\ No newline at end of file" and friends.
                Some('\\') => continue,
                Some(other) => {
                    return Err(ParseError {
                        line: number,
                        message: format!("unexpected prefix `{}` inside hunk", other),
                    });
                }
            };
            if diff_line.kind.advances_source() {
                hunk.source_remaining -= 1;
            }
            if diff_line.kind.advances_dest() {
                hunk.dest_remaining -= 1;
            }
            hunk.hunk.lines.push(diff_line);

            if hunk.is_complete() {
                let finished = open_hunk.take().expect("hunk is open");
                current
                    .as_mut()
                    .expect("hunk belongs to a file diff")
                    .hunks
                    .push(finished.hunk);
            }
            continue;
        }

        if line.starts_with("diff") && line.split_whitespace().count() >= 3 {
            if let Some(finished) = current.take() {
                patch.files.push(finished);
            }
            current = Some(FileDiff {
                info: vec![line.to_string()],
                ..FileDiff::default()
            });
            continue;
        }

        if line == "--" || line == "-- " {
            in_footer = true;
            patch.footer.push(line.to_string());
            continue;
        }

        let Some(file) = current.as_mut() else {
            patch.header.push(line.to_string());
            continue;
        };

        if let Some(src) = line.strip_prefix("--- ")
            && !src.is_empty()
            && let Some(next) = lines.get(index)
            && let Some(dst) = next.strip_prefix("+++ ")
            && !dst.is_empty()
        {
            file.source = strip_path_prefix(src);
            file.dest = strip_path_prefix(dst);
            index += 1; // the +++ line is consumed as part of the pair
            continue;
        }

        if line.starts_with("@@") {
            let captures = HUNK_HEADER.captures(line).ok_or_else(|| ParseError {
                line: number,
                message: format!("malformed hunk header `{}`", line),
            })?;
            let number_at = |group: usize, default: usize| -> usize {
                captures
                    .get(group)
                    .map_or(default, |m| m.as_str().parse().expect("digits-only capture"))
            };
            let hunk = Hunk {
                source_start: number_at(1, 0),
                source_count: number_at(2, 1),
                dest_start: number_at(3, 0),
                dest_count: number_at(4, 1),
                lines: Vec::new(),
            };
            let open = OpenHunk {
                source_remaining: hunk.source_count as i64,
                dest_remaining: hunk.dest_count as i64,
                hunk,
            };
            // A 0,0 hunk carries no lines and closes on arrival.
            if open.is_complete() {
                file.hunks.push(open.hunk);
            } else {
                open_hunk = Some(open);
            }
            continue;
        }

        file.info.push(line.to_string());
    }

    if let Some(unfinished) = open_hunk {
        return Err(ParseError {
            line: lines.len(),
            message: format!(
                "truncated hunk: {} source and {} destination lines still expected",
                unfinished.source_remaining.max(0),
                unfinished.dest_remaining.max(0)
            ),
        });
    }

    if let Some(finished) = current.take() {
        patch.files.push(finished);
    }

    Ok(patch)
}
