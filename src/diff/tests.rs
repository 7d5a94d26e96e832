//! Tests for the unified diff model.

use super::{apply, DiffLine, FileDiff, Hunk, LineKind, Patch, DEV_NULL};

const MAILBOX_FIXTURE: &str = "\
From 0123abcd456 Mon Sep 17 00:00:00 2001
From: Dev <dev@example.com>
Subject: [PATCH] rename bar things

diff --git a/mappings/net/foo/Bar.mapping b/mappings/net/foo/Bar.mapping
index 1111111..2222222 100644
--- a/mappings/net/foo/Bar.mapping
+++ b/mappings/net/foo/Bar.mapping
@@ -1,3 +1,3 @@
 CLASS net/foo/Bar
-\tFIELD a oldName I
+\tFIELD a newName I
 \tMETHOD m run ()V
--
2.35.1
";

/// The mailbox shape parses into header, one file diff, and footer.
#[test]
fn parses_mailbox_patch() {
    let patch = Patch::parse(MAILBOX_FIXTURE).unwrap();

    assert_eq!(patch.header.len(), 4);
    assert!(patch.header[0].starts_with("From 0123abcd456"));
    assert_eq!(patch.footer, vec!["--".to_string(), "2.35.1".to_string()]);

    assert_eq!(patch.files.len(), 1);
    let file = &patch.files[0];
    assert_eq!(file.source, "mappings/net/foo/Bar.mapping");
    assert_eq!(file.dest, "mappings/net/foo/Bar.mapping");
    assert_eq!(file.info.len(), 2); // diff --git + index lines
    assert_eq!(file.hunks.len(), 1);

    let hunk = &file.hunks[0];
    assert_eq!(
        (hunk.source_start, hunk.source_count, hunk.dest_start, hunk.dest_count),
        (1, 3, 1, 3)
    );
    assert_eq!(hunk.lines[1].kind, LineKind::Removed);
    assert_eq!(hunk.lines[1].text, "\tFIELD a oldName I");
}

/// Export is the exact textual inverse of parsing.
#[test]
fn export_round_trips() {
    let patch = Patch::parse(MAILBOX_FIXTURE).unwrap();
    assert_eq!(patch.export(), MAILBOX_FIXTURE);
}

/// `@@ -10,2 +10,3 @@` must consume exactly 2 source-advancing and 3
/// destination-advancing lines.
#[test]
fn hunk_line_budget_matches_declared_counts() {
    let input = "\
diff --git a/f b/f
--- a/f
+++ b/f
@@ -10,2 +10,3 @@
 unchanged
-removedOld
+addedNew1
+addedNew2
";
    let patch = Patch::parse(input).unwrap();
    let hunk = &patch.files[0].hunks[0];

    assert_eq!(hunk.lines.len(), 4);
    assert_eq!(hunk.advancing(), (2, 3));
    assert_eq!(hunk.advancing(), (hunk.source_count, hunk.dest_count));
}

/// An omitted count in a hunk header defaults to 1.
#[test]
fn omitted_counts_default_to_one() {
    let input = "\
diff --git a/f b/f
--- a/f
+++ b/f
@@ -5 +5 @@
-old
+new
";
    let patch = Patch::parse(input).unwrap();
    let hunk = &patch.files[0].hunks[0];
    assert_eq!(
        (hunk.source_start, hunk.source_count, hunk.dest_start, hunk.dest_count),
        (5, 1, 5, 1)
    );
}

/// `/dev/null` paths mark creation/deletion and are not prefix-stripped.
#[test]
fn dev_null_sentinels() {
    let input = "\
diff --git a/new.mapping b/new.mapping
--- /dev/null
+++ b/new.mapping
@@ -0,0 +1,2 @@
+CLASS a/B
+\tFIELD f x I
diff --git a/gone.mapping b/gone.mapping
--- a/gone.mapping
+++ /dev/null
@@ -1,1 +0,0 @@
-CLASS a/C
";
    let patch = Patch::parse(input).unwrap();
    assert_eq!(patch.files.len(), 2);

    let created = &patch.files[0];
    assert!(created.is_creation());
    assert_eq!(created.source, DEV_NULL);
    assert_eq!(created.dest, "new.mapping");

    let deleted = &patch.files[1];
    assert!(deleted.is_deletion());
    assert_eq!(deleted.source, "gone.mapping");

    // Sentinels survive a round trip unprefixed.
    let exported = patch.export();
    assert!(exported.contains("--- /dev/null"));
    assert!(exported.contains("+++ /dev/null"));
    assert!(exported.contains("+++ b/new.mapping"));
}

/// A `--` shaped line inside a hunk is a removed line, not the footer.
#[test]
fn footer_marker_inside_hunk_is_content() {
    let input = "\
diff --git a/f b/f
--- a/f
+++ b/f
@@ -1,2 +1,1 @@
-- x
 keep
--
sig
";
    let patch = Patch::parse(input).unwrap();
    let hunk = &patch.files[0].hunks[0];
    assert_eq!(hunk.lines[0].kind, LineKind::Removed);
    assert_eq!(hunk.lines[0].text, "- x");
    assert_eq!(patch.footer, vec!["--".to_string(), "sig".to_string()]);
}

/// A hunk cut off mid-way is a parse error.
#[test]
fn truncated_hunk_is_rejected() {
    let input = "\
diff --git a/f b/f
--- a/f
+++ b/f
@@ -1,5 +1,5 @@
 only one line
";
    let err = Patch::parse(input).unwrap_err();
    assert!(err.message.contains("truncated hunk"));
}

/// Malformed hunk headers are rejected rather than silently skipped.
#[test]
fn malformed_hunk_header_is_rejected() {
    let input = "\
diff --git a/f b/f
--- a/f
+++ b/f
@@ -x,1 +1,1 @@
";
    let err = Patch::parse(input).unwrap_err();
    assert_eq!(err.line, 4);
}

/// `\ No newline at end of file` markers are skipped without disturbing
/// line accounting.
#[test]
fn no_newline_marker_is_skipped() {
    let input = "\
diff --git a/f b/f
--- a/f
+++ b/f
@@ -1,1 +1,1 @@
-old
\\ No newline at end of file
+new
";
    let patch = Patch::parse(input).unwrap();
    assert_eq!(patch.files[0].hunks[0].lines.len(), 2);
}

/// Applying a hunk to the exact source reproduces the destination.
#[test]
fn apply_reproduces_destination() {
    let source = vec![
        "CLASS net/foo/Bar",
        "\tFIELD a oldName I",
        "\tMETHOD m run ()V",
    ];
    let patch = Patch::parse(MAILBOX_FIXTURE).unwrap();

    let result = apply(&source, &patch.files[0]);
    assert_eq!(
        result,
        vec![
            "CLASS net/foo/Bar".to_string(),
            "\tFIELD a newName I".to_string(),
            "\tMETHOD m run ()V".to_string(),
        ]
    );
}

/// A zero-source-count hunk inserts after the named line.
#[test]
fn apply_handles_insertion_hunks() {
    let diff = FileDiff {
        source: "f".to_string(),
        dest: "f".to_string(),
        info: Vec::new(),
        hunks: vec![Hunk {
            source_start: 2,
            source_count: 0,
            dest_start: 3,
            dest_count: 1,
            lines: vec![DiffLine::new("inserted", LineKind::Added)],
        }],
    };

    let result = apply(&["one", "two", "three"], &diff);
    assert_eq!(result, vec!["one", "two", "inserted", "three"]);
}

/// Multiple hunks apply in order with untouched spans copied through.
#[test]
fn apply_handles_multiple_hunks() {
    let input = "\
diff --git a/f b/f
--- a/f
+++ b/f
@@ -1,2 +1,2 @@
 line1
-line2
+LINE2
@@ -5,2 +5,2 @@
 line5
-line6
+LINE6
";
    let patch = Patch::parse(input).unwrap();
    let source = vec!["line1", "line2", "line3", "line4", "line5", "line6", "line7"];

    let result = apply(&source, &patch.files[0]);
    assert_eq!(
        result,
        vec!["line1", "LINE2", "line3", "line4", "line5", "LINE6", "line7"]
    );
}

/// Creation diffs apply against an empty source.
#[test]
fn apply_creation_from_empty_source() {
    let input = "\
diff --git a/new b/new
--- /dev/null
+++ b/new
@@ -0,0 +1,2 @@
+first
+second
";
    let patch = Patch::parse(input).unwrap();
    let empty: [&str; 0] = [];

    let result = apply(&empty, &patch.files[0]);
    assert_eq!(result, vec!["first", "second"]);
}
