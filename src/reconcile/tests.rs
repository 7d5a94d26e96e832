//! End-to-end tests for patch reconciliation.

use super::{reconcile_patch, MemorySource, ReconcileOptions};
use crate::diff::{apply, LineKind, Patch, DEV_NULL};
use crate::error::PortError;
use crate::oracle::TranslationTable;

const BAR_PATH: &str = "mappings/Bar.mapping";

/// Source-namespace file as it stands before the patch.
const BAR_SOURCE: &str = "\
CLASS net/foo/Bar BarName
\tFIELD a aName I
\tFIELD b bName I
\tMETHOD m mName ()V
\t\tCOMMENT Old comment.
";

/// Its already-translated target-namespace counterpart.
const BAR_TARGET: &str = "\
CLASS net/foo/Bar c/d/E
\tFIELD a f I
\tFIELD b g I
\tMETHOD m run ()V
\t\tCOMMENT Old comment.
";

const UPDATE_PATCH: &str = "\
From 1111111111111111111111111111111111111111 Mon Sep 17 00:00:00 2001
From: Dev <dev@example.com>
Subject: [PATCH] add c, reword comment

diff --git a/mappings/Bar.mapping b/mappings/Bar.mapping
index aaaaaaa..bbbbbbb 100644
--- a/mappings/Bar.mapping
+++ b/mappings/Bar.mapping
@@ -2,4 +2,5 @@
 \tFIELD a aName I
 \tFIELD b bName I
+\tFIELD c cName I
 \tMETHOD m mName ()V
-\t\tCOMMENT Old comment.
+\t\tCOMMENT New comment.
--
2.35.1
";

fn oracle() -> TranslationTable {
    let mut t = TranslationTable::new();
    t.add_class("net/foo/Bar", "c/d/E");
    t.add_field("net/foo/Bar", "a", "f");
    t.add_field("net/foo/Bar", "b", "g");
    t.add_field("net/foo/Bar", "c", "h");
    t.add_method("net/foo/Bar", "m", "()V", "run");
    t
}

fn sources(source: &str, target: &str) -> (MemorySource, MemorySource) {
    let mut source_tree = MemorySource::new();
    source_tree.insert(BAR_PATH, source);
    let mut target_tree = MemorySource::new();
    target_tree.insert(BAR_PATH, target);
    (source_tree, target_tree)
}

fn target_lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}

/// Additions and comment changes propagate; applying the reconciled patch to
/// the target file reproduces the translation of the patched source file.
#[test]
fn reconciled_patch_applies_to_the_target() {
    let patch = Patch::parse(UPDATE_PATCH).unwrap();
    let (source_tree, target_tree) = sources(BAR_SOURCE, BAR_TARGET);

    let result = reconcile_patch(
        &patch,
        &oracle(),
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap();
    assert!(result.warnings.is_empty());

    let out = &result.patch;
    assert_eq!(out.header, patch.header);
    assert_eq!(out.footer, patch.footer);
    assert_eq!(out.files.len(), 1);

    let file = &out.files[0];
    assert_eq!(file.source, BAR_PATH);
    assert_eq!(file.hunks.len(), 1);
    let hunk = &file.hunks[0];
    assert_eq!(
        (hunk.source_start, hunk.source_count, hunk.dest_start, hunk.dest_count),
        (1, 5, 1, 6)
    );

    let applied = apply(&target_lines(BAR_TARGET), file);
    assert_eq!(
        applied,
        vec![
            "CLASS net/foo/Bar c/d/E".to_string(),
            "\tFIELD a f I".to_string(),
            "\tFIELD b g I".to_string(),
            "\tFIELD c h I".to_string(),
            "\tMETHOD m run ()V".to_string(),
            "\t\tCOMMENT New comment.".to_string(),
        ]
    );
}

/// Reconciling the already-reconciled patch against the target tree changes
/// nothing: identities are preserved, so translation is a fixed point.
#[test]
fn reconciliation_is_idempotent() {
    let patch = Patch::parse(UPDATE_PATCH).unwrap();
    let (source_tree, target_tree) = sources(BAR_SOURCE, BAR_TARGET);
    let table = oracle();
    let options = ReconcileOptions::default();

    let first = reconcile_patch(&patch, &table, &source_tree, &target_tree, &options).unwrap();

    let (target_as_source, target_tree) = sources(BAR_TARGET, BAR_TARGET);
    let second = reconcile_patch(
        &first.patch,
        &table,
        &target_as_source,
        &target_tree,
        &options,
    )
    .unwrap();

    assert_eq!(second.patch.export(), first.patch.export());
}

/// A rename that translates to the name the target already uses is invisible
/// there; the file drops out of the patch entirely.
#[test]
fn rename_invisible_in_target_drops_the_file() {
    let patch_text = "\
From 3333333333333333333333333333333333333333 Mon Sep 17 00:00:00 2001
Subject: [PATCH] rename a

diff --git a/mappings/Bar.mapping b/mappings/Bar.mapping
--- a/mappings/Bar.mapping
+++ b/mappings/Bar.mapping
@@ -2,1 +2,1 @@
-\tFIELD a aName I
+\tFIELD a renamed I
--
2.35.1
";
    let patch = Patch::parse(patch_text).unwrap();
    let (source_tree, target_tree) = sources(BAR_SOURCE, BAR_TARGET);

    let result = reconcile_patch(
        &patch,
        &oracle(),
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap();

    assert!(result.patch.files.is_empty());
    assert_eq!(result.patch.header, patch.header);
}

/// A created file carries its whole translated content as one addition hunk.
#[test]
fn creation_translates_the_whole_file() {
    let patch_text = "\
From 2222222222222222222222222222222222222222 Mon Sep 17 00:00:00 2001
Subject: [PATCH] add New

diff --git a/mappings/New.mapping b/mappings/New.mapping
new file mode 100644
index 0000000..ccccccc
--- /dev/null
+++ b/mappings/New.mapping
@@ -0,0 +1,2 @@
+CLASS net/foo/New NewName
+\tFIELD q qName I
--
2.35.1
";
    let patch = Patch::parse(patch_text).unwrap();
    let mut table = oracle();
    table.add_class("net/foo/New", "x/y/Z");
    table.add_field("net/foo/New", "q", "w");
    let (source_tree, target_tree) = sources(BAR_SOURCE, BAR_TARGET);

    let result = reconcile_patch(
        &patch,
        &table,
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap();

    let file = &result.patch.files[0];
    assert_eq!(file.source, DEV_NULL);
    assert_eq!(file.dest, "mappings/New.mapping");
    let hunk = &file.hunks[0];
    assert_eq!(
        (hunk.source_start, hunk.source_count, hunk.dest_start, hunk.dest_count),
        (0, 0, 1, 2)
    );
    assert!(hunk.lines.iter().all(|l| l.kind == LineKind::Added));
    assert_eq!(hunk.lines[0].text, "CLASS net/foo/New x/y/Z");
    assert_eq!(hunk.lines[1].text, "\tFIELD q w I");
}

/// A deleted file is removed with the target's own current content, not a
/// translation of the source side.
#[test]
fn deletion_removes_the_target_content() {
    let patch_text = "\
From 4444444444444444444444444444444444444444 Mon Sep 17 00:00:00 2001
Subject: [PATCH] drop Bar

diff --git a/mappings/Bar.mapping b/mappings/Bar.mapping
deleted file mode 100644
index aaaaaaa..0000000
--- a/mappings/Bar.mapping
+++ /dev/null
@@ -1,5 +1,0 @@
-CLASS net/foo/Bar BarName
-\tFIELD a aName I
-\tFIELD b bName I
-\tMETHOD m mName ()V
-\t\tCOMMENT Old comment.
--
2.35.1
";
    let patch = Patch::parse(patch_text).unwrap();
    let (source_tree, target_tree) = sources(BAR_SOURCE, BAR_TARGET);

    let result = reconcile_patch(
        &patch,
        &oracle(),
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap();

    let file = &result.patch.files[0];
    assert_eq!(file.dest, DEV_NULL);
    let hunk = &file.hunks[0];
    assert_eq!(
        (hunk.source_start, hunk.source_count, hunk.dest_start, hunk.dest_count),
        (1, 5, 0, 0)
    );
    assert!(hunk.lines.iter().all(|l| l.kind == LineKind::Removed));
    assert_eq!(hunk.lines[0].text, "CLASS net/foo/Bar c/d/E");
}

/// A changed line whose identity the oracle cannot resolve is fatal.
#[test]
fn translation_miss_on_a_changed_line_is_fatal() {
    let patch_text = "\
From 5555555555555555555555555555555555555555 Mon Sep 17 00:00:00 2001
Subject: [PATCH] add unmapped field

diff --git a/mappings/Bar.mapping b/mappings/Bar.mapping
--- a/mappings/Bar.mapping
+++ b/mappings/Bar.mapping
@@ -2,1 +2,2 @@
 \tFIELD a aName I
+\tFIELD nope nopeName I
--
2.35.1
";
    let patch = Patch::parse(patch_text).unwrap();
    let (source_tree, target_tree) = sources(BAR_SOURCE, BAR_TARGET);

    let err = reconcile_patch(
        &patch,
        &oracle(),
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap_err();

    match err {
        PortError::TranslationMiss { identity, scope, .. } => {
            assert_eq!(identity, "nope");
            assert_eq!(scope, "net/foo/Bar");
        }
        other => panic!("expected a translation miss, got {}", other),
    }
}

/// An unresolved identity on an unchanged line keeps its original text and
/// still pairs with the target file's kept-original form.
#[test]
fn unresolved_unchanged_lines_still_pair() {
    let source = "\
CLASS net/foo/Bar BarName
\tFIELD a aName I
\tFIELD z zName I
";
    let target = "\
CLASS net/foo/Bar c/d/E
\tFIELD a f I
\tFIELD z zName I
";
    let patch_text = "\
From 6666666666666666666666666666666666666666 Mon Sep 17 00:00:00 2001
Subject: [PATCH] document Bar

diff --git a/mappings/Bar.mapping b/mappings/Bar.mapping
--- a/mappings/Bar.mapping
+++ b/mappings/Bar.mapping
@@ -1,2 +1,3 @@
 CLASS net/foo/Bar BarName
+\tCOMMENT Hello.
 \tFIELD a aName I
--
2.35.1
";
    let patch = Patch::parse(patch_text).unwrap();
    let (source_tree, target_tree) = sources(source, target);

    let result = reconcile_patch(
        &patch,
        &oracle(),
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap();

    let file = &result.patch.files[0];
    let applied = apply(&target_lines(target), file);
    assert_eq!(
        applied,
        vec![
            "CLASS net/foo/Bar c/d/E".to_string(),
            "\tCOMMENT Hello.".to_string(),
            "\tFIELD a f I".to_string(),
            "\tFIELD z zName I".to_string(),
        ]
    );
}

/// A removed line whose translation is absent from the target file means the
/// trees have drifted apart; fatal for that file.
#[test]
fn drifted_target_is_fatal() {
    let drifted_target = "\
CLASS net/foo/Bar c/d/E
\tFIELD a f I
\tMETHOD m run ()V
\t\tCOMMENT Old comment.
";
    let patch_text = "\
From 7777777777777777777777777777777777777777 Mon Sep 17 00:00:00 2001
Subject: [PATCH] drop b

diff --git a/mappings/Bar.mapping b/mappings/Bar.mapping
--- a/mappings/Bar.mapping
+++ b/mappings/Bar.mapping
@@ -3,1 +3,0 @@
-\tFIELD b bName I
--
2.35.1
";
    let patch = Patch::parse(patch_text).unwrap();
    let (source_tree, target_tree) = sources(BAR_SOURCE, drifted_target);

    let err = reconcile_patch(
        &patch,
        &oracle(),
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PortError::Reconcile { .. }));
}

/// A patch whose context does not match the provided source revision is
/// rejected rather than silently producing a wrong result.
#[test]
fn wrong_revision_context_is_rejected() {
    let patch_text = "\
From 8888888888888888888888888888888888888888 Mon Sep 17 00:00:00 2001
Subject: [PATCH] rename b

diff --git a/mappings/Bar.mapping b/mappings/Bar.mapping
--- a/mappings/Bar.mapping
+++ b/mappings/Bar.mapping
@@ -2,2 +2,2 @@
 \tFIELD a WRONG I
-\tFIELD b bName I
+\tFIELD b other I
--
2.35.1
";
    let patch = Patch::parse(patch_text).unwrap();
    let (source_tree, target_tree) = sources(BAR_SOURCE, BAR_TARGET);

    let err = reconcile_patch(
        &patch,
        &oracle(),
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap_err();
    match err {
        PortError::Reconcile { message, .. } => {
            assert!(message.contains("does not match the patch"));
        }
        other => panic!("expected a reconcile error, got {}", other),
    }
}

/// A destination start pointing past the end of the patched file is rejected
/// for that file, like any other stale line number.
#[test]
fn dest_start_past_the_file_end_is_rejected() {
    let patch_text = "\
From 9999999999999999999999999999999999999999 Mon Sep 17 00:00:00 2001
Subject: [PATCH] rename b

diff --git a/mappings/Bar.mapping b/mappings/Bar.mapping
--- a/mappings/Bar.mapping
+++ b/mappings/Bar.mapping
@@ -3,1 +100,1 @@
-\tFIELD b bName I
+\tFIELD b other I
--
2.35.1
";
    let patch = Patch::parse(patch_text).unwrap();
    let (source_tree, target_tree) = sources(BAR_SOURCE, BAR_TARGET);

    let err = reconcile_patch(
        &patch,
        &oracle(),
        &source_tree,
        &target_tree,
        &ReconcileOptions::default(),
    )
    .unwrap_err();
    match err {
        PortError::Reconcile { message, .. } => {
            assert!(message.contains("line 100"));
        }
        other => panic!("expected a reconcile error, got {}", other),
    }
}
