//! The `patches` command: reconcile a directory of patch files.

use crate::batch::{self, BatchOptions};
use crate::cli::PatchesArgs;
use crate::config::Config;
use crate::diff::Patch;
use crate::error::{PortError, Result};
use crate::events::{Event, EventAction, EventLog};
use crate::fs::atomic_write_file;
use crate::git::Repository;
use crate::oracle::TranslationTable;
use crate::reconcile::{reconcile_patch, DirSource, MemorySource, ReconcileOptions};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub fn cmd_patches(args: PatchesArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default("patchport.yaml")?,
    };
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if let Some(context_lines) = args.context_lines {
        config.context_lines = context_lines;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    config.validate()?;

    let table = Arc::new(TranslationTable::load(&args.table)?);
    if table.is_empty() {
        return Err(PortError::User(format!(
            "table {} holds no records",
            args.table.display()
        )));
    }

    let files = collect_patches(&args.patch_dir, &config)?;
    if files.is_empty() {
        println!("no patch files under {}", args.patch_dir.display());
        return Ok(());
    }

    let repo = Arc::new(Repository::open(&args.input_repo));
    repo.ensure_clean()?;
    let _head = repo.guard_head()?;

    let log = EventLog::for_output_dir(&args.output);
    log.append(
        &Event::new(EventAction::BatchStarted)
            .with_details(json!({"files": files.len(), "jobs": config.jobs})),
    )?;

    let options = BatchOptions {
        jobs: config.jobs,
        timeout: Duration::from_secs(config.timeout_secs),
    };
    let reconcile_options = ReconcileOptions {
        context_lines: config.context_lines,
    };
    let patch_dir = args.patch_dir.clone();
    let output = args.output.clone();
    let worker_repo = Arc::clone(&repo);
    let worker_table = Arc::clone(&table);

    let summary = batch::run(files, &options, Some(&log), move |path| {
        convert_one(
            path,
            &patch_dir,
            &output,
            &worker_repo,
            worker_table.as_ref(),
            &reconcile_options,
        )
    });

    println!(
        "{} converted, {} failed, {} unfinished",
        summary.converted.len(),
        summary.failed.len(),
        summary.unfinished.len()
    );
    log.append(&Event::new(EventAction::BatchFinished).with_details(json!({
        "converted": summary.converted.len(),
        "failed": summary.failed.len(),
        "unfinished": summary.unfinished.len(),
    })))?;

    if summary.is_success() {
        Ok(())
    } else {
        Err(PortError::Batch(format!(
            "{} failed, {} unfinished",
            summary.failed.len(),
            summary.unfinished.len()
        )))
    }
}

/// Patch files under the patch directory matching the include patterns,
/// sorted for a deterministic queue order.
fn collect_patches(dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    let matcher = config.include_matcher()?;
    let mut files = Vec::new();
    collect_into(dir, dir, &matcher, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(
    base: &Path,
    dir: &Path,
    matcher: &globset::GlobSet,
    out: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in std::fs::read_dir(dir).map_err(|e| PortError::io(dir, e))? {
        let entry = entry.map_err(|e| PortError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_into(base, &path, matcher, out)?;
        } else if matcher.is_match(path.strip_prefix(base).unwrap_or(&path)) {
            out.push(path);
        }
    }
    Ok(())
}

/// Convert one patch file: recover the source-namespace pre-images from the
/// input repository, reconcile, and write the result under the output
/// directory at the patch's relative path.
fn convert_one(
    path: &Path,
    patch_dir: &Path,
    output: &Path,
    repo: &Repository,
    table: &TranslationTable,
    options: &ReconcileOptions,
) -> Result<()> {
    let patch = Patch::read(path)?;
    let commit = patch.source_commit().ok_or_else(|| PortError::Parse {
        path: path.to_path_buf(),
        message: "patch has no source commit header".to_string(),
    })?;

    // Pre-images are only needed for modifications; creations carry their
    // content and deletions use the target's.
    let needed: Vec<String> = patch
        .files
        .iter()
        .filter(|f| !f.is_creation() && !f.is_deletion())
        .map(|f| f.source.clone())
        .collect();

    let mut source_tree = MemorySource::new();
    if !needed.is_empty() {
        let parent = format!("{}^", commit);
        source_tree = repo.read_at(&parent, |root| {
            let mut tree = MemorySource::new();
            for name in &needed {
                let file = root.join(name);
                let content =
                    std::fs::read_to_string(&file).map_err(|e| PortError::io(&file, e))?;
                tree.insert(name.clone(), &content);
            }
            Ok(tree)
        })?;
    }

    let target_tree = DirSource::new(output);
    let reconciled = reconcile_patch(&patch, table, &source_tree, &target_tree, options)?;
    for warning in &reconciled.warnings {
        eprintln!("warning: {}: {}", path.display(), warning);
    }

    let relative = path.strip_prefix(patch_dir).unwrap_or(path);
    atomic_write_file(&output.join(relative), &reconciled.patch.export())
}
