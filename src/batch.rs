//! Batch driver: run a conversion job over many files in parallel.
//!
//! A fixed pool of workers pulls paths from a job channel and reports
//! Started/Finished events back over a report channel, so the coordinator is
//! the only place that tracks which files are outstanding. The whole batch
//! runs against one wall-clock deadline: when it passes, in-flight work is
//! abandoned (its thread keeps running detached, its output is discarded) and
//! everything not yet finished is reported as unfinished. A failed file is
//! logged and skipped, never retried.

use crate::error::Result;
use crate::events::{Event, EventAction, EventLog};
use crossbeam_channel::{bounded, unbounded, RecvTimeoutError};
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of worker threads.
    pub jobs: usize,
    /// Wall-clock budget for the whole batch.
    pub timeout: Duration,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub unfinished: Vec<PathBuf>,
}

impl BatchSummary {
    /// True when every file converted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.unfinished.is_empty()
    }
}

enum WorkerReport {
    Started(PathBuf),
    Finished(PathBuf, Result<()>),
}

/// Run `work` over `files` with a bounded worker pool.
///
/// Results arrive in completion order; the summary lists every input file
/// exactly once as converted, failed, or unfinished.
pub fn run(
    files: Vec<PathBuf>,
    options: &BatchOptions,
    log: Option<&EventLog>,
    work: impl Fn(&Path) -> Result<()> + Send + Sync + 'static,
) -> BatchSummary {
    let total = files.len();
    let mut summary = BatchSummary::default();
    if total == 0 {
        return summary;
    }

    let (job_tx, job_rx) = bounded::<PathBuf>(total);
    for file in &files {
        // Capacity equals the file count, so these sends never block.
        let _ = job_tx.send(file.clone());
    }
    drop(job_tx);

    let (report_tx, report_rx) = unbounded::<WorkerReport>();
    let work = Arc::new(work);
    for _ in 0..options.jobs.max(1) {
        let job_rx = job_rx.clone();
        let report_tx = report_tx.clone();
        let work = Arc::clone(&work);
        // Detached on purpose: a worker stuck past the deadline must not keep
        // the batch from returning.
        thread::spawn(move || {
            while let Ok(path) = job_rx.recv() {
                if report_tx.send(WorkerReport::Started(path.clone())).is_err() {
                    break;
                }
                let result = work(&path);
                if report_tx.send(WorkerReport::Finished(path, result)).is_err() {
                    break;
                }
            }
        });
    }
    drop(report_tx);

    let deadline = Instant::now() + options.timeout;
    let mut started = HashSet::new();
    let mut finished = HashSet::new();
    while finished.len() < total {
        match report_rx.recv_deadline(deadline) {
            Ok(WorkerReport::Started(path)) => {
                started.insert(path);
            }
            Ok(WorkerReport::Finished(path, Ok(()))) => {
                finished.insert(path.clone());
                if let Some(log) = log {
                    let event = Event::new(EventAction::FileConverted)
                        .with_file(path.display().to_string());
                    if let Err(e) = log.append(&event) {
                        eprintln!("warning: failed to log event: {}", e);
                    }
                }
                summary.converted.push(path);
            }
            Ok(WorkerReport::Finished(path, Err(e))) => {
                eprintln!("error: {}: {}", path.display(), e);
                finished.insert(path.clone());
                if let Some(log) = log {
                    let event = Event::new(EventAction::FileFailed)
                        .with_file(path.display().to_string())
                        .with_details(json!({"error": e.to_string()}));
                    if let Err(e) = log.append(&event) {
                        eprintln!("warning: failed to log event: {}", e);
                    }
                }
                summary.failed.push((path, e.to_string()));
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    for file in files {
        if !finished.contains(&file) {
            let in_flight = started.contains(&file);
            eprintln!(
                "warning: {} was not converted before the deadline{}",
                file.display(),
                if in_flight { " (abandoned in flight)" } else { "" }
            );
            if let Some(log) = log {
                let event = Event::new(EventAction::FileUnfinished)
                    .with_file(file.display().to_string())
                    .with_details(json!({"in_flight": in_flight}));
                if let Err(e) = log.append(&event) {
                    eprintln!("warning: failed to log event: {}", e);
                }
            }
            summary.unfinished.push(file);
        }
    }

    summary
}
