//! The `remap` command: translate mapping files between namespaces.

use crate::cli::RemapArgs;
use crate::error::{PortError, Result};
use crate::fs::atomic_write_file;
use crate::mapping;
use crate::oracle::TranslationTable;
use std::path::{Path, PathBuf};

pub fn cmd_remap(args: RemapArgs) -> Result<()> {
    let table = TranslationTable::load(&args.table)?;
    if table.is_empty() {
        eprintln!(
            "warning: table {} holds no records; files will pass through unchanged",
            args.table.display()
        );
    }

    if args.input.is_dir() {
        remap_tree(&args.input, args.output.as_deref().unwrap_or(&args.input), &table)
    } else {
        remap_file(
            &args.input,
            args.output.as_deref().unwrap_or(&args.input),
            &table,
        )
    }
}

/// Translate one mapping file and write it atomically.
fn remap_file(input: &Path, output: &Path, table: &TranslationTable) -> Result<()> {
    let content = std::fs::read_to_string(input).map_err(|e| PortError::io(input, e))?;
    let lines: Vec<String> = content
        .lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect();

    let parsed = mapping::parse_lines(&lines, table).map_err(|e| PortError::Parse {
        path: input.to_path_buf(),
        message: e.to_string(),
    })?;
    for warning in &parsed.warnings {
        eprintln!("warning: {}: {}", input.display(), warning);
    }

    atomic_write_file(output, &parsed.file.export())
}

/// Walk a directory tree of mapping files, translating each one into the
/// output tree under the same relative path. A file that fails is reported
/// and skipped; the command still fails at the end if anything failed.
fn remap_tree(input: &Path, output: &Path, table: &TranslationTable) -> Result<()> {
    let mut files = Vec::new();
    collect_mappings(input, &mut files)?;
    files.sort();

    let mut converted = 0usize;
    let mut failed = 0usize;
    for file in &files {
        let relative = file.strip_prefix(input).unwrap_or(file);
        match remap_file(file, &output.join(relative), table) {
            Ok(()) => converted += 1,
            Err(e) => {
                eprintln!("error: {}: {}", file.display(), e);
                failed += 1;
            }
        }
    }

    println!("{} converted, {} failed", converted, failed);
    if failed > 0 {
        return Err(PortError::Batch(format!(
            "{} of {} mapping files failed",
            failed,
            files.len()
        )));
    }
    Ok(())
}

/// Recursively collect `.mapping` files.
fn collect_mappings(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir).map_err(|e| PortError::io(dir, e))? {
        let entry = entry.map_err(|e| PortError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_mappings(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "mapping") {
            out.push(path);
        }
    }
    Ok(())
}
