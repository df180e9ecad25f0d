use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use colored::Colorize;
use rayon::prelude::*;

use super::{CommandResult, CommandSummary, ExtractSummary, FileFailure};
use crate::cli::args::ExtractCommand;
use crate::config::{CONFIG_FILE_NAME, load_config};
use crate::core::{ExtractOptions, FileRecords, extract_file, file_scanner::scan_files};

/// Directory the config search starts from for a given input path.
fn config_start(path: &Path) -> PathBuf {
    let dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    };
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let verbose = cmd.common.verbose;
    let paths = if cmd.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cmd.paths
    };

    for path in &paths {
        if !path.exists() {
            bail!("Path does not exist: {}", path.display());
        }
    }

    let loaded = load_config(&config_start(&paths[0]))?;
    let config = loaded.config;
    match &loaded.path {
        Some(path) if verbose => eprintln!("{} using {}", "note:".bold(), path.display()),
        None if verbose => eprintln!(
            "{} no {} found, using defaults",
            "note:".bold(),
            CONFIG_FILE_NAME
        ),
        _ => {}
    }

    let context_lines = match cmd.context_lines {
        Some(0) => bail!("--context-lines must be at least 1"),
        Some(n) => n,
        None => config.context_lines,
    };
    let options = ExtractOptions { context_lines };
    let extensions = config.extension_map()?;

    let mut files: BTreeSet<PathBuf> = BTreeSet::new();
    let mut skipped_count = 0;
    for path in &paths {
        if path.is_file() {
            if cmd.language.is_none() && extensions.language_for(path).is_none() {
                bail!(
                    "Cannot detect the language of {} (use --language)",
                    path.display()
                );
            }
            files.insert(path.clone());
        } else {
            let scan = scan_files(path, &config.includes, &config.ignores, &extensions, verbose);
            skipped_count += scan.skipped_count;
            files.extend(scan.files);
        }
    }

    let files: Vec<PathBuf> = files.into_iter().collect();
    let results: Vec<_> = files
        .par_iter()
        .map(|path| (path, extract_file(path, cmd.language, &extensions, &options)))
        .collect();

    let mut extracted: Vec<FileRecords> = Vec::new();
    let mut failures: Vec<FileFailure> = Vec::new();
    for (path, result) in results {
        match result {
            Ok(records) => {
                if verbose {
                    for warning in &records.warnings {
                        eprintln!(
                            "{} {}\n  {} {}:{}",
                            "warning:".bold().yellow(),
                            warning.kind,
                            "-->".blue(),
                            records.file,
                            warning.line
                        );
                    }
                }
                extracted.push(records);
            }
            Err(err) => failures.push(FileFailure::new(path.display().to_string(), &err)),
        }
    }

    let failure_count = failures.len();
    Ok(CommandResult {
        summary: CommandSummary::Extract(ExtractSummary {
            format: cmd.format,
            files: extracted,
            failures,
            skipped_count,
        }),
        failure_count,
    })
}
