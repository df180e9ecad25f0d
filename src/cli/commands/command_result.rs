use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::core::{ExtractError, FileRecords};

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractSummary),
    Languages,
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub format: OutputFormat,
    /// Files extracted successfully, in path order.
    pub files: Vec<FileRecords>,
    pub failures: Vec<FileFailure>,
    /// Directory entries that could not be read while walking.
    pub skipped_count: usize,
}

impl ExtractSummary {
    pub fn comment_count(&self) -> usize {
        self.files.iter().map(|f| f.records.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.warnings.len()).sum()
    }
}

/// A file that produced no records because extraction aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub file: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl FileFailure {
    pub fn new(file: String, err: &ExtractError) -> Self {
        let (line, column) = match err {
            ExtractError::UnterminatedComment { line, column, .. } => (Some(*line), Some(*column)),
            _ => (None, None),
        };
        let message = match err {
            ExtractError::Io { source, .. } => format!("{err}: {source}"),
            _ => err.to_string(),
        };
        Self {
            file,
            message,
            line,
            column,
        }
    }
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
}

/// Result of running a corex command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Files that could not be extracted.
    pub failure_count: usize,
}
