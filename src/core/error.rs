//! Error and warning types for comment extraction.
//!
//! Errors follow a three-way split:
//! - configuration errors (unknown language) are rejected before any scanning
//! - fatal lexical errors (unterminated block comment) abort the whole file
//! - recoverable anomalies (unterminated string literal) become [`LexWarning`]s

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::span::{Anomaly, LineIndex};

/// Failure raised by the scanner itself. Offsets are byte offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unterminated block comment starting at offset {offset}")]
    UnterminatedComment { offset: usize },
}

/// Errors surfaced to callers of [`crate::core::extract`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    #[error("unterminated block comment starting at line {line}, column {column} (offset {offset})")]
    UnterminatedComment {
        offset: usize,
        line: usize,
        column: usize,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Resolve a scanner error into a positioned extraction error.
    pub fn from_scan(err: ScanError, source: &str, lines: &LineIndex) -> Self {
        match err {
            ScanError::UnterminatedComment { offset } => {
                let (line, column) = lines.position(source, offset);
                ExtractError::UnterminatedComment {
                    offset,
                    line,
                    column,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    UnterminatedStringLiteral,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::UnterminatedStringLiteral => write!(f, "unterminated string literal"),
        }
    }
}

/// A recoverable lexical anomaly, positioned in the file it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LexWarning {
    pub kind: WarningKind,
    pub offset: usize,
    pub line: usize,
}

impl LexWarning {
    pub fn from_anomaly(anomaly: Anomaly, offset: usize, line: usize) -> Self {
        let kind = match anomaly {
            Anomaly::UnterminatedString => WarningKind::UnterminatedStringLiteral,
        };
        Self { kind, offset, line }
    }
}
