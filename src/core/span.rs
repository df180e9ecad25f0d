//! Spans produced by the scanner and line bookkeeping.

use serde::Serialize;

/// Classification of a contiguous range of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Code,
    LineComment,
    BlockComment,
    StringLiteral,
    /// Code excluded by an `#if 0` style conditional.
    Disabled,
}

impl SpanKind {
    pub fn is_comment(self) -> bool {
        matches!(self, SpanKind::LineComment | SpanKind::BlockComment)
    }

    /// Spans that count as "code" when looking for what a comment documents.
    pub fn is_code_like(self) -> bool {
        !self.is_comment()
    }
}

/// Recoverable problem found while scanning a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anomaly {
    UnterminatedString,
}

/// Half-open `[start, end)` byte range over the source, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
    pub anomaly: Option<Anomaly>,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        debug_assert!(start < end, "empty span {start}..{end}");
        Self {
            kind,
            start,
            end,
            anomaly: None,
        }
    }

    pub fn with_anomaly(mut self, anomaly: Anomaly) -> Self {
        self.anomaly = Some(anomaly);
        self
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Byte offsets of line starts, for offset → line lookups.
///
/// Lines are 1-based throughout the crate.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            starts,
            len: source.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Line containing `offset`. Offsets past the end map to the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Line and 1-based character column of `offset`.
    pub fn position(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.line_of(offset);
        let start = self.line_start(line);
        let column = source[start..offset.min(source.len())].chars().count() + 1;
        (line, column)
    }

    pub fn line_start(&self, line: usize) -> usize {
        self.starts[line.clamp(1, self.starts.len()) - 1]
    }

    /// End of `line`, excluding its line terminator.
    pub fn line_end(&self, source: &str, line: usize) -> usize {
        let end = self
            .starts
            .get(line)
            .map_or(self.len, |next_start| next_start - 1);
        if end > self.line_start(line) && source.as_bytes()[end - 1] == b'\r' {
            end - 1
        } else {
            end
        }
    }
}
