//! Pairing comments with the code they describe.
//!
//! An inline comment describes the code before it on the same line. Any other comment
//! describes the code that follows it, looking forward past further comment lines but
//! never across a blank line. A line is blank only when it is empty outside comments and
//! string literals: the empty middle of a block comment is still a comment line.
//!
//! Line classes are computed once per file and span lookups are binary searches, so
//! associating every comment costs time proportional to the file.

use std::ops::Range;

use serde::Serialize;

use crate::core::{
    aggregate::CommentUnit,
    span::{LineIndex, Span, SpanKind},
};

/// Default number of lines searched, and kept, after a comment.
pub const DEFAULT_CONTEXT_LINES: usize = 10;

/// Code associated with a comment, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnippet {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
    /// The code sits in an `#if 0` region.
    pub disabled: bool,
}

/// What a line holds once whitespace is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LineClass {
    Blank,
    Comment,
    Code,
}

pub struct Associator<'a> {
    source: &'a str,
    spans: &'a [Span],
    lines: &'a LineIndex,
    window: usize,
    classes: Vec<LineClass>,
    disabled: Vec<bool>,
}

impl<'a> Associator<'a> {
    pub fn new(source: &'a str, spans: &'a [Span], lines: &'a LineIndex, window: usize) -> Self {
        let mut classes = vec![LineClass::Blank; lines.line_count()];
        let mut disabled = vec![false; lines.line_count()];

        for span in spans {
            let class = if span.kind.is_comment() {
                LineClass::Comment
            } else {
                LineClass::Code
            };
            // Comments and literals own every line they cross, empty or not.
            let opaque = !matches!(span.kind, SpanKind::Code | SpanKind::Disabled);
            let text = span.text(source);
            let last_piece = text.matches('\n').count();
            let first = lines.line_of(span.start) - 1;
            for (offset, piece) in text.split('\n').enumerate() {
                if piece.trim().is_empty() && !(opaque && offset < last_piece) {
                    continue;
                }
                let idx = first + offset;
                classes[idx] = classes[idx].max(class);
                if span.kind == SpanKind::Disabled {
                    disabled[idx] = true;
                }
            }
        }

        Self {
            source,
            spans,
            lines,
            window: window.max(1),
            classes,
            disabled,
        }
    }

    fn class(&self, line: usize) -> LineClass {
        self.classes.get(line - 1).copied().unwrap_or(LineClass::Blank)
    }

    /// Spans intersecting `range`.
    fn overlapping(&self, range: Range<usize>) -> &'a [Span] {
        let first = self.spans.partition_point(|span| span.end <= range.start);
        let len = self.spans[first..].partition_point(|span| span.start < range.end);
        &self.spans[first..first + len]
    }

    /// Whether code-like spans put anything but whitespace into `range`.
    fn has_code(&self, range: Range<usize>) -> bool {
        self.overlapping(range.clone())
            .iter()
            .filter(|span| span.kind.is_code_like())
            .any(|span| {
                let start = span.start.max(range.start);
                let end = span.end.min(range.end);
                !self.source[start..end].trim().is_empty()
            })
    }

    pub fn associate(&self, unit: &CommentUnit) -> Option<ContextSnippet> {
        let line_start = self.lines.line_start(unit.start_line);
        if self.has_code(line_start..unit.start) {
            return Some(ContextSnippet {
                text: self.source[line_start..unit.start].trim_end().to_string(),
                start_line: unit.start_line,
                end_line: unit.start_line,
                disabled: self.disabled[unit.start_line - 1],
            });
        }

        let tail_end = self.lines.line_end(self.source, unit.end_line);
        if unit.end < tail_end && self.has_code(unit.end..tail_end) {
            let tail = &self.source[unit.end..tail_end];
            let start = unit.end + (tail.len() - tail.trim_start().len());
            return Some(self.snippet(unit.end_line, start));
        }

        let last = (unit.end_line + self.window).min(self.lines.line_count());
        for line in unit.end_line + 1..=last {
            match self.class(line) {
                LineClass::Blank => return None,
                LineClass::Comment => continue,
                LineClass::Code => return Some(self.snippet(line, self.lines.line_start(line))),
            }
        }
        None
    }

    /// Snippet from byte `start` on `first_line`, up to a blank line or the window size.
    fn snippet(&self, first_line: usize, start: usize) -> ContextSnippet {
        let max_line = (first_line + self.window - 1).min(self.lines.line_count());
        let mut end_line = first_line;
        while end_line < max_line && self.class(end_line + 1) != LineClass::Blank {
            end_line += 1;
        }
        let end = self.lines.line_end(self.source, end_line).max(start);
        ContextSnippet {
            text: self.source[start..end].to_string(),
            start_line: first_line,
            end_line,
            disabled: self.disabled[first_line - 1..end_line].iter().any(|d| *d),
        }
    }
}
