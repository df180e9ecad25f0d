//! Comment aggregation.
//!
//! Turns the scanner's comment spans into logical [`CommentUnit`]s: runs of `//` or `#`
//! lines become one unit, block comments stand alone, and Python string literals in
//! docstring position are promoted to comments. Decoration is stripped here so later
//! stages only see the prose.

use std::ops::Range;

use serde::Serialize;

use crate::core::{
    docstring::{Owner, docstring_owner},
    language::LanguageProfile,
    scope::Scope,
    span::{LineIndex, Span, SpanKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    Line,
    Block,
    Docstring,
}

/// One logical comment, possibly built from several spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentUnit {
    pub kind: CommentKind,
    pub doc_style: bool,
    /// Source text of the whole unit, markers included.
    pub raw: String,
    /// Text with markers and decoration removed.
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Byte range of the unit in the source.
    pub start: usize,
    pub end: usize,
    /// Indices of the spans the unit was built from.
    pub spans: Range<usize>,
    pub disabled: bool,
    pub owner: Option<Owner>,
    /// Enclosing definitions, outermost first, for languages that track them.
    pub scope: Option<Vec<Scope>>,
}

/// Yields the comment units of a file in source order. Comments whose cleaned text is
/// empty (`//`, `/**/`) are dropped.
pub struct Aggregator<'a> {
    source: &'a str,
    profile: &'a LanguageProfile,
    spans: &'a [Span],
    lines: &'a LineIndex,
    /// Per span: the nearest code span before it is disabled.
    after_disabled: Vec<bool>,
    index: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        source: &'a str,
        profile: &'a LanguageProfile,
        spans: &'a [Span],
        lines: &'a LineIndex,
    ) -> Self {
        let mut after_disabled = Vec::with_capacity(spans.len());
        let mut disabled = false;
        for span in spans {
            after_disabled.push(disabled);
            match span.kind {
                SpanKind::Code => disabled = false,
                SpanKind::Disabled => disabled = true,
                _ => {}
            }
        }

        Self {
            source,
            profile,
            spans,
            lines,
            after_disabled,
            index: 0,
        }
    }

    fn starts_own_line(&self, span: Span) -> bool {
        let line_start = self.lines.line_start(self.lines.line_of(span.start));
        self.source[line_start..span.start].trim().is_empty()
    }

    /// Whitespace-only gap holding exactly one line break.
    fn is_single_break(&self, span: Span) -> bool {
        let text = span.text(self.source);
        matches!(span.kind, SpanKind::Code | SpanKind::Disabled)
            && text.trim().is_empty()
            && text.matches('\n').count() == 1
    }

    fn marker_of(&self, span: Span) -> &'static str {
        self.profile.line_marker(span.text(self.source)).unwrap_or("")
    }

    /// Last span index of the line comment group starting at `first`.
    fn line_group_end(&self, first: usize) -> usize {
        let mut last = first;
        if !self.starts_own_line(self.spans[first]) {
            return last;
        }
        let marker = self.marker_of(self.spans[first]);
        while let (Some(gap), Some(next)) = (self.spans.get(last + 1), self.spans.get(last + 2)) {
            if !self.is_single_break(*gap)
                || next.kind != SpanKind::LineComment
                || self.marker_of(*next) != marker
            {
                break;
            }
            last += 2;
        }
        last
    }

    fn unit(&self, kind: CommentKind, spans: Range<usize>, text: String) -> CommentUnit {
        let start = self.spans[spans.start].start;
        let end = self.spans[spans.end - 1].end;
        CommentUnit {
            kind,
            doc_style: false,
            raw: self.source[start..end].to_string(),
            text,
            start_line: self.lines.line_of(start),
            end_line: self.lines.line_of(end.saturating_sub(1).max(start)),
            start,
            end,
            disabled: self.after_disabled[spans.start],
            spans,
            owner: None,
            scope: None,
        }
    }

    fn line_unit(&self, first: usize) -> CommentUnit {
        let last = self.line_group_end(first);
        let marker = self.marker_of(self.spans[first]);
        let bodies: Vec<&str> = self.spans[first..=last]
            .iter()
            .filter(|span| span.kind == SpanKind::LineComment)
            .flat_map(|span| span.text(self.source)[marker.len()..].split('\n'))
            .collect();
        let mut unit = self.unit(CommentKind::Line, first..last + 1, clean_line_comment(&bodies));
        unit.doc_style = self.profile.is_doc_line_marker(marker);
        unit
    }

    fn block_unit(&self, index: usize) -> CommentUnit {
        let span = self.spans[index];
        let text = span.text(self.source);
        let doc_style = self.profile.is_doc_block(text);
        let cleaned = match self.profile.block_comment {
            Some(block) => clean_block_comment(
                &text[block.open.len()..text.len() - block.close.len()],
                doc_style,
            ),
            None => text.to_string(),
        };
        let mut unit = self.unit(CommentKind::Block, index..index + 1, cleaned);
        unit.doc_style = doc_style;
        unit
    }

    fn docstring_unit(&self, index: usize, owner: Owner) -> CommentUnit {
        let span = self.spans[index];
        let mut unit = self.unit(
            CommentKind::Docstring,
            index..index + 1,
            clean_docstring(span.text(self.source), span.anomaly.is_none()),
        );
        unit.doc_style = true;
        unit.owner = Some(owner);
        unit
    }
}

impl Iterator for Aggregator<'_> {
    type Item = CommentUnit;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(span) = self.spans.get(self.index).copied() {
            let index = self.index;
            self.index += 1;
            let unit = match span.kind {
                SpanKind::LineComment => {
                    let unit = self.line_unit(index);
                    self.index = unit.spans.end;
                    unit
                }
                SpanKind::BlockComment => self.block_unit(index),
                SpanKind::StringLiteral if self.profile.docstrings => {
                    match docstring_owner(self.source, self.spans, index) {
                        Some(owner) => self.docstring_unit(index, owner),
                        None => continue,
                    }
                }
                _ => continue,
            };
            if !unit.text.is_empty() {
                return Some(unit);
            }
        }
        None
    }
}

// ============================================================
// Cleaning
// ============================================================

/// Bodies of merged line comments, marker already removed.
fn clean_line_comment(bodies: &[&str]) -> String {
    let lines: Vec<&str> = bodies
        .iter()
        .map(|line| line.trim_end_matches('\r').trim_end_matches('\\'))
        .collect();
    finish(dedent(&lines))
}

/// Body of a block comment between its delimiters.
fn clean_block_comment(body: &str, doc_style: bool) -> String {
    let mut lines: Vec<&str> = body.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let mut first = lines.remove(0).trim_start_matches('*');
    if doc_style {
        first = first.strip_prefix('!').unwrap_or(first);
    }
    if let Some(last) = lines.last_mut() {
        *last = last.trim_end().trim_end_matches('*');
    }
    if lines.is_empty() {
        first = first.trim_end().trim_end_matches('*');
    }

    let starred = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .all(|line| line.trim_start().starts_with('*'));
    if starred {
        for line in &mut lines {
            *line = line.trim_start().trim_start_matches('*');
        }
    }

    cleandoc(first, &lines)
}

/// Docstring literal including its quotes (but not its prefix letters).
fn clean_docstring(literal: &str, terminated: bool) -> String {
    let quote_len = if literal.starts_with("\"\"\"") || literal.starts_with("'''") {
        3
    } else {
        1
    };
    let body = &literal[quote_len.min(literal.len())..];
    let body = if terminated && body.len() >= quote_len {
        &body[..body.len() - quote_len]
    } else {
        body
    };
    let mut lines: Vec<&str> = body.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let first = lines.remove(0);
    cleandoc(first, &lines)
}

/// First line trimmed on its own, the rest dedented together.
fn cleandoc(first: &str, rest: &[&str]) -> String {
    let mut lines = vec![first.trim().to_string()];
    lines.extend(dedent(rest));
    finish(lines)
}

/// Remove the indentation shared by all non-blank lines.
fn dedent(lines: &[&str]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line[indent..].trim_end().to_string()
            }
        })
        .collect()
}

/// Drop leading and trailing blank lines and join.
fn finish(lines: Vec<String>) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
