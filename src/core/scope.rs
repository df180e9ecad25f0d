//! Enclosing `def` / `class` scopes for indentation-structured sources.
//!
//! Every Python comment is reported with the chain of definitions around it, outermost
//! first. An empty chain means the comment sits at module level.
//!
//! Blocks are recovered from indentation alone: a definition runs from its header to the
//! last line indented deeper than the header, before the next statement that is not.
//! Lines inside brackets, after a backslash or inside a multi-line string continue the
//! statement above them and never open or close a block.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::span::{LineIndex, Span, SpanKind};

/// `def` / `async def` / `class` followed by the defined name.
pub(crate) static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:async\s+)?(def|class)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

const TAB_STOP: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Function,
    Class,
}

/// One definition enclosing a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: String,
    /// Parameter names in order, with `*` / `**` kept on variadics. `None` for classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<String>>,
    pub start_line: usize,
    pub end_line: usize,
}

/// Definitions of one file, and for each line the innermost one containing it.
#[derive(Debug)]
pub struct ScopeIndex {
    scopes: Vec<Scope>,
    parents: Vec<Option<usize>>,
    innermost: Vec<Option<usize>>,
}

impl ScopeIndex {
    pub fn new(source: &str, spans: &[Span], lines: &LineIndex) -> Self {
        let continued = continued_lines(source, spans, lines);
        let mut scopes: Vec<Scope> = Vec::new();
        let mut parents: Vec<Option<usize>> = Vec::new();
        // Open definitions as (scope index, header indentation), innermost last.
        let mut open: Vec<(usize, usize)> = Vec::new();

        for line in 1..=lines.line_count() {
            let line_start = lines.line_start(line);
            let text = &source[line_start..lines.line_end(source, line)];
            let body = text.trim_start();
            if body.is_empty() {
                continue;
            }
            if continued[line - 1] {
                if let Some(&(top, _)) = open.last() {
                    scopes[top].end_line = line;
                }
                continue;
            }

            let indent = indent_width(text);
            if body.starts_with('#') {
                // A comment belongs to the innermost block it is indented into.
                if let Some(&(idx, _)) = open.iter().rev().find(|(_, header)| *header < indent) {
                    scopes[idx].end_line = line;
                }
                continue;
            }

            while let Some(&(idx, header)) = open.last() {
                if header < indent {
                    break;
                }
                open.pop();
                close(&mut scopes, &parents, idx);
            }
            if let Some(&(top, _)) = open.last() {
                scopes[top].end_line = line;
            }

            let header_start = line_start + (text.len() - body.len());
            if let Some(scope) = header_scope(source, spans, body, header_start, line) {
                parents.push(open.last().map(|&(idx, _)| idx));
                open.push((scopes.len(), indent));
                scopes.push(scope);
            }
        }
        while let Some((idx, _)) = open.pop() {
            close(&mut scopes, &parents, idx);
        }

        // Headers come in source order, so nested scopes overwrite their parents.
        let mut innermost = vec![None; lines.line_count()];
        for (idx, scope) in scopes.iter().enumerate() {
            for slot in &mut innermost[scope.start_line - 1..scope.end_line] {
                *slot = Some(idx);
            }
        }

        Self {
            scopes,
            parents,
            innermost,
        }
    }

    /// Definitions containing `line`, outermost first.
    pub fn chain(&self, line: usize) -> Vec<Scope> {
        let mut chain = Vec::new();
        let mut current = line
            .checked_sub(1)
            .and_then(|idx| self.innermost.get(idx))
            .copied()
            .flatten();
        while let Some(idx) = current {
            chain.push(self.scopes[idx].clone());
            current = self.parents[idx];
        }
        chain.reverse();
        chain
    }
}

/// A closed block also extends every block around it.
fn close(scopes: &mut [Scope], parents: &[Option<usize>], idx: usize) {
    if let Some(parent) = parents[idx] {
        scopes[parent].end_line = scopes[parent].end_line.max(scopes[idx].end_line);
    }
}

fn indent_width(text: &str) -> usize {
    text.chars()
        .take_while(|c| matches!(c, ' ' | '\t'))
        .fold(0, |width, c| match c {
            '\t' => (width / TAB_STOP + 1) * TAB_STOP,
            _ => width + 1,
        })
}

/// Per line: does it continue the logical line above it?
fn continued_lines(source: &str, spans: &[Span], lines: &LineIndex) -> Vec<bool> {
    let mut continued = vec![false; lines.line_count()];
    let mut depth = 0usize;

    for span in spans {
        let mut line = lines.line_of(span.start);
        let mut prev = '\0';
        for c in span.text(source).chars() {
            match (span.kind, c) {
                (_, '\n') => {
                    line += 1;
                    if let Some(flag) = continued.get_mut(line - 1) {
                        *flag = span.kind == SpanKind::StringLiteral || depth > 0 || prev == '\\';
                    }
                }
                (SpanKind::Code | SpanKind::Disabled, '(' | '[' | '{') => depth += 1,
                (SpanKind::Code | SpanKind::Disabled, ')' | ']' | '}') => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            if c != '\r' {
                prev = c;
            }
        }
    }
    continued
}

fn header_scope(
    source: &str,
    spans: &[Span],
    body: &str,
    header_start: usize,
    line: usize,
) -> Option<Scope> {
    let caps = HEADER.captures(body)?;
    let after_name = header_start + caps.get(0).map_or(0, |m| m.end());
    let (kind, parameters) = match &caps[1] {
        "def" => (
            ScopeKind::Function,
            Some(parameters(&parameter_list(source, spans, after_name))),
        ),
        _ => (ScopeKind::Class, None),
    };
    Some(Scope {
        kind,
        name: caps[2].to_string(),
        parameters,
        start_line: line,
        end_line: line,
    })
}

/// Text between the parentheses following `from`, with string literals emptied and
/// comments dropped.
fn parameter_list(source: &str, spans: &[Span], from: usize) -> String {
    let mut list = String::new();
    let mut depth = 0usize;
    let first = spans.partition_point(|span| span.end <= from);

    for span in &spans[first..] {
        match span.kind {
            SpanKind::LineComment | SpanKind::BlockComment => {}
            SpanKind::StringLiteral if depth > 0 => list.push_str("\"\""),
            SpanKind::StringLiteral => return list,
            SpanKind::Code | SpanKind::Disabled => {
                for c in source[span.start.max(from)..span.end].chars() {
                    match c {
                        '(' if depth == 0 => {
                            depth = 1;
                            continue;
                        }
                        _ if depth == 0 && c.is_whitespace() => continue,
                        _ if depth == 0 => return list,
                        '(' | '[' | '{' => depth += 1,
                        ')' | ']' | '}' => {
                            depth -= 1;
                            if depth == 0 {
                                return list;
                            }
                        }
                        _ => {}
                    }
                    list.push(c);
                }
            }
        }
    }
    list
}

/// Names declared in a parameter list: annotations and defaults dropped, bare `*` and
/// `/` markers skipped.
fn parameters(list: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&list[start..]);

    pieces
        .into_iter()
        .filter_map(|piece| {
            let piece = piece.trim();
            let stars = piece.len() - piece.trim_start_matches('*').len();
            let name: String = piece[stars..]
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            (!name.is_empty()).then(|| format!("{}{}", &piece[..stars], name))
        })
        .collect()
}
