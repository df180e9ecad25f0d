//! Python docstring recognition.
//!
//! The scanner tags every Python string as a [`SpanKind::StringLiteral`]; deciding that a
//! literal is documentation happens here, after scanning. A literal is a docstring when
//! it is a statement of its own and either
//!
//! - nothing but comments and blank lines precede it (module docstring), or
//! - the code before it ends a `def` / `async def` / `class` header with `:`.

use serde::Serialize;

use crate::core::{
    scope::HEADER,
    span::{Span, SpanKind},
};

/// Longest string prefix Python accepts (`rb`, `Rb`, ...).
const MAX_PREFIX_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Module,
    Function,
    Class,
}

/// What a docstring documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub kind: OwnerKind,
    pub name: Option<String>,
}

impl Owner {
    pub fn module() -> Self {
        Self {
            kind: OwnerKind::Module,
            name: None,
        }
    }
}

/// Owner of the string literal `spans[index]` if that literal is a docstring.
pub fn docstring_owner(source: &str, spans: &[Span], index: usize) -> Option<Owner> {
    let literal = spans.get(index)?;
    if literal.kind != SpanKind::StringLiteral || !ends_statement(source, spans, index) {
        return None;
    }

    // Find the last significant character before the literal.
    let mut cursor = index;
    let mut strip_prefix = true;
    while cursor > 0 {
        cursor -= 1;
        let span = spans[cursor];
        match span.kind {
            SpanKind::LineComment | SpanKind::BlockComment => {}
            SpanKind::StringLiteral => return None,
            SpanKind::Code | SpanKind::Disabled => {
                let mut text = span.text(source);
                if strip_prefix {
                    text = without_string_prefix(text)?;
                }
                let trimmed = text.trim_end();
                if !trimmed.is_empty() {
                    if !trimmed.ends_with(':') {
                        return None;
                    }
                    let colon = span.start + trimmed.len() - 1;
                    return header_owner(&statement_before(source, spans, cursor, colon)?);
                }
            }
        }
        strip_prefix = false;
    }

    Some(Owner::module())
}

/// Drop a string prefix such as `r` or `u` glued to the literal.
///
/// Returns `None` when the letters belong to an identifier instead (`foo"..."` is not a
/// statement of its own).
fn without_string_prefix(text: &str) -> Option<&str> {
    let letters = text
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .count();
    if letters == 0 {
        return Some(text);
    }
    let (rest, prefix) = text.split_at(text.len() - letters);
    let is_prefix = prefix.len() <= MAX_PREFIX_LEN
        && prefix.chars().all(|c| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F'));
    is_prefix.then_some(rest)
}

/// The literal must not be part of a larger expression on its line. A `;` ends the
/// statement just like a newline.
fn ends_statement(source: &str, spans: &[Span], index: usize) -> bool {
    match spans.get(index + 1) {
        None => true,
        Some(span) if span.kind.is_comment() => true,
        Some(span) if span.kind == SpanKind::Code => {
            let text = span.text(source);
            let line_rest = text.split('\n').next().unwrap_or(text).trim();
            line_rest.is_empty() || line_rest.starts_with(';')
        }
        Some(_) => false,
    }
}

/// Text of the logical statement ending at byte `colon` (inclusive).
///
/// Walks backwards through code spans, skipping comments and treating string literals
/// as opaque, until a newline at bracket depth zero. `None` if the colon sits inside an
/// unclosed bracket (a dict or slice, not a block header).
fn statement_before(source: &str, spans: &[Span], mut cursor: usize, colon: usize) -> Option<String> {
    let mut pieces: Vec<&str> = Vec::new();
    let mut depth = 0i32;
    let mut end = colon + 1;

    loop {
        let span = spans[cursor];
        match span.kind {
            SpanKind::LineComment | SpanKind::BlockComment => {}
            SpanKind::StringLiteral => pieces.push("\"\""),
            SpanKind::Code | SpanKind::Disabled => {
                let text = &source[span.start..end.min(span.end)];
                for (i, c) in text.char_indices().rev() {
                    match c {
                        ')' | ']' | '}' => depth += 1,
                        '(' | '[' | '{' => {
                            depth -= 1;
                            if depth < 0 {
                                return None;
                            }
                        }
                        '\n' if depth == 0 && !text[..i].ends_with('\\') => {
                            pieces.push(&text[i + 1..]);
                            return Some(pieces.into_iter().rev().collect());
                        }
                        _ => {}
                    }
                }
                pieces.push(text);
            }
        }
        if cursor == 0 {
            return Some(pieces.into_iter().rev().collect());
        }
        cursor -= 1;
        end = usize::MAX;
    }
}

fn header_owner(statement: &str) -> Option<Owner> {
    let caps = HEADER.captures(statement.trim_start())?;
    let kind = match &caps[1] {
        "def" => OwnerKind::Function,
        _ => OwnerKind::Class,
    };
    Some(Owner {
        kind,
        name: Some(caps[2].to_string()),
    })
}
