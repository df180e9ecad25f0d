//! Tokenizing scanner.
//!
//! [`Scanner`] walks source text one code point at a time and yields [`Span`]s that
//! cover the input exactly once, in order. At every offset the checks run in a fixed
//! precedence:
//!
//! 1. an open string literal runs to its closing quote (escapes honored)
//! 2. an open block comment runs to its close delimiter
//! 3. inside an `#if 0` region, comments and strings are still recognized and
//!    `#endif` / `#else` / `#elif` at depth zero ends the region
//! 4. in code, the first opener to match wins: string/char literal, raw or
//!    triple-quoted string, line comment, block comment, then `#if 0`
//!
//! Literals and comments are consumed whole when their opener is seen, so a comment
//! marker inside a string can never start a comment.
//!
//! The scanner is a pull iterator: it is finite, forward-only and cannot be restarted.
//! After an [`ScanError`] it yields nothing more.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::{
    error::ScanError,
    language::{BlockDelimiters, LanguageProfile},
    span::{Anomaly, Span, SpanKind},
};

/// Maximum length of a C++ raw string delimiter.
const MAX_RAW_DELIMITER: usize = 16;

// `#if 0` at the start of a line, allowing indentation and spaces after `#`.
static DISABLE_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*#[ \t]*if[ \t]+0\b").unwrap());

// Conditional directives that open, split or close a region.
static CONDITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*#[ \t]*(if|ifdef|ifndef|elif|else|endif)\b").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Code,
    Disabled { depth: usize },
}

impl Region {
    fn span_kind(self) -> SpanKind {
        match self {
            Region::Code => SpanKind::Code,
            Region::Disabled { .. } => SpanKind::Disabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// `#if 0`; `skip` bytes of the directive are consumed into the region.
    Open { skip: usize },
    /// A nested conditional inside a disabled region.
    Nest { skip: usize },
    Unnest { skip: usize },
    /// Matching `#endif` / `#else` / `#elif`; the directive line is code again.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener<'a> {
    Quote(char),
    TripleQuote(&'static str),
    RawString { open_len: usize, delimiter: &'a str },
    LineComment,
    BlockComment(BlockDelimiters),
}

pub struct Scanner<'a> {
    source: &'a str,
    profile: &'a LanguageProfile,
    pos: usize,
    region: Region,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, profile: &'a LanguageProfile) -> Self {
        Self {
            source,
            profile,
            pos: 0,
            region: Region::Code,
            failed: false,
        }
    }

    fn rest(&self, pos: usize) -> &'a str {
        &self.source[pos..]
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.rest(pos).chars().next()
    }

    fn char_before(&self, pos: usize) -> Option<char> {
        self.source[..pos].chars().next_back()
    }

    fn next_boundary(&self, pos: usize) -> usize {
        pos + self.char_at(pos).map_or(1, char::len_utf8)
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.source.as_bytes()[self.pos - 1] == b'\n'
    }

    fn region_transition(&self) -> Option<Transition> {
        if !self.profile.preprocessor {
            return None;
        }
        let rest = self.rest(self.pos);
        match self.region {
            Region::Code => DISABLE_OPENER
                .find(rest)
                .map(|m| Transition::Open { skip: m.end() }),
            Region::Disabled { depth } => {
                let caps = CONDITIONAL.captures(rest)?;
                let skip = caps.get(0).map_or(0, |m| m.end());
                match (&caps[1], depth) {
                    ("if" | "ifdef" | "ifndef", _) => Some(Transition::Nest { skip }),
                    ("endif", 1..) => Some(Transition::Unnest { skip }),
                    (_, 1..) => None,
                    _ => Some(Transition::Close),
                }
            }
        }
    }

    fn opener_at(&self, pos: usize) -> Option<Opener<'a>> {
        let profile = self.profile;
        let rest = self.rest(pos);
        let c = rest.chars().next()?;

        if profile.quotes.contains(&c) {
            if profile.triple_quotes {
                let triple = if c == '"' { "\"\"\"" } else { "'''" };
                if rest.starts_with(triple) {
                    return Some(Opener::TripleQuote(triple));
                }
            }
            if c == '\'' && profile.digit_separators && self.is_digit_separator(pos) {
                return None;
            }
            return Some(Opener::Quote(c));
        }

        if profile.raw_strings
            && let Some(opener) = self.raw_string_opener(pos)
        {
            return Some(opener);
        }

        if profile.line_comments.iter().any(|m| rest.starts_with(m)) {
            return Some(Opener::LineComment);
        }

        if let Some(block) = profile.block_comment
            && rest.starts_with(block.open)
        {
            return Some(Opener::BlockComment(block));
        }

        None
    }

    /// `'` inside a numeric literal such as `0x7fff'ffff`.
    fn is_digit_separator(&self, pos: usize) -> bool {
        let is_token_char = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '\'' || c == '.';
        if !self.char_before(pos).is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !self.char_at(pos + 1).is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        let token_start = self.source[..pos]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_token_char(*c))
            .last()
            .map_or(pos, |(i, _)| i);
        self.char_at(token_start).is_some_and(|c| c.is_ascii_digit())
    }

    /// `R"delim(`, optionally prefixed by `u8`, `u`, `U` or `L`.
    fn raw_string_opener(&self, pos: usize) -> Option<Opener<'a>> {
        let rest = self.rest(pos);
        let prefix_len = ["u8R\"", "uR\"", "UR\"", "LR\"", "R\""]
            .iter()
            .find(|p| rest.starts_with(*p))?
            .len();
        if self
            .char_before(pos)
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return None;
        }
        let after_quote = &rest[prefix_len..];
        let paren = after_quote
            .char_indices()
            .take(MAX_RAW_DELIMITER + 1)
            .find(|(_, c)| !is_raw_delimiter_char(*c))
            .filter(|(_, c)| *c == '(')
            .map(|(i, _)| i)?;
        Some(Opener::RawString {
            open_len: prefix_len + paren + 1,
            delimiter: &after_quote[..paren],
        })
    }

    fn consume(&mut self, opener: Opener<'a>) -> Result<Span, ScanError> {
        let start = self.pos;
        let span = match opener {
            Opener::Quote(quote) => self.scan_quoted(start, quote),
            Opener::TripleQuote(delimiter) => self.scan_triple_quoted(start, delimiter),
            Opener::RawString {
                open_len,
                delimiter,
            } => self.scan_raw_string(start, open_len, delimiter),
            Opener::LineComment => self.scan_line_comment(start),
            Opener::BlockComment(block) => self.scan_block_comment(start, block)?,
        };
        self.pos = span.end;
        Ok(span)
    }

    fn scan_quoted(&self, start: usize, quote: char) -> Span {
        let mut pos = start + quote.len_utf8();
        while let Some(c) = self.char_at(pos) {
            if c == self.profile.escape {
                pos = self.skip_escaped(pos + c.len_utf8());
            } else if c == quote {
                return Span::new(SpanKind::StringLiteral, start, pos + c.len_utf8());
            } else if c == '\n' {
                // Single-line literal left open; stop before the newline.
                return Span::new(SpanKind::StringLiteral, start, pos)
                    .with_anomaly(Anomaly::UnterminatedString);
            } else {
                pos += c.len_utf8();
            }
        }
        Span::new(SpanKind::StringLiteral, start, self.source.len())
            .with_anomaly(Anomaly::UnterminatedString)
    }

    fn scan_triple_quoted(&self, start: usize, delimiter: &str) -> Span {
        let mut pos = start + delimiter.len();
        while let Some(c) = self.char_at(pos) {
            if c == self.profile.escape {
                pos = self.skip_escaped(pos + c.len_utf8());
            } else if self.rest(pos).starts_with(delimiter) {
                return Span::new(SpanKind::StringLiteral, start, pos + delimiter.len());
            } else {
                pos += c.len_utf8();
            }
        }
        Span::new(SpanKind::StringLiteral, start, self.source.len())
            .with_anomaly(Anomaly::UnterminatedString)
    }

    /// Skip the character following an escape; `\r\n` counts as one.
    fn skip_escaped(&self, pos: usize) -> usize {
        if self.rest(pos).starts_with("\r\n") {
            pos + 2
        } else if pos < self.source.len() {
            self.next_boundary(pos)
        } else {
            pos
        }
    }

    fn scan_raw_string(&self, start: usize, open_len: usize, delimiter: &str) -> Span {
        let body = start + open_len;
        let close = format!("){delimiter}\"");
        match self.rest(body).find(&close) {
            Some(idx) => Span::new(SpanKind::StringLiteral, start, body + idx + close.len()),
            None => Span::new(SpanKind::StringLiteral, start, self.source.len())
                .with_anomaly(Anomaly::UnterminatedString),
        }
    }

    /// Runs to the end of the line; the newline itself is left for the next span.
    fn scan_line_comment(&self, start: usize) -> Span {
        let mut from = start;
        loop {
            let Some(idx) = self.rest(from).find('\n') else {
                return Span::new(SpanKind::LineComment, start, self.source.len());
            };
            let newline = from + idx;
            let continued = self.profile.line_continuation
                && self.source[start..newline]
                    .trim_end_matches('\r')
                    .ends_with('\\');
            if !continued {
                return Span::new(SpanKind::LineComment, start, newline);
            }
            from = newline + 1;
        }
    }

    fn scan_block_comment(&mut self, start: usize, block: BlockDelimiters) -> Result<Span, ScanError> {
        let mut depth = 1usize;
        let mut pos = start + block.open.len();
        while pos < self.source.len() {
            let rest = self.rest(pos);
            if rest.starts_with(block.close) {
                depth -= 1;
                pos += block.close.len();
                if depth == 0 {
                    return Ok(Span::new(SpanKind::BlockComment, start, pos));
                }
            } else if block.nesting && rest.starts_with(block.open) {
                depth += 1;
                pos += block.open.len();
            } else {
                pos = self.next_boundary(pos);
            }
        }
        self.failed = true;
        Err(ScanError::UnterminatedComment { offset: start })
    }
}

fn is_raw_delimiter_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '\\' | '"')
}

impl Iterator for Scanner<'_> {
    type Item = Result<Span, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.source.len();
        if self.failed || self.pos >= len {
            return None;
        }
        let start = self.pos;

        while self.pos < len {
            if self.at_line_start()
                && let Some(transition) = self.region_transition()
            {
                let kind = self.region.span_kind();
                match transition {
                    Transition::Open { skip } => {
                        if self.pos > start {
                            return Some(Ok(Span::new(kind, start, self.pos)));
                        }
                        self.region = Region::Disabled { depth: 0 };
                        self.pos += skip;
                        continue;
                    }
                    Transition::Close => {
                        self.region = Region::Code;
                        if self.pos > start {
                            return Some(Ok(Span::new(kind, start, self.pos)));
                        }
                    }
                    Transition::Nest { skip } => {
                        if let Region::Disabled { depth } = &mut self.region {
                            *depth += 1;
                        }
                        self.pos += skip;
                        continue;
                    }
                    Transition::Unnest { skip } => {
                        if let Region::Disabled { depth } = &mut self.region {
                            *depth = depth.saturating_sub(1);
                        }
                        self.pos += skip;
                        continue;
                    }
                }
            }

            if let Some(opener) = self.opener_at(self.pos) {
                if self.pos > start {
                    return Some(Ok(Span::new(self.region.span_kind(), start, self.pos)));
                }
                return Some(self.consume(opener));
            }

            self.pos = self.next_boundary(self.pos);
        }

        (self.pos > start).then(|| Ok(Span::new(self.region.span_kind(), start, self.pos)))
    }
}

/// Scan `source` to completion, stopping at the first fatal error.
pub fn scan(source: &str, profile: &LanguageProfile) -> Result<Vec<Span>, ScanError> {
    Scanner::new(source, profile).collect()
}
