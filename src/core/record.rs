//! Output records.

use serde::Serialize;

use crate::core::{
    aggregate::{CommentKind, CommentUnit},
    associate::ContextSnippet,
    docstring::Owner,
    error::LexWarning,
    language::Language,
    scope::Scope,
};

/// One extracted comment with its context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub file: String,
    pub language: Language,
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub doc_style: bool,
    pub text: String,
    pub raw: String,
    pub start_line: usize,
    pub end_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub in_disabled_region: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextSnippet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    /// Enclosing definitions, outermost first; empty at module level. Absent for
    /// languages without indentation blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<Scope>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<LexWarning>,
}

impl Record {
    /// The `(comment, context, language)` triple handed to a quality judge.
    pub fn judge_input(&self) -> (&str, Option<&str>, Language) {
        (
            &self.text,
            self.context.as_ref().map(|c| c.text.as_str()),
            self.language,
        )
    }

    fn covers_line(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
            || self
                .context
                .as_ref()
                .is_some_and(|c| (c.start_line..=c.end_line).contains(&line))
    }

    /// Warnings on the comment's or the context's lines. `warnings` is sorted by line.
    fn overlapping_warnings(&self, warnings: &[LexWarning]) -> Vec<LexWarning> {
        let (first, last) = match &self.context {
            Some(c) => (
                self.start_line.min(c.start_line),
                self.end_line.max(c.end_line),
            ),
            None => (self.start_line, self.end_line),
        };
        let from = warnings.partition_point(|w| w.line < first);
        warnings[from..]
            .iter()
            .take_while(|w| w.line <= last)
            .filter(|w| self.covers_line(w.line))
            .copied()
            .collect()
    }
}

/// Everything extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecords {
    pub file: String,
    pub language: Language,
    pub records: Vec<Record>,
    /// Every lexical warning in the file, including ones no record touches.
    pub warnings: Vec<LexWarning>,
}

/// Build records in source order, copying over the warnings each one overlaps.
///
/// `warnings` must be in source order, as [`crate::core::extract`] collects them.
pub fn emit<I>(file: &str, language: Language, pairs: I, warnings: &[LexWarning]) -> Vec<Record>
where
    I: IntoIterator<Item = (CommentUnit, Option<ContextSnippet>)>,
{
    let mut records: Vec<Record> = pairs
        .into_iter()
        .map(|(unit, context)| {
            let mut record = Record {
                file: file.to_string(),
                language,
                kind: unit.kind,
                doc_style: unit.doc_style,
                text: unit.text,
                raw: unit.raw,
                start_line: unit.start_line,
                end_line: unit.end_line,
                start_offset: unit.start,
                end_offset: unit.end,
                in_disabled_region: unit.disabled,
                context,
                owner: unit.owner,
                scope: unit.scope,
                warnings: Vec::new(),
            };
            record.warnings = record.overlapping_warnings(warnings);
            record
        })
        .collect();
    records.sort_by_key(|r| r.start_offset);
    records
}
