//! Report formatting and printing.
//!
//! Text output is cargo-style: one block per comment with a clickable `--> path:line`
//! location and the associated code underneath. JSON output is a single document meant
//! for downstream tools. Kept out of `core` so the engine stays usable as a library.

use std::{
    borrow::Cow,
    io::{self, Write},
};

use colored::Colorize;
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{
    args::OutputFormat,
    commands::{CommandResult, CommandSummary, ExtractSummary, FileFailure, InitSummary},
};
use crate::core::{
    CommentKind, ExtensionMap, FileRecords, Language, LexWarning, OwnerKind, Record, Scope,
    ScopeKind, language::profiles,
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Display width of the comment summary line.
const MAX_SUMMARY_WIDTH: usize = 80;

/// Display width of each context line.
const MAX_CONTEXT_WIDTH: usize = 100;

const TAB_WIDTH: usize = 4;

pub fn print(result: &CommandResult, verbose: bool) {
    match &result.summary {
        CommandSummary::Extract(summary) => print_extract(summary, verbose),
        CommandSummary::Languages => {
            print_languages_to(&ExtensionMap::default(), &mut io::stdout().lock());
        }
        CommandSummary::Init(summary) => print_init(summary),
    }
}

fn print_extract(summary: &ExtractSummary, verbose: bool) {
    match summary.format {
        OutputFormat::Text => {
            report_to(summary, &mut io::stdout().lock());
        }
        OutputFormat::Json => {
            print_json_to(summary, &mut io::stdout().lock(), &mut io::stderr().lock());
        }
    }
    print_failures_to(&summary.failures, &mut io::stderr().lock());
    print_warning_hint_to(summary, verbose, &mut io::stderr().lock());
}

// ============================================================
// Text output
// ============================================================

/// Print every record, then a one-line summary.
pub fn report_to<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    for file in &summary.files {
        let max_line_width = calculate_max_line_width(file);
        for record in &file.records {
            print_record(record, writer, max_line_width);
        }
    }

    let comments = summary.comment_count();
    let files = summary.files.len();
    let msg = format!(
        "Extracted {} {} from {} {}",
        comments,
        plural(comments, "comment", "comments"),
        files,
        plural(files, "file", "files")
    );
    let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), msg.green());
}

fn print_record<W: Write>(record: &Record, writer: &mut W, max_line_width: usize) {
    let label = match (record.kind, record.doc_style) {
        (CommentKind::Docstring, _) => "docstring".bold().green(),
        (_, true) => "doc".bold().green(),
        (_, false) => "comment".bold().cyan(),
    };
    let first_line = record.text.lines().next().unwrap_or("");
    let _ = writeln!(
        writer,
        "{}: {}  {}",
        label,
        truncate_to_width(first_line, MAX_SUMMARY_WIDTH),
        record.language.to_string().dimmed()
    );

    let lines = if record.start_line == record.end_line {
        record.start_line.to_string()
    } else {
        format!("{}-{}", record.start_line, record.end_line)
    };
    let _ = writeln!(writer, "  {} {}:{}", "-->".blue(), record.file, lines);

    if let Some(context) = &record.context {
        let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
        for (offset, line) in context.text.lines().enumerate() {
            let expanded = line.replace('\t', &" ".repeat(TAB_WIDTH));
            let _ = writeln!(
                writer,
                "{:>width$} {} {}",
                (context.start_line + offset).to_string().blue(),
                "|".blue(),
                truncate_to_width(&expanded, MAX_CONTEXT_WIDTH),
                width = max_line_width
            );
        }
    }

    if let Some(owner) = &record.owner {
        let kind = match owner.kind {
            OwnerKind::Module => "module",
            OwnerKind::Function => "function",
            OwnerKind::Class => "class",
        };
        let name = owner.name.as_deref().map(|n| format!(" {n}")).unwrap_or_default();
        print_note(writer, max_line_width, "owner:", &format!("{kind}{name}"));
    }
    if let Some(scope) = record.scope.as_deref()
        && !scope.is_empty()
    {
        print_note(writer, max_line_width, "scope:", &scope_path(scope));
    }
    if record.in_disabled_region || record.context.as_ref().is_some_and(|c| c.disabled) {
        print_note(writer, max_line_width, "note:", "inside a disabled (#if 0) region");
    }
    for warning in &record.warnings {
        print_note(
            writer,
            max_line_width,
            "warning:",
            &format!("{} on line {}", warning.kind, warning.line),
        );
    }

    let _ = writeln!(writer);
}

/// `class Cache > def get(self, key)`
fn scope_path(scope: &[Scope]) -> String {
    scope
        .iter()
        .map(|s| match s.kind {
            ScopeKind::Class => format!("class {}", s.name),
            ScopeKind::Function => format!(
                "def {}({})",
                s.name,
                s.parameters.as_deref().unwrap_or_default().join(", ")
            ),
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

fn print_note<W: Write>(writer: &mut W, width: usize, label: &str, text: &str) {
    let _ = writeln!(
        writer,
        "{:>width$} {} {} {}",
        "",
        "=".blue(),
        label.bold(),
        text,
        width = width
    );
}

/// Print aborted files to a custom writer, followed by a count.
pub fn print_failures_to<W: Write>(failures: &[FileFailure], writer: &mut W) {
    if failures.is_empty() {
        return;
    }
    for failure in failures {
        let _ = writeln!(writer, "{}: {}", "error".bold().red(), failure.message);
        let location = match (failure.line, failure.column) {
            (Some(line), Some(column)) => format!("{}:{}:{}", failure.file, line, column),
            _ => failure.file.clone(),
        };
        let _ = writeln!(writer, "  {} {}", "-->".blue(), location);
    }
    let _ = writeln!(
        writer,
        "\n{} {} {} could not be extracted",
        FAILURE_MARK.red(),
        failures.len(),
        plural(failures.len(), "file", "files")
    );
}

/// Without `-v`, point at the hidden per-file warnings.
pub fn print_warning_hint_to<W: Write>(summary: &ExtractSummary, verbose: bool, writer: &mut W) {
    if verbose {
        return;
    }
    let warnings = summary.warning_count();
    if warnings > 0 {
        let _ = writeln!(
            writer,
            "{} {} lexical {} (use {} for details)",
            "warning:".bold().yellow(),
            warnings,
            plural(warnings, "warning", "warnings"),
            "-v".cyan()
        );
    }
    if summary.skipped_count > 0 {
        let _ = writeln!(
            writer,
            "{} {} path(s) could not be read (use {} for details)",
            "warning:".bold().yellow(),
            summary.skipped_count,
            "-v".cyan()
        );
    }
}

fn calculate_max_line_width(file: &FileRecords) -> usize {
    file.records
        .iter()
        .filter_map(|r| r.context.as_ref().map(|c| c.end_line))
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

/// Cut `s` to at most `max` display columns, marking the cut with `…`.
fn truncate_to_width(s: &str, max: usize) -> Cow<'_, str> {
    if UnicodeWidthStr::width(s) <= max {
        return Cow::Borrowed(s);
    }
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max.saturating_sub(1) {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('\u{2026}');
    Cow::Owned(out)
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

// ============================================================
// JSON output
// ============================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFile<'a> {
    file: &'a str,
    language: Language,
    total_comments: usize,
    comments: &'a [Record],
    warnings: &'a [LexWarning],
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: Vec<JsonFile<'a>>,
    failures: &'a [FileFailure],
}

/// Write the JSON document, reporting a failed write on `errors`.
pub fn print_json_to<W: Write, E: Write>(summary: &ExtractSummary, writer: &mut W, errors: &mut E) {
    if let Err(err) = json_report_to(summary, writer) {
        let _ = writeln!(
            errors,
            "{}: failed to write JSON report: {}",
            "error".bold().red(),
            err
        );
    }
}

/// Write the whole result as one pretty-printed JSON document.
pub fn json_report_to<W: Write>(summary: &ExtractSummary, writer: &mut W) -> serde_json::Result<()> {
    let report = JsonReport {
        files: summary
            .files
            .iter()
            .map(|f| JsonFile {
                file: &f.file,
                language: f.language,
                total_comments: f.records.len(),
                comments: &f.records,
                warnings: &f.warnings,
            })
            .collect(),
        failures: &summary.failures,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    let _ = writeln!(writer);
    Ok(())
}

// ============================================================
// Other commands
// ============================================================

/// Print the language table: tag, extensions and comment syntax.
pub fn print_languages_to<W: Write>(extensions: &ExtensionMap, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{:<8} {:<28} {}",
        "LANGUAGE".bold(),
        "EXTENSIONS".bold(),
        "SYNTAX".bold()
    );
    for profile in profiles() {
        let exts = extensions
            .extensions_of(profile.language)
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            writer,
            "{:<8} {:<28} {}",
            profile.language.tag(),
            exts,
            profile.syntax_summary()
        );
    }
}

fn print_init(summary: &InitSummary) {
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", summary.path.display()).green()
    );
}

// ============================================================
// Tests
// ============================================================
