//! Per-file extraction: scan, aggregate, associate, emit.

use std::{fs, path::Path};

use crate::core::{
    aggregate::Aggregator,
    associate::{Associator, DEFAULT_CONTEXT_LINES},
    error::{ExtractError, LexWarning},
    language::{ExtensionMap, Language, LanguageProfile},
    record::{FileRecords, emit},
    scanner::scan,
    scope::ScopeIndex,
    span::LineIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Lines searched for, and kept as, a comment's context.
    pub context_lines: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// Extract every comment in `source`.
///
/// The whole file is scanned before anything is emitted, so a fatal lexical error
/// yields no records at all.
pub fn extract(
    source: &str,
    profile: &LanguageProfile,
    file: &str,
    options: &ExtractOptions,
) -> Result<FileRecords, ExtractError> {
    let lines = LineIndex::new(source);
    let spans = scan(source, profile).map_err(|err| ExtractError::from_scan(err, source, &lines))?;

    let warnings: Vec<LexWarning> = spans
        .iter()
        .filter_map(|span| {
            span.anomaly
                .map(|anomaly| LexWarning::from_anomaly(anomaly, span.start, lines.line_of(span.start)))
        })
        .collect();

    let associator = Associator::new(source, &spans, &lines, options.context_lines);
    let scopes = profile
        .indent_scopes
        .then(|| ScopeIndex::new(source, &spans, &lines));
    let pairs = Aggregator::new(source, profile, &spans, &lines).map(|mut unit| {
        unit.scope = scopes.as_ref().map(|index| index.chain(unit.start_line));
        let context = associator.associate(&unit);
        (unit, context)
    });
    let records = emit(file, profile.language, pairs, &warnings);

    Ok(FileRecords {
        file: file.to_string(),
        language: profile.language,
        records,
        warnings,
    })
}

/// Read and extract one file.
///
/// The language is `language` when given, otherwise looked up from the extension.
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn extract_file(
    path: &Path,
    language: Option<Language>,
    extensions: &ExtensionMap,
    options: &ExtractOptions,
) -> Result<FileRecords, ExtractError> {
    let language = match language {
        Some(language) => language,
        None => extensions.language_for(path).ok_or_else(|| {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ExtractError::UnsupportedLanguage(ext)
        })?,
    };

    let bytes = fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8_lossy(&bytes);

    extract(&source, language.profile(), &path.display().to_string(), options)
}
