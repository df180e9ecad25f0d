//! Language profiles and the extension → language table.
//!
//! A [`LanguageProfile`] is plain data describing the lexical rules the scanner needs:
//! comment markers, quote characters, raw-string and triple-quote forms, and whether
//! `#if 0` regions exist. The scanner is one algorithm parameterized by this data, so a
//! new language is a new table entry rather than new control flow.
//!
//! Profiles live in a `static` table and are shared read-only across threads.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::Path,
    str::FromStr,
};

use serde::Serialize;

use crate::core::error::ExtractError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    C,
    Cpp,
    Cuda,
    ObjCpp,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::C,
        Language::Cpp,
        Language::Cuda,
        Language::ObjCpp,
    ];

    /// Canonical tag, as accepted by [`resolve`].
    pub fn tag(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Cuda => "cuda",
            Language::ObjCpp => "objcpp",
        }
    }

    /// Parse a tag or one of its aliases, case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "c" => Some(Language::C),
            "cpp" | "c++" | "cxx" => Some(Language::Cpp),
            "cuda" | "cu" => Some(Language::Cuda),
            "objcpp" | "objc++" | "objective-c++" | "mm" => Some(Language::ObjCpp),
            _ => None,
        }
    }

    pub fn profile(self) -> &'static LanguageProfile {
        match self {
            Language::Python => &PROFILES[0],
            Language::C => &PROFILES[1],
            Language::Cpp => &PROFILES[2],
            Language::Cuda => &PROFILES[3],
            Language::ObjCpp => &PROFILES[4],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_tag(s).ok_or_else(|| ExtractError::UnsupportedLanguage(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDelimiters {
    pub open: &'static str,
    pub close: &'static str,
    /// Whether an inner `open` must be balanced by its own `close`.
    pub nesting: bool,
}

#[derive(Debug)]
pub struct LanguageProfile {
    pub language: Language,
    /// Default file extensions, without the leading dot.
    pub extensions: &'static [&'static str],
    /// Line comment markers, longest first so prefix matching picks `///` over `//`.
    pub line_comments: &'static [&'static str],
    /// Line markers that denote documentation comments.
    pub doc_line_markers: &'static [&'static str],
    pub block_comment: Option<BlockDelimiters>,
    /// Block openers that denote documentation comments.
    pub doc_block_openers: &'static [&'static str],
    /// Characters opening a string or character literal.
    pub quotes: &'static [char],
    pub escape: char,
    /// `"""` / `'''` literals spanning lines.
    pub triple_quotes: bool,
    /// C++ `R"delim(...)delim"` literals.
    pub raw_strings: bool,
    /// `'` inside a numeric literal is a digit separator (`1'000'000`).
    pub digit_separators: bool,
    /// A backslash before the newline continues a line comment.
    pub line_continuation: bool,
    /// `#if 0` ... `#endif` regions are scanned as disabled code.
    pub preprocessor: bool,
    /// String statements directly after `def`/`class` headers are documentation.
    pub docstrings: bool,
    /// Blocks are delimited by indentation, so comments can be placed in their
    /// enclosing `def` / `class`.
    pub indent_scopes: bool,
}

const C: LanguageProfile = LanguageProfile {
    language: Language::C,
    extensions: &["c", "h"],
    line_comments: &["///", "//!", "//"],
    doc_line_markers: &["///", "//!"],
    block_comment: Some(BlockDelimiters {
        open: "/*",
        close: "*/",
        nesting: false,
    }),
    doc_block_openers: &["/**", "/*!"],
    quotes: &['"', '\''],
    escape: '\\',
    triple_quotes: false,
    raw_strings: false,
    digit_separators: true,
    line_continuation: true,
    preprocessor: true,
    docstrings: false,
    indent_scopes: false,
};

static PROFILES: [LanguageProfile; 5] = [
    LanguageProfile {
        language: Language::Python,
        extensions: &["py", "pyi"],
        line_comments: &["#:", "#"],
        doc_line_markers: &["#:"],
        block_comment: None,
        doc_block_openers: &[],
        quotes: &['"', '\''],
        escape: '\\',
        triple_quotes: true,
        raw_strings: false,
        digit_separators: false,
        line_continuation: false,
        preprocessor: false,
        docstrings: true,
        indent_scopes: true,
    },
    C,
    LanguageProfile {
        language: Language::Cpp,
        extensions: &["cpp", "hpp", "cc", "cxx", "hh", "hxx"],
        raw_strings: true,
        ..C
    },
    LanguageProfile {
        language: Language::Cuda,
        extensions: &["cu", "cuh"],
        raw_strings: true,
        ..C
    },
    LanguageProfile {
        language: Language::ObjCpp,
        extensions: &["mm"],
        raw_strings: true,
        ..C
    },
];

/// Look up the profile for a language tag.
pub fn resolve(tag: &str) -> Result<&'static LanguageProfile, ExtractError> {
    tag.parse::<Language>().map(Language::profile)
}

/// All built-in profiles, in registry order.
pub fn profiles() -> &'static [LanguageProfile] {
    &PROFILES
}

impl LanguageProfile {
    /// The line comment marker `text` starts with, if any.
    ///
    /// Doc markers repeated once more (`////` banners) fall back to the plain marker.
    pub fn line_marker(&self, text: &str) -> Option<&'static str> {
        self.line_comments.iter().copied().find(|marker| {
            if !text.starts_with(marker) {
                return false;
            }
            if !self.doc_line_markers.contains(marker) {
                return true;
            }
            let repeated = marker.chars().last();
            text[marker.len()..].chars().next() != repeated
        })
    }

    pub fn is_doc_line_marker(&self, marker: &str) -> bool {
        self.doc_line_markers.contains(&marker)
    }

    /// Whether a block comment's text uses a documentation opener.
    ///
    /// `/**/` is an empty comment and `/***` starts a banner; neither is documentation.
    pub fn is_doc_block(&self, text: &str) -> bool {
        self.doc_block_openers.iter().any(|opener| {
            text.starts_with(opener)
                && !matches!(text[opener.len()..].chars().next(), Some('*') | Some('/'))
        })
    }

    /// Human-readable summary of the comment syntax, for `corex languages`.
    pub fn syntax_summary(&self) -> String {
        let mut parts: Vec<String> = vec![self.line_comments.join(" ")];
        if let Some(block) = self.block_comment {
            parts.push(format!("{} {}", block.open, block.close));
        }
        if self.docstrings {
            parts.push("docstrings".to_string());
        }
        if self.preprocessor {
            parts.push("#if 0".to_string());
        }
        parts.join(", ")
    }
}

/// Extension → language mapping used when no explicit language is given.
#[derive(Debug, Clone)]
pub struct ExtensionMap {
    entries: HashMap<String, Language>,
}

impl Default for ExtensionMap {
    fn default() -> Self {
        let entries = PROFILES
            .iter()
            .flat_map(|profile| {
                profile
                    .extensions
                    .iter()
                    .map(move |ext| (ext.to_string(), profile.language))
            })
            .collect();
        Self { entries }
    }
}

impl ExtensionMap {
    /// Default table with user overrides applied (`"inl" -> "cpp"`).
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, ExtractError> {
        let mut map = Self::default();
        for (ext, tag) in overrides {
            let language: Language = tag.parse()?;
            map.entries
                .insert(ext.trim_start_matches('.').to_ascii_lowercase(), language);
        }
        Ok(map)
    }

    /// Keep only extensions mapping to one of `languages`.
    pub fn restricted_to(mut self, languages: &[Language]) -> Self {
        self.entries.retain(|_, language| languages.contains(language));
        self
    }

    pub fn language_for_extension(&self, ext: &str) -> Option<Language> {
        self.entries
            .get(ext.trim_start_matches('.').to_ascii_lowercase().as_str())
            .copied()
    }

    pub fn language_for(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        self.language_for_extension(ext)
    }

    /// Sorted extensions mapped to `language`.
    pub fn extensions_of(&self, language: Language) -> Vec<&str> {
        let mut exts: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, lang)| **lang == language)
            .map(|(ext, _)| ext.as_str())
            .collect();
        exts.sort_unstable();
        exts
    }
}
