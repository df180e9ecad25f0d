//! Directory walking: which files under a root get extracted.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::core::language::ExtensionMap;

/// Patterns without `*` or `?` are literal paths, even if they contain `[`.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn warn(verbose: bool, message: std::fmt::Arguments<'_>) {
    if verbose {
        eprintln!("{} {}", "warning:".bold().yellow(), message);
    }
}

/// Source files found under a root, in path order.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: BTreeSet<PathBuf>,
    /// Entries that could not be read while walking.
    pub skipped_count: usize,
}

/// Ignore rules, split by how they match.
struct Ignores {
    literal: Vec<PathBuf>,
    globs: Vec<Pattern>,
}

impl Ignores {
    fn new(base_dir: &Path, patterns: &[String], verbose: bool) -> Self {
        let mut literal = Vec::new();
        let mut globs = Vec::new();
        for p in patterns {
            if !is_glob_pattern(p) {
                literal.push(base_dir.join(p));
                continue;
            }
            match Pattern::new(p) {
                Ok(pattern) => globs.push(pattern),
                Err(e) => warn(verbose, format_args!("invalid ignore pattern '{p}': {e}")),
            }
        }
        Self { literal, globs }
    }

    fn matches(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.literal.iter().any(|ignored| path.starts_with(ignored))
            || self.globs.iter().any(|p| p.matches(&path_str))
    }
}

/// Roots to walk: `base_dir` itself, or each include resolved against it.
fn roots(base_dir: &Path, includes: &[String], verbose: bool) -> Vec<PathBuf> {
    if includes.is_empty() {
        return vec![base_dir.to_path_buf()];
    }

    let mut roots = Vec::new();
    for inc in includes {
        let full = base_dir.join(inc);
        if !is_glob_pattern(inc) {
            if full.exists() {
                roots.push(full);
            } else {
                warn(verbose, format_args!("include path does not exist: {}", full.display()));
            }
            continue;
        }
        match glob(&full.to_string_lossy()) {
            Ok(entries) => roots.extend(entries.flatten().filter(|entry| entry.is_dir())),
            Err(e) => warn(verbose, format_args!("invalid include pattern '{inc}': {e}")),
        }
    }
    roots
}

/// Collect files under `base_dir` whose extension maps to an enabled language.
///
/// A `base_dir` that is itself a file is returned as-is when its extension is known.
pub fn scan_files(
    base_dir: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    extensions: &ExtensionMap,
    verbose: bool,
) -> ScanResult {
    let mut result = ScanResult::default();
    let ignores = Ignores::new(base_dir, ignore_patterns, verbose);

    for root in roots(base_dir, includes, verbose) {
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    result.skipped_count += 1;
                    warn(verbose, format_args!("cannot access path: {e}"));
                    continue;
                }
            };
            let path = entry.path();
            if ignores.matches(path) {
                continue;
            }
            if entry.file_type().is_file() && extensions.language_for(path).is_some() {
                result.files.insert(path.to_path_buf());
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::core::file_scanner::*;
    use crate::core::language::Language;

    fn names(result: &ScanResult, base: &Path) -> Vec<String> {
        result
            .files
            .iter()
            .map(|f| {
                f.strip_prefix(base)
                    .unwrap_or(f)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_scan_known_extensions_only() {
        let dir = tempdir().unwrap();
        let base = dir.path();
        File::create(base.join("main.c")).unwrap();
        File::create(base.join("util.hpp")).unwrap();
        File::create(base.join("tool.py")).unwrap();
        File::create(base.join("README.md")).unwrap();

        let result = scan_files(base, &[], &[], &ExtensionMap::default(), false);

        assert_eq!(names(&result, base), vec!["main.c", "tool.py", "util.hpp"]);
    }

    #[test]
    fn test_scan_nested_directories_in_order() {
        let dir = tempdir().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join("src/kernels")).unwrap();
        File::create(base.join("src/kernels/add.cu")).unwrap();
        File::create(base.join("src/app.cpp")).unwrap();

        let result = scan_files(base, &[], &[], &ExtensionMap::default(), false);

        assert_eq!(names(&result, base), vec!["src/app.cpp", "src/kernels/add.cu"]);
    }

    #[test]
    fn test_scan_with_glob_and_literal_ignores() {
        let dir = tempdir().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join("build")).unwrap();
        fs::create_dir_all(base.join("src")).unwrap();
        File::create(base.join("build/gen.c")).unwrap();
        File::create(base.join("src/a.c")).unwrap();
        File::create(base.join("src/a_test.py")).unwrap();

        let result = scan_files(
            base,
            &[],
            &["build".to_owned(), "**/*_test.py".to_owned()],
            &ExtensionMap::default(),
            false,
        );

        assert_eq!(names(&result, base), vec!["src/a.c"]);
    }

    #[test]
    fn test_scan_with_includes() {
        let dir = tempdir().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join("src/core")).unwrap();
        fs::create_dir_all(base.join("lib")).unwrap();
        File::create(base.join("src/core/x.c")).unwrap();
        File::create(base.join("lib/y.c")).unwrap();

        let result = scan_files(
            base,
            &["src".to_owned(), "src/core".to_owned(), "missing".to_owned()],
            &[],
            &ExtensionMap::default(),
            false,
        );

        assert_eq!(names(&result, base), vec!["src/core/x.c"]);
    }

    #[test]
    fn test_scan_with_include_glob() {
        let dir = tempdir().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join("pkg/a")).unwrap();
        fs::create_dir_all(base.join("pkg/b")).unwrap();
        File::create(base.join("pkg/a/m.py")).unwrap();
        File::create(base.join("pkg/b/n.py")).unwrap();
        File::create(base.join("top.py")).unwrap();

        let result = scan_files(base, &["pkg/*".to_owned()], &[], &ExtensionMap::default(), false);

        assert_eq!(names(&result, base), vec!["pkg/a/m.py", "pkg/b/n.py"]);
    }

    #[test]
    fn test_scan_respects_language_restriction() {
        let dir = tempdir().unwrap();
        let base = dir.path();
        File::create(base.join("a.c")).unwrap();
        File::create(base.join("b.py")).unwrap();

        let map = ExtensionMap::default().restricted_to(&[Language::Python]);
        let result = scan_files(base, &[], &[], &map, false);

        assert_eq!(names(&result, base), vec!["b.py"]);
    }

    #[test]
    fn test_scan_single_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("one.mm");
        File::create(&file).unwrap();

        let result = scan_files(&file, &[], &[], &ExtensionMap::default(), false);

        assert_eq!(result.files.into_iter().collect::<Vec<_>>(), vec![file]);
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("src/*"));
        assert!(is_glob_pattern("**/*.py"));
        assert!(!is_glob_pattern("third_party"));
        assert!(!is_glob_pattern("src/[legacy]"));
    }
}
