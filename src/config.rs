use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_CONTEXT_LINES, ExtensionMap, Language};

pub const CONFIG_FILE_NAME: &str = ".corexrc.json";

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directories to walk, relative to the scan root. Empty means the whole root.
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    /// Enabled language tags.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Extra extension → language tag mappings, e.g. `"inl": "cpp"`.
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

fn default_languages() -> Vec<String> {
    Language::ALL.iter().map(|l| l.tag().to_string()).collect()
}

fn default_context_lines() -> usize {
    DEFAULT_CONTEXT_LINES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: Vec::new(),
            languages: default_languages(),
            extensions: BTreeMap::new(),
            context_lines: default_context_lines(),
        }
    }
}

impl Config {
    /// Reject bad globs, unknown language tags and a zero context window.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        self.enabled_languages()?;
        self.extension_map()?;

        if self.context_lines == 0 {
            bail!("'contextLines' must be at least 1");
        }

        Ok(())
    }

    pub fn enabled_languages(&self) -> Result<Vec<Language>> {
        self.languages
            .iter()
            .map(|tag| {
                tag.parse::<Language>()
                    .with_context(|| format!("Invalid entry in 'languages': \"{}\"", tag))
            })
            .collect()
    }

    /// Extension table with overrides applied, limited to the enabled languages.
    pub fn extension_map(&self) -> Result<ExtensionMap> {
        let languages = self.enabled_languages()?;
        let map = ExtensionMap::with_overrides(&self.extensions)
            .context("Invalid entry in 'extensions'")?;
        Ok(map.restricted_to(&languages))
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

/// Walk up from `start_dir` looking for the config file, stopping at a `.git` directory.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

pub struct ConfigLoadResult {
    pub config: Config,
    /// Where the config came from; `None` means built-in defaults.
    pub path: Option<PathBuf>,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    let Some(path) = find_config_file(start_dir) else {
        return Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        });
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(ConfigLoadResult {
        config,
        path: Some(path),
    })
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::config::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.includes.is_empty());
        assert!(config.ignores.is_empty());
        assert_eq!(config.languages.len(), Language::ALL.len());
        assert_eq!(config.context_lines, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "ignores": ["**/third_party/**"],
              "includes": ["src"],
              "languages": ["python", "c++"],
              "extensions": { "inl": "cpp" },
              "contextLines": 4
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.ignores, vec!["**/third_party/**"]);
        assert_eq!(config.includes, vec!["src"]);
        assert_eq!(config.context_lines, 4);
        assert_eq!(
            config.enabled_languages().unwrap(),
            vec![Language::Python, Language::Cpp]
        );

        let map = config.extension_map().unwrap();
        assert_eq!(map.language_for_extension("inl"), Some(Language::Cpp));
        assert_eq!(map.language_for_extension("c"), None);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = serde_json::from_str(r#"{ "contextLines": 3 }"#).unwrap();
        assert_eq!(config.context_lines, 3);
        assert_eq!(config.languages, default_languages());
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("kernels");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        assert_eq!(find_config_file(&sub_dir), Some(config_path));
    }

    #[test]
    fn test_find_config_stops_at_git_root() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{}").unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert_eq!(find_config_file(&repo), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["**/gen/**"] }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.path.is_some());
        assert_eq!(result.config.ignores, vec!["**/gen/**"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.path.is_none());
        assert_eq!(result.config.context_lines, DEFAULT_CONTEXT_LINES);
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_literal_bracket_include() {
        let config = Config {
            includes: vec!["src/[legacy]".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_language() {
        let config = Config {
            languages: vec!["cobol".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("languages"));
    }

    #[test]
    fn test_validate_zero_context_lines() {
        let config = Config {
            context_lines: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_bad_extension_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "extensions": { "x": "fortran" } }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_default_config_json_round_trips() {
        let json = default_config_json().unwrap();
        assert!(json.contains("contextLines"));
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.languages, default_languages());
    }
}
