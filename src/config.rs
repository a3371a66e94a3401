//! Configuration loading and file filtering.
//!
//! The configuration is read once at start-up from an optional TOML file and
//! never written back. It carries two things:
//! - the category table (category name to extension list), replacing the
//!   built-in table when present
//! - filter rules deciding which top-level files are left alone
//!
//! # Configuration File Format
//!
//! ```toml
//! [categories]
//! Images = [".png", ".jpg", ".jpeg", ".gif"]
//! Archives = ["zip", ".7z"]
//!
//! [filters]
//! skip_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["desktop.ini", "Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::file_category::CategoryTable;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".tidyfolder.toml";

/// Per-user configuration file.
///
/// `$XDG_CONFIG_HOME/tidyfolder/config.toml` (usually `~/.config`) on Linux,
/// `~/Library/Application Support/tidyfolder/config.toml` on macOS and
/// `%APPDATA%\tidyfolder\config.toml` on Windows.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tidyfolder").join("config.toml"))
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("could not read configuration {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    /// Invalid TOML syntax or structure.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The same extension is mapped more than once.
    #[error("extension '{extension}' is listed under both '{first}' and '{second}'")]
    DuplicateExtension {
        extension: String,
        first: String,
        second: String,
    },

    /// A configured category uses the reserved fallback name.
    #[error("category name '{0}' is reserved for unmatched files")]
    ReservedCategory(String),

    /// A category name that cannot be used as a single folder name.
    #[error("category name '{0}' is not a valid folder name")]
    InvalidCategoryName(String),

    /// A category lists an empty extension.
    #[error("category '{0}' contains an empty extension")]
    EmptyExtension(String),

    /// Invalid glob pattern provided.
    #[error("invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    /// Invalid regex pattern provided.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
}

/// Raw configuration as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Category name to extension list. `None` keeps the built-in table.
    #[serde(default)]
    pub categories: Option<IndexMap<String, Vec<String>>>,

    #[serde(default)]
    pub filters: FilterRules,
}

/// Root-level filter rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Leave files whose name starts with "." where they are.
    #[serde(default)]
    pub skip_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for leaving files out of organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g. "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, with or without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Fully validated configuration, ready to be handed to the organizer.
#[derive(Debug)]
pub struct LoadedConfig {
    pub categories: CategoryTable,
    pub filters: CompiledFilters,
    /// Where the configuration came from, `None` for built-in defaults.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// Locates and reads the configuration file.
    ///
    /// Lookup order:
    /// 1. `config_path`, when given (it must exist)
    /// 2. `.tidyfolder.toml` in the current directory
    /// 3. `tidyfolder/config.toml` in the user configuration directory
    /// 4. built-in defaults
    ///
    /// # Arguments
    ///
    /// * `config_path` - Explicit file from `--config`, if any
    ///
    /// # Returns
    ///
    /// The parsed configuration and the file it came from, or `None` when
    /// the built-in defaults are used.
    pub fn load(config_path: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = config_path {
            return Ok((Self::load_from_file(path)?, Some(path.to_path_buf())));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.is_file() {
            return Ok((Self::load_from_file(&local_config)?, Some(local_config)));
        }

        if let Some(user_config) = user_config_path() {
            if user_config.is_file() {
                return Ok((Self::load_from_file(&user_config)?, Some(user_config)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Reads one configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Validates the category table and compiles the filters.
    pub fn validate(self) -> Result<(CategoryTable, CompiledFilters), ConfigError> {
        let categories = match self.categories {
            Some(map) => CategoryTable::from_map(map)?,
            None => CategoryTable::builtin(),
        };
        let filters = CompiledFilters::new(self.filters)?;
        Ok((categories, filters))
    }
}

impl LoadedConfig {
    /// Loads, validates and compiles the configuration in one step.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (raw, source) = AppConfig::load(config_path)?;
        let (categories, filters) = raw.validate()?;
        tracing::debug!(
            source = ?source,
            categories = categories.len(),
            "configuration loaded"
        );
        Ok(Self {
            categories,
            filters,
            source,
        })
    }
}

impl Default for LoadedConfig {
    fn default() -> Self {
        Self {
            categories: CategoryTable::builtin(),
            filters: CompiledFilters::allow_all(),
            source: None,
        }
    }
}

/// Pre-compiled filter rules.
#[derive(Debug)]
pub struct CompiledFilters {
    skip_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    /// Filters that keep every file.
    pub fn allow_all() -> Self {
        Self {
            skip_hidden_files: false,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }

    /// Compiles filter rules, rejecting invalid glob or regex patterns.
    pub fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden_files: rules.skip_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Decides whether a top-level file takes part in organization.
    ///
    /// Include patterns win over everything else; then hidden files, exact
    /// names, extensions, glob patterns and regexes can each exclude it.
    pub fn should_include(&self, file_name: &str) -> bool {
        if self.include_patterns.iter().any(|p| p.matches(file_name)) {
            return true;
        }

        if self.skip_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        if let Some(ext) = Path::new(file_name).extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.exclude_patterns.iter().any(|p| p.matches(file_name)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|r| r.is_match(file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self::allow_all()
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filters(rules: FilterRules) -> CompiledFilters {
        CompiledFilters::new(rules).expect("filters should compile")
    }

    #[test]
    fn test_default_config_uses_builtin_categories() {
        let (categories, filters) = AppConfig::default().validate().unwrap();
        assert_eq!(
            categories.names().collect::<Vec<_>>(),
            vec!["Images", "Documents", "Videos", "Music"]
        );
        assert!(filters.should_include(".hidden"));
        assert!(filters.should_include("photo.jpg"));
    }

    #[test]
    fn test_parse_categories_keeps_file_order() {
        let config = AppConfig::from_toml(
            r#"
            [categories]
            Zips = ["zip"]
            Books = [".epub", ".MOBI"]
            "#,
        )
        .unwrap();
        let (categories, _) = config.validate().unwrap();

        assert_eq!(categories.names().collect::<Vec<_>>(), vec!["Zips", "Books"]);
        assert_eq!(
            categories.extensions("Books"),
            Some(&[".epub".to_string(), ".mobi".to_string()][..])
        );
    }

    #[test]
    fn test_duplicate_extension_is_rejected() {
        let config = AppConfig::from_toml(
            r#"
            [categories]
            Images = [".png"]
            Scans = [".PNG"]
            "#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateExtension {
                extension: ".png".to_string(),
                first: "Images".to_string(),
                second: "Scans".to_string(),
            }
        );
    }

    #[test]
    fn test_other_category_is_reserved() {
        let config = AppConfig::from_toml("[categories]\nother = [\".bin\"]\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ReservedCategory(name)) if name == "other"
        ));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = AppConfig::from_toml("[categories\nImages = 3");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert_eq!(
            AppConfig::load(Some(&missing)).unwrap_err(),
            ConfigError::NotFound(missing)
        );
    }

    #[test]
    fn test_load_from_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[filters]\nskip_hidden_files = true\n[filters.exclude]\nextensions = [\".tmp\"]\n",
        )
        .unwrap();

        let loaded = LoadedConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert!(!loaded.filters.should_include(".DS_Store"));
        assert!(!loaded.filters.should_include("download.TMP"));
        assert!(loaded.filters.should_include("notes.txt"));
    }

    #[test]
    fn test_user_config_path_is_under_config_dir() {
        if let Some(dir) = dirs::config_dir() {
            let path = user_config_path().unwrap();
            assert!(path.starts_with(&dir));
            assert!(path.ends_with(Path::new("tidyfolder").join("config.toml")));
        }
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = filters(FilterRules {
            exclude: ExcludeRules {
                filenames: vec!["desktop.ini".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include("desktop.ini"));
        assert!(compiled.should_include("image.jpg"));
    }

    #[test]
    fn test_exclude_glob_and_regex() {
        let compiled = filters(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["*.part".to_string()],
                regex: vec![r"^~\$".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include("movie.mkv.part"));
        assert!(!compiled.should_include("~$report.docx"));
        assert!(compiled.should_include("report.docx"));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let compiled = filters(FilterRules {
            skip_hidden_files: true,
            include: IncludeRules {
                patterns: vec![".keep*".to_string()],
            },
            ..Default::default()
        });

        assert!(compiled.should_include(".keep-me.txt"));
        assert!(!compiled.should_include(".other"));
    }

    #[test]
    fn test_invalid_patterns_return_errors() {
        let bad_regex = CompiledFilters::new(FilterRules {
            exclude: ExcludeRules {
                regex: vec!["[invalid(".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(
            bad_regex,
            Err(ConfigError::InvalidRegexPattern { .. })
        ));

        let bad_glob = CompiledFilters::new(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["[invalid".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(bad_glob, Err(ConfigError::InvalidGlobPattern(_))));
    }
}
