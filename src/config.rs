//! Checker configuration.
//!
//! The configuration is read from YAML and can be extended from the command
//! line. `Config::prepare` compiles every pattern up front, so a bad pattern
//! is reported before any literal is looked at.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pattern::{PatternError, PatternList};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["exhaustruct.yaml", ".exhaustruct.yaml"];

/// Raw configuration as written by the user.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Type name patterns to check; empty means every type.
    #[serde(default)]
    pub include: Vec<String>,
    /// Type name patterns to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Allow empty literals of every type.
    #[serde(default)]
    pub allow_empty: bool,
    /// Type name patterns whose empty literals are allowed.
    #[serde(default)]
    pub allow_empty_include: Vec<String>,
    /// Allow empty literals returned from functions.
    #[serde(default)]
    pub allow_empty_returns: bool,
    /// Allow empty literals in `x := T{}` and `var x = T{}`.
    #[serde(default)]
    pub allow_empty_declarations: bool,
    /// Honor `//exhaustruct:` comment directives.
    #[serde(default = "default_true")]
    pub directives: bool,
    /// Glob patterns of source files whose literals are not reported.
    #[serde(default)]
    pub excluded_files: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            allow_empty: false,
            allow_empty_include: Vec::new(),
            allow_empty_returns: false,
            allow_empty_declarations: false,
            directives: true,
            excluded_files: Vec::new(),
        }
    }
}

/// Configuration errors; all are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("compile include patterns: {0}")]
    Include(#[source] PatternError),
    #[error("compile exclude patterns: {0}")]
    Exclude(#[source] PatternError),
    #[error("compile allow empty patterns: {0}")]
    AllowEmpty(#[source] PatternError),
    #[error("invalid excluded file glob {pattern:?}: {source}")]
    ExcludedFiles {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse a config from YAML text. An empty document yields the defaults.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Find a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Compile the configuration into run settings.
    pub fn prepare(&self) -> Result<Settings, ConfigError> {
        let include = PatternList::new(&self.include).map_err(ConfigError::Include)?;
        let exclude = PatternList::new(&self.exclude).map_err(ConfigError::Exclude)?;
        let allow_empty_patterns =
            PatternList::new(&self.allow_empty_include).map_err(ConfigError::AllowEmpty)?;

        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_files {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::ExcludedFiles {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let excluded_files = builder.build().map_err(|source| ConfigError::ExcludedFiles {
            pattern: self.excluded_files.join(", "),
            source,
        })?;

        Ok(Settings {
            include,
            exclude,
            allow_empty_patterns,
            allow_empty: self.allow_empty,
            allow_empty_returns: self.allow_empty_returns,
            allow_empty_declarations: self.allow_empty_declarations,
            use_directives: self.directives,
            excluded_files,
        })
    }
}

/// Compiled configuration for one analysis run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub include: PatternList,
    pub exclude: PatternList,
    pub allow_empty_patterns: PatternList,
    pub allow_empty: bool,
    pub allow_empty_returns: bool,
    pub allow_empty_declarations: bool,
    pub use_directives: bool,
    pub excluded_files: GlobSet,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include: PatternList::default(),
            exclude: PatternList::default(),
            allow_empty_patterns: PatternList::default(),
            allow_empty: false,
            allow_empty_returns: false,
            allow_empty_declarations: false,
            use_directives: true,
            excluded_files: GlobSet::empty(),
        }
    }
}

impl Settings {
    /// Whether include or exclude patterns restrict the checked types.
    pub fn filters_types(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }

    /// Whether literals in `path` are excluded from reporting.
    pub fn is_file_excluded(&self, path: &str) -> bool {
        self.excluded_files.is_match(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_valid_patterns() {
        let config = Config {
            include: vec![".*Test.*".to_string(), ".*Mock.*".to_string()],
            exclude: vec![".*Excluded.*".to_string()],
            allow_empty_include: vec![".*Empty.*".to_string()],
            ..Default::default()
        };

        let settings = config.prepare().unwrap();
        assert_eq!(settings.include.len(), 2);
        assert_eq!(settings.exclude.len(), 1);
        assert_eq!(settings.allow_empty_patterns.len(), 1);

        assert!(settings.include.match_full("pkg.TestStruct"));
        assert!(settings.include.match_full("pkg.MockStruct"));
        assert!(!settings.include.match_full("pkg.RegularStruct"));
        assert!(settings.exclude.match_full("pkg.ExcludedStruct"));
        assert!(settings.allow_empty_patterns.match_full("pkg.EmptyStruct"));
        assert!(settings.filters_types());
    }

    #[test]
    fn test_prepare_reports_failing_list() {
        let config = Config {
            include: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let err = config.prepare().unwrap_err();
        assert!(err.to_string().contains("compile include patterns"));

        let config = Config {
            exclude: vec!["".to_string()],
            ..Default::default()
        };
        let err = config.prepare().unwrap_err();
        assert!(err.to_string().contains("compile exclude patterns"));
        assert!(err.to_string().contains("can't be empty"));

        let config = Config {
            allow_empty_include: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let err = config.prepare().unwrap_err();
        assert!(err.to_string().contains("compile allow empty patterns"));
    }

    #[test]
    fn test_prepare_defaults() {
        let settings = Config::default().prepare().unwrap();
        assert!(settings.include.is_empty());
        assert!(settings.exclude.is_empty());
        assert!(settings.allow_empty_patterns.is_empty());
        assert!(settings.use_directives);
        assert!(!settings.filters_types());
        assert!(!settings.is_file_excluded("main.go"));
    }

    #[test]
    fn test_excluded_files() {
        let config = Config {
            excluded_files: vec!["**/*_gen.go".to_string()],
            ..Default::default()
        };
        let settings = config.prepare().unwrap();
        assert!(settings.is_file_excluded("pkg/api/types_gen.go"));
        assert!(!settings.is_file_excluded("pkg/api/types.go"));

        let bad = Config {
            excluded_files: vec!["a[".to_string()],
            ..Default::default()
        };
        assert!(matches!(bad.prepare(), Err(ConfigError::ExcludedFiles { .. })));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
include:
  - 'example\.com/.*'
exclude:
  - '.*Options'
allow_empty_returns: true
directives: false
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.include, vec![r"example\.com/.*"]);
        assert_eq!(config.exclude, vec![".*Options"]);
        assert!(config.allow_empty_returns);
        assert!(!config.allow_empty_declarations);
        assert!(!config.directives);

        let config = Config::from_yaml_str("").unwrap();
        assert!(config.directives);
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());

        let path = temp.path().join(".exhaustruct.yaml");
        fs::write(&path, "allow_empty: true\n").unwrap();
        assert_eq!(Config::discover(temp.path()), Some(path.clone()));

        let config = Config::parse_file(&path).unwrap();
        assert!(config.allow_empty);
    }
}
