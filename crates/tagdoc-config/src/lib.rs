//! Configuration management for tagdoc.
//!
//! Parses `tagdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `packages.registry_url`
//!
//! ## Example
//!
//! ```toml
//! [source]
//! root_dir = "."
//! patterns = ["docs/**/*.md", "styles/**/*.scss", "packages/*/package.json"]
//!
//! [pages]
//! nav_root = "_nav"
//! reserved = ["example"]
//!
//! [packages]
//! registry_url = "${NPM_REGISTRY:-https://registry.npmjs.org}"
//! ```

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override project root directory.
    pub root_dir: Option<PathBuf>,
    /// Override source patterns.
    pub patterns: Option<Vec<String>>,
    /// Override pages plugin enabled flag.
    pub pages_enabled: Option<bool>,
    /// Override style guide plugin enabled flag.
    pub styleguide_enabled: Option<bool>,
    /// Override packages plugin enabled flag.
    pub packages_enabled: Option<bool>,
    /// Override package registry URL.
    pub registry_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tagdoc.toml";

/// Source patterns used when neither the config nor the CLI names any.
const DEFAULT_PATTERNS: &[&str] = &["**/*"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source configuration (paths are relative strings from TOML).
    source: SourceConfigRaw,
    /// Markdown rendering options.
    pub markdown: MarkdownConfig,
    /// Pages plugin configuration.
    pub pages: PagesConfig,
    /// Style guide plugin configuration.
    pub styleguide: StyleGuideConfig,
    /// Packages plugin configuration.
    pub packages: PackagesConfig,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw source configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    root_dir: Option<String>,
    patterns: Option<Vec<String>>,
}

/// Resolved source configuration with an absolute root.
#[derive(Debug, Default)]
pub struct SourceConfig {
    /// Directory patterns are resolved against and output paths are
    /// relative to.
    pub root_dir: PathBuf,
    /// Glob patterns selecting input files.
    pub patterns: Vec<String>,
}

/// Markdown rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Convert quotes and dashes to typographic forms.
    pub smart_punctuation: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            smart_punctuation: false,
        }
    }
}

/// Pages plugin configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Whether the plugin runs.
    pub enabled: bool,
    /// Files handled by the plugin.
    pub pattern: String,
    /// Reference of the navigation root page.
    pub nav_root: String,
    /// Tag names kept as prose.
    pub reserved: Vec<String>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pattern: "**/*.md".to_owned(),
            nav_root: "_nav".to_owned(),
            reserved: Vec::new(),
        }
    }
}

/// Style guide plugin configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StyleGuideConfig {
    /// Whether the plugin runs.
    pub enabled: bool,
    /// Files handled by the plugin, one registration per pattern.
    pub patterns: Vec<String>,
    /// At-rule names kept as prose. `None` keeps the plugin's default list.
    pub reserved: Option<Vec<String>>,
}

impl Default for StyleGuideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: vec![
                "**/*.css".to_owned(),
                "**/*.scss".to_owned(),
                "**/*.less".to_owned(),
            ],
            reserved: None,
        }
    }
}

/// Packages plugin configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// Whether the plugin runs.
    pub enabled: bool,
    /// Files handled by the plugin.
    pub pattern: String,
    /// npm-compatible registry. Lookups are disabled when unset.
    pub registry_url: Option<String>,
    /// Timeout for a single registry request.
    pub timeout_secs: u64,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pattern: "**/package.json".to_owned(),
            registry_url: None,
            timeout_secs: 10,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`packages.registry_url`").
        field: String,
        /// Error message (e.g., "${`NPM_REGISTRY`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a non-empty, syntactically valid glob pattern.
fn require_pattern(pattern: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(pattern, field)?;
    glob::Pattern::new(pattern).map_err(|e| {
        ConfigError::Validation(format!("{field} has invalid pattern `{pattern}`: {e}"))
    })?;
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tagdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root_dir) = &settings.root_dir {
            self.source_resolved.root_dir.clone_from(root_dir);
        }
        if let Some(patterns) = &settings.patterns {
            self.source_resolved.patterns.clone_from(patterns);
        }
        if let Some(enabled) = settings.pages_enabled {
            self.pages.enabled = enabled;
        }
        if let Some(enabled) = settings.styleguide_enabled {
            self.styleguide.enabled = enabled;
        }
        if let Some(enabled) = settings.packages_enabled {
            self.packages.enabled = enabled;
        }
        if let Some(registry_url) = &settings.registry_url {
            self.packages.registry_url = Some(registry_url.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_config_from(current)
    }

    fn discover_config_from(mut current: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            source: SourceConfigRaw::default(),
            markdown: MarkdownConfig::default(),
            pages: PagesConfig::default(),
            styleguide: StyleGuideConfig::default(),
            packages: PackagesConfig::default(),
            source_resolved: SourceConfig {
                root_dir: base.to_path_buf(),
                patterns: default_patterns(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_source()?;
        self.validate_pages()?;
        self.validate_styleguide()?;
        self.validate_packages()?;
        Ok(())
    }

    fn validate_source(&self) -> Result<(), ConfigError> {
        if self.source_resolved.patterns.is_empty() {
            return Err(ConfigError::Validation(
                "source.patterns cannot be empty".to_owned(),
            ));
        }
        for pattern in &self.source_resolved.patterns {
            require_pattern(pattern, "source.patterns")?;
        }
        Ok(())
    }

    fn validate_pages(&self) -> Result<(), ConfigError> {
        require_pattern(&self.pages.pattern, "pages.pattern")?;
        require_non_empty(&self.pages.nav_root, "pages.nav_root")?;
        Ok(())
    }

    fn validate_styleguide(&self) -> Result<(), ConfigError> {
        if self.styleguide.enabled && self.styleguide.patterns.is_empty() {
            return Err(ConfigError::Validation(
                "styleguide.patterns cannot be empty".to_owned(),
            ));
        }
        for pattern in &self.styleguide.patterns {
            require_pattern(pattern, "styleguide.patterns")?;
        }
        Ok(())
    }

    fn validate_packages(&self) -> Result<(), ConfigError> {
        require_pattern(&self.packages.pattern, "packages.pattern")?;

        // Only validate registry_url if set (registry lookups enabled)
        if let Some(ref registry_url) = self.packages.registry_url {
            require_non_empty(registry_url, "packages.registry_url")?;
            require_http_url(registry_url, "packages.registry_url")?;
        }

        if self.packages.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "packages.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.packages.registry_url {
            self.packages.registry_url = Some(expand::expand_env(url, "packages.registry_url")?);
        }
        Ok(())
    }

    /// Resolve the root directory against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.source_resolved = SourceConfig {
            root_dir: self
                .source
                .root_dir
                .as_deref()
                .map_or_else(|| config_dir.to_path_buf(), |dir| config_dir.join(dir)),
            patterns: self
                .source
                .patterns
                .clone()
                .unwrap_or_else(default_patterns),
        };
    }
}

fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|&p| p.to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.source_resolved.root_dir, PathBuf::from("/test"));
        assert_eq!(config.source_resolved.patterns, vec!["**/*"]);
        assert!(config.markdown.gfm);
        assert!(!config.markdown.smart_punctuation);
        assert!(config.pages.enabled);
        assert_eq!(config.pages.pattern, "**/*.md");
        assert_eq!(config.pages.nav_root, "_nav");
        assert_eq!(config.styleguide.patterns.len(), 3);
        assert!(config.styleguide.reserved.is_none());
        assert_eq!(config.packages.pattern, "**/package.json");
        assert_eq!(config.packages.registry_url, None);
        assert_eq!(config.packages.timeout_secs, 10);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.pages.enabled);
        assert_eq!(config.pages.nav_root, "_nav");
    }

    #[test]
    fn test_parse_plugin_sections() {
        let toml = r#"
[markdown]
smart_punctuation = true

[pages]
pattern = "docs/**/*.md"
nav_root = "index"
reserved = ["example", "see"]

[styleguide]
enabled = false
reserved = ["media"]

[packages]
registry_url = "https://registry.npmjs.org"
timeout_secs = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.markdown.smart_punctuation);
        assert!(config.markdown.gfm);
        assert_eq!(config.pages.pattern, "docs/**/*.md");
        assert_eq!(config.pages.nav_root, "index");
        assert_eq!(config.pages.reserved, vec!["example", "see"]);
        assert!(!config.styleguide.enabled);
        assert_eq!(config.styleguide.reserved, Some(vec!["media".to_owned()]));
        assert_eq!(
            config.packages.registry_url.as_deref(),
            Some("https://registry.npmjs.org")
        );
        assert_eq!(config.packages.timeout_secs, 3);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[source]
root_dir = "project"
patterns = ["src/**/*.md"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/base"));

        assert_eq!(config.source_resolved.root_dir, PathBuf::from("/base/project"));
        assert_eq!(config.source_resolved.patterns, vec!["src/**/*.md"]);
    }

    #[test]
    fn test_resolve_paths_defaults_to_config_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/base"));

        assert_eq!(config.source_resolved.root_dir, PathBuf::from("/base"));
        assert_eq!(config.source_resolved.patterns, vec!["**/*"]);
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings {
            root_dir: Some(PathBuf::from("/elsewhere")),
            patterns: Some(vec!["*.md".to_owned()]),
            pages_enabled: Some(false),
            styleguide_enabled: None,
            packages_enabled: Some(false),
            registry_url: Some("http://localhost:4873".to_owned()),
        });

        assert_eq!(config.source_resolved.root_dir, PathBuf::from("/elsewhere"));
        assert_eq!(config.source_resolved.patterns, vec!["*.md"]);
        assert!(!config.pages.enabled);
        assert!(config.styleguide.enabled);
        assert!(!config.packages.enabled);
        assert_eq!(
            config.packages.registry_url.as_deref(),
            Some("http://localhost:4873")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.source_resolved.root_dir, PathBuf::from("/test"));
        assert!(config.pages.enabled);
        assert_eq!(config.packages.registry_url, None);
    }

    #[test]
    fn test_expand_env_vars_registry_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_TAGDOC_REGISTRY", "https://npm.test.com");
        }

        let toml = r#"
[packages]
registry_url = "${TEST_TAGDOC_REGISTRY}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(
            config.packages.registry_url.as_deref(),
            Some("https://npm.test.com")
        );

        unsafe {
            std::env::remove_var("TEST_TAGDOC_REGISTRY");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_TAGDOC_REGISTRY");
        }

        let toml = r#"
[packages]
registry_url = "${MISSING_TAGDOC_REGISTRY}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_TAGDOC_REGISTRY"));
        assert!(err.to_string().contains("packages.registry_url"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        Config::default_with_base(Path::new("/test")).validate().unwrap();
    }

    #[test]
    fn test_validate_empty_nav_root() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.pages.nav_root = String::new();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: pages.nav_root cannot be empty");
    }

    #[test]
    fn test_validate_invalid_pattern() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.styleguide.patterns = vec!["[unclosed".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("styleguide.patterns has invalid pattern `[unclosed`"));
    }

    #[test]
    fn test_validate_empty_source_patterns() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.source_resolved.patterns.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_disabled_styleguide_may_have_no_patterns() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.styleguide.enabled = false;
        config.styleguide.patterns.clear();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_registry_url_invalid_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.packages.registry_url = Some("ftp://registry".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must start with http:// or https://"));
    }

    #[test]
    fn test_validate_timeout_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.packages.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[source]\nroot_dir = \"docs\"\n\n[pages]\nnav_root = \"menu\"\n").unwrap();

        let config = Config::load(Some(path.as_path()), None).unwrap();

        assert_eq!(config.source_resolved.root_dir, dir.path().join("docs"));
        assert_eq!(config.pages.nav_root, "menu");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/tagdoc.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_cli_settings_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            registry_url: Some("not-a-url".to_owned()),
            ..CliSettings::default()
        };
        let err = Config::load(Some(path.as_path()), Some(&settings)).unwrap_err();
        assert!(err.to_string().contains("packages.registry_url"));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[pages\n").unwrap();

        assert!(matches!(
            Config::load(Some(path.as_path()), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_config_from(nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }
}
