//! Configuration loading, validation, and management for SousChef.
//!
//! Loads configuration from `~/.souschef/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use souschef_core::{DEFAULT_DETAIL, Ingredient, PriorityTag};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.souschef/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SousChefConfig {
    /// Cooking defaults
    #[serde(default)]
    pub kitchen: KitchenConfig,

    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Immediate pantry values, keyed by token
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pantry: BTreeMap<String, serde_json::Value>,

    /// Template recipes registered into the cookbook
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipes: Vec<RecipeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenConfig {
    /// Default token budget; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<usize>,

    #[serde(default = "default_detail")]
    pub default_detail: String,

    /// Divisor for the character-based cost heuristic
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,

    /// Record plates for every cook
    #[serde(default)]
    pub explain: bool,
}

fn default_detail() -> String {
    DEFAULT_DETAIL.into()
}
fn default_chars_per_token() -> usize {
    4
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            budget: None,
            default_detail: default_detail(),
            chars_per_token: default_chars_per_token(),
            explain: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::ValidationError(format!(
                "unknown log format '{other}' (expected 'pretty' or 'json')"
            ))),
        }
    }
}

/// A template recipe declared in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Ingredient descriptors, e.g. `"Profile.name"`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,

    /// Output text; `{N}` is replaced by rendered ingredient N
    pub template: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityTag>,

    #[serde(default)]
    pub compressible: bool,

    /// Token of the recipe that stands in under budget pressure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Extra tokens that resolve to this recipe
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, DetailProfileConfig>,
}

/// How a detail label reshapes a template recipe's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailProfileConfig {
    /// Keep the first N characters.
    Truncate(usize),
    /// Replace `{value}` with the rendered output.
    Template(String),
}

impl DetailProfileConfig {
    pub fn apply(&self, rendered: &str) -> String {
        match self {
            Self::Truncate(max) => rendered.chars().take(*max).collect(),
            Self::Template(template) => template.replace("{value}", rendered),
        }
    }
}

impl SousChefConfig {
    /// Load configuration from the default path (~/.souschef/config.toml).
    ///
    /// Environment variables override the file:
    /// - `SOUSCHEF_BUDGET`
    /// - `SOUSCHEF_DEFAULT_DETAIL`
    /// - `SOUSCHEF_LOG_FORMAT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            recipes = config.recipes.len(),
            pantry = config.pantry.len(),
            "Loaded config"
        );
        Ok(config)
    }

    /// Apply `SOUSCHEF_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(budget) = lookup("SOUSCHEF_BUDGET") {
            let budget = budget.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "SOUSCHEF_BUDGET must be a non-negative integer, got '{budget}'"
                ))
            })?;
            self.kitchen.budget = Some(budget);
        }

        if let Some(detail) = lookup("SOUSCHEF_DEFAULT_DETAIL") {
            self.kitchen.default_detail = detail;
        }

        if let Some(format) = lookup("SOUSCHEF_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".souschef")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kitchen.chars_per_token == 0 {
            return Err(ConfigError::ValidationError(
                "kitchen.chars_per_token must be > 0".into(),
            ));
        }

        if self.kitchen.default_detail.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "kitchen.default_detail must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for recipe in &self.recipes {
            if recipe.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "recipe name must not be empty".into(),
                ));
            }

            for token in std::iter::once(&recipe.name).chain(&recipe.aliases) {
                if !seen.insert(token.as_str()) {
                    return Err(ConfigError::ValidationError(format!(
                        "recipe token '{token}' is declared more than once"
                    )));
                }
            }

            for descriptor in &recipe.ingredients {
                Ingredient::parse(descriptor).map_err(|e| {
                    ConfigError::ValidationError(format!(
                        "recipe '{}' has a bad ingredient: {e}",
                        recipe.name
                    ))
                })?;
            }

            if recipe.details.keys().any(|label| label.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "recipe '{}' has an empty detail label",
                    recipe.name
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        Self::default().to_toml()
    }

    /// Render this configuration as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
