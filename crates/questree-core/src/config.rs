//! Configuration handling for questree.
//!
//! Configuration is read from a TOML file with two tables:
//!
//! ```toml
//! [editor]
//! languages = ["en", "fr", "is"]
//! default_language = "en"
//! id_prefix = "q-"
//! id_strategy = "sequential"   # or "random"
//!
//! [labels]
//! root = "Main Question"
//! deleted = "⚠️ Deleted Question"
//! ```
//!
//! Every field has a default, so an empty file is valid.
//!
//! The active display language is resolved with precedence (highest first):
//! CLI flag, `QUESTREE_LANGUAGE`, config file, built-in default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, QuizResult};

/// Environment variable overriding the display language.
pub const LANGUAGE_ENV_VAR: &str = "QUESTREE_LANGUAGE";

/// Config file name inside the user config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Questree configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Editor settings
    #[serde(default)]
    pub editor: EditorConfig,

    /// Fixed UI labels
    #[serde(default)]
    pub labels: LabelConfig,
}

/// Core editor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    /// Languages every new question and answer is initialised with
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Display language when nothing else selects one
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Prefix of generated question ids
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// How new question ids are generated
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

/// Question id generation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `q-1`, `q-2`, ... skipping ids already taken
    #[default]
    Sequential,
    /// `q-<16 hex digits>`
    Random,
}

/// Fixed labels used by breadcrumbs, menus and prompts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelConfig {
    /// Breadcrumb label of the root question
    #[serde(default = "default_root_label")]
    pub root: String,

    /// Label of a question that no longer resolves
    #[serde(default = "default_deleted_label")]
    pub deleted: String,

    /// Placeholder for a question with no text
    #[serde(default = "default_untitled_label")]
    pub untitled: String,

    /// Placeholder for an answer with no text
    #[serde(default = "default_empty_answer_label")]
    pub empty_answer: String,

    /// Confirmation message for deletion; `{label}` is replaced
    #[serde(default = "default_delete_prompt")]
    pub delete_prompt: String,

    /// Confirmation message for collapsing a decision tree
    #[serde(default = "default_collapse_prompt")]
    pub collapse_prompt: String,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string(), "fr".to_string(), "is".to_string()]
}

fn default_language() -> String {
    "en".to_string()
}

fn default_id_prefix() -> String {
    "q-".to_string()
}

fn default_root_label() -> String {
    "Main Question".to_string()
}

fn default_deleted_label() -> String {
    "⚠️ Deleted Question".to_string()
}

fn default_untitled_label() -> String {
    "Untitled Question".to_string()
}

fn default_empty_answer_label() -> String {
    "Empty Answer".to_string()
}

fn default_delete_prompt() -> String {
    "Delete question \"{label}\"? This will remove it from the tree.".to_string()
}

fn default_collapse_prompt() -> String {
    "Switch between multiple choice and decision tree? Switching to multiple choice removes all branches."
        .to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            default_language: default_language(),
            id_prefix: default_id_prefix(),
            id_strategy: IdStrategy::default(),
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            root: default_root_label(),
            deleted: default_deleted_label(),
            untitled: default_untitled_label(),
            empty_answer: default_empty_answer_label(),
            delete_prompt: default_delete_prompt(),
            collapse_prompt: default_collapse_prompt(),
        }
    }
}

impl LabelConfig {
    /// The deletion prompt for a question labelled `label`.
    pub fn delete_message(&self, label: &str) -> String {
        self.delete_prompt.replace("{label}", label)
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> QuizResult<Self> {
        toml::from_str(content)
            .map_err(|e| QuizError::config(format!("failed to parse config file: {}", e)))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> QuizResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| QuizError::config(format!("failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if it exists, else defaults
    pub fn load_or_default(path: &Path) -> QuizResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }
}

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From the config file.
    ConfigFile = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --config flag.
    pub config_path: Option<PathBuf>,
    /// --language flag.
    pub language: Option<String>,
}

/// Configuration after applying every source.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Merged file configuration.
    pub config: Config,
    /// Where the file configuration came from, if any file was read.
    pub config_path: Option<PathBuf>,
    /// Active display language.
    pub language: ConfigValue<String>,
}

impl ResolvedConfig {
    /// Resolve configuration from all sources.
    ///
    /// `default_path` is consulted only when no `--config` flag was given,
    /// and only if the file exists. `env_language` is the value of
    /// [`LANGUAGE_ENV_VAR`], passed in so resolution stays testable.
    pub fn resolve(
        overrides: &CliOverrides,
        default_path: Option<&Path>,
        env_language: Option<String>,
    ) -> QuizResult<Self> {
        let (config, config_path) = match (&overrides.config_path, default_path) {
            (Some(path), _) => (Config::load(path)?, Some(path.clone())),
            (None, Some(path)) if path.exists() => (Config::load(path)?, Some(path.to_path_buf())),
            _ => (Config::default(), None),
        };

        let file_source = if config_path.is_some() {
            ConfigSource::ConfigFile
        } else {
            ConfigSource::Default
        };
        let mut language = ConfigValue::new(config.editor.default_language.clone(), file_source);

        if let Some(lang) = env_language.filter(|lang| !lang.trim().is_empty()) {
            language = language.merge(ConfigValue::new(lang.trim().to_string(), ConfigSource::EnvVar));
        }
        if let Some(lang) = &overrides.language {
            language = language.merge(ConfigValue::new(lang.clone(), ConfigSource::CliFlag));
        }

        Ok(ResolvedConfig {
            config,
            config_path,
            language,
        })
    }
}
