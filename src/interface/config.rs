use crate::analysis::naming::NamingConfig;
use crate::binder::compilation::within_namespaces;
use crate::interface::output::Logger;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "autobind.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid naming rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Shape and location of generated source files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Namespace wrapping generated classes; empty emits no namespace block
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_base_class")]
    pub base_class: String,

    #[serde(default)]
    pub interfaces: Vec<String>,

    /// Directory receiving one sub-directory per generated class
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Split output into a regenerable `.Auto` file and a user-owned file
    #[serde(default = "default_true")]
    pub use_partial_class: bool,

    /// Extra `using` directives for every generated file
    #[serde(default)]
    pub additional_namespaces: Vec<String>,

    #[serde(default)]
    pub emit_field_comments: bool,

    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Engine namespaces never considered when matching an existing generated instance
    #[serde(default = "default_builtin_namespaces")]
    pub builtin_namespaces: Vec<String>,
}

fn default_namespace() -> String {
    "UI".to_string()
}

fn default_base_class() -> String {
    "MonoBehaviour".to_string()
}

fn default_base_path() -> String {
    "Assets/Scripts/UI/Auto".to_string()
}

fn default_true() -> bool {
    true
}

fn default_file_extension() -> String {
    "cs".to_string()
}

fn default_builtin_namespaces() -> Vec<String> {
    vec![
        "UnityEngine".to_string(),
        "UnityEngine.UI".to_string(),
        "UnityEngine.EventSystems".to_string(),
    ]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            base_class: default_base_class(),
            interfaces: Vec::new(),
            base_path: default_base_path(),
            use_partial_class: true,
            additional_namespaces: Vec::new(),
            emit_field_comments: false,
            file_extension: default_file_extension(),
            builtin_namespaces: default_builtin_namespaces(),
        }
    }
}

impl GenerationConfig {
    fn class_dir(&self, class_name: &str) -> PathBuf {
        Path::new(self.base_path.trim_end_matches('/')).join(class_name)
    }

    /// `<basePath>/<Class>/<Class>.Auto.<ext>`
    pub fn auto_file_path(&self, class_name: &str) -> PathBuf {
        self.class_dir(class_name)
            .join(format!("{}.Auto.{}", class_name, self.file_extension))
    }

    /// `<basePath>/<Class>/<Class>.<ext>`, also the single-file output
    pub fn manual_file_path(&self, class_name: &str) -> PathBuf {
        self.class_dir(class_name)
            .join(format!("{}.{}", class_name, self.file_extension))
    }

    /// The file holding the field declarations in the current mode
    pub fn generated_file_path(&self, class_name: &str) -> PathBuf {
        if self.use_partial_class {
            self.auto_file_path(class_name)
        } else {
            self.manual_file_path(class_name)
        }
    }

    /// Base class followed by interfaces, blanks dropped
    pub fn inheritance(&self) -> Vec<String> {
        std::iter::once(&self.base_class)
            .chain(self.interfaces.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// `namespace` is one of the engine namespaces or nested below one
    pub fn is_builtin_namespace(&self, namespace: &str) -> bool {
        within_namespaces(namespace, &self.builtin_namespaces)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindConfig {
    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    /// Enable verbose output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

impl BindConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P, logger: &Logger) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            logger.warning(&format!(
                "No configuration at {}, using defaults",
                path.display()
            ));
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Overwrite `path` with a default configuration
    pub fn regenerate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::default();
        config.save_to_file(path)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, rule) in self.naming.rules.iter().enumerate() {
            if rule.suffix.trim().is_empty() {
                return Err(ConfigError::InvalidRule {
                    index,
                    reason: "suffix is empty".to_string(),
                });
            }
            if rule.component_type.is_empty() {
                return Err(ConfigError::InvalidRule {
                    index,
                    reason: format!("suffix '{}' has no component type", rule.suffix),
                });
            }
        }

        let generation = &self.generation;
        if generation.base_path.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("basePath is empty".to_string()));
        }
        if generation.file_extension.trim().is_empty() || generation.file_extension.contains('.')
        {
            return Err(ConfigError::InvalidConfig(format!(
                "fileExtension '{}' must be a bare extension such as 'cs'",
                generation.file_extension
            )));
        }

        Ok(())
    }

    /// Merge with another configuration, with other taking precedence
    pub fn merge(&mut self, other: &BindConfig) {
        if other.naming != NamingConfig::default() {
            self.naming = other.naming.clone();
        }

        let defaults = GenerationConfig::default();
        let theirs = &other.generation;
        let ours = &mut self.generation;
        if theirs.namespace != defaults.namespace {
            ours.namespace = theirs.namespace.clone();
        }
        if theirs.base_class != defaults.base_class {
            ours.base_class = theirs.base_class.clone();
        }
        if !theirs.interfaces.is_empty() {
            ours.interfaces = theirs.interfaces.clone();
        }
        if theirs.base_path != defaults.base_path {
            ours.base_path = theirs.base_path.clone();
        }
        if theirs.use_partial_class != defaults.use_partial_class {
            ours.use_partial_class = theirs.use_partial_class;
        }
        if !theirs.additional_namespaces.is_empty() {
            ours.additional_namespaces = theirs.additional_namespaces.clone();
        }
        if theirs.emit_field_comments {
            ours.emit_field_comments = true;
        }
        if theirs.file_extension != defaults.file_extension {
            ours.file_extension = theirs.file_extension.clone();
        }
        if theirs.builtin_namespaces != defaults.builtin_namespaces {
            ours.builtin_namespaces = theirs.builtin_namespaces.clone();
        }

        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
    }

    /// Get effective verbose setting
    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}
