use crate::fitch::reconstructor::DEFAULT_SEPARATOR;
use crate::fitch::{AmbiguityPolicy, ReconstructionOptions};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub tolerate_ambiguity: bool,
    #[serde(default = "default_ambiguity_separator")]
    pub ambiguity_separator: String,
    #[serde(default = "default_label_column")]
    pub label_column: String,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_ambiguity_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_label_column() -> String {
    "strain".to_string()
}

fn default_threads() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerate_ambiguity: false,
            ambiguity_separator: default_ambiguity_separator(),
            label_column: default_label_column(),
            threads: default_threads(),
        }
    }
}

impl Config {
    /// Location of the per-user config file.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "metafitch", "metafitch")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
    }

    /// Loads `path` when given. Otherwise reads the per-user file, falling
    /// back to defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_path(path);
        }
        match Self::default_path() {
            Some(config_path) if config_path.exists() => Self::from_path(&config_path),
            _ => Ok(Config::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::Invalid("threads must be at least 1".to_string()));
        }
        if self.label_column.is_empty() {
            return Err(ConfigError::Invalid("label_column must not be empty".to_string()));
        }
        Ok(())
    }

    /// Reconstruction settings, with command-line values taking precedence.
    pub fn reconstruction_options(&self, tolerate_ambiguity: bool, threads: Option<usize>) -> ReconstructionOptions {
        ReconstructionOptions {
            policy: AmbiguityPolicy::from_tolerance(tolerate_ambiguity || self.tolerate_ambiguity),
            separator: self.ambiguity_separator.clone(),
            threads: threads.unwrap_or(self.threads).max(1),
        }
    }
}
