use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for quire-storyos operations
#[derive(Debug, Error)]
pub enum StoryOsError {
  #[error("Failed to read {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Missing {0}")]
  Missing(PathBuf),

  #[error("Failed to write {path}: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Invalid YAML in {path}: {source}")]
  Yaml {
    path:   PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("YAML error: {0}")]
  YamlEncode(#[from] serde_yaml::Error),

  #[error(transparent)]
  Config(#[from] quire_config::ConfigError),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoryOsError>;
