//! Reading and writing book files.
use std::{
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use serde_json::Value;

use crate::error::{Result, StoryOsError};

/// Contents of `path`, or `None` when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
  match fs::read_to_string(path) {
    Ok(text) => Ok(Some(text)),
    Err(e) if e.kind() == ErrorKind::NotFound => {
      log::debug!("No {}", path.display());
      Ok(None)
    },
    Err(source) => {
      Err(StoryOsError::Read {
        path: path.to_path_buf(),
        source,
      })
    },
  }
}

/// Parse a YAML file into a JSON value, keeping key order.
///
/// A missing file gives `Value::Null`. Non-string mapping keys are converted
/// to strings.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not YAML.
pub fn read_yaml(path: &Path) -> Result<Value> {
  let Some(text) = read_optional(path)? else {
    return Ok(Value::Null);
  };
  let yaml: serde_yaml::Value =
    serde_yaml::from_str(&text).map_err(|source| {
      StoryOsError::Yaml {
        path: path.to_path_buf(),
        source,
      }
    })?;
  Ok(serde_json::to_value(&yaml)?)
}

/// Write `content` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
pub fn write_text(path: &Path, content: &str) -> Result<PathBuf> {
  let to_error = |source| {
    StoryOsError::Write {
      path: path.to_path_buf(),
      source,
    }
  };
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(to_error)?;
  }
  fs::write(path, content).map_err(to_error)?;
  log::info!("Wrote {}", path.display());
  Ok(path.to_path_buf())
}

/// Contents of `path`, which must exist.
///
/// # Errors
///
/// Returns [`StoryOsError::Missing`] if the file does not exist, or a read
/// error.
pub fn read_required(path: &Path) -> Result<String> {
  read_optional(path)?.ok_or_else(|| StoryOsError::Missing(path.to_path_buf()))
}
