use std::{
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use crate::error::{EditorialError, Result};

/// Contents of a file the caller named explicitly.
pub fn read_file(path: &Path) -> Result<String> {
  fs::read_to_string(path).map_err(|source| {
    if source.kind() == ErrorKind::NotFound {
      EditorialError::NotFound(path.to_path_buf())
    } else {
      EditorialError::Read {
        path: path.to_path_buf(),
        source,
      }
    }
  })
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
  fs::write(path, content).map_err(|source| {
    EditorialError::Write {
      path: path.to_path_buf(),
      source,
    }
  })
}

/// Parse a YAML file the caller named explicitly.
pub fn read_yaml(path: &Path) -> Result<serde_yaml::Value> {
  let text = read_file(path)?;
  serde_yaml::from_str(&text).map_err(|source| {
    EditorialError::Yaml {
      path: path.to_path_buf(),
      source,
    }
  })
}

/// `path` if absolute, otherwise `path` under `root`.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    root.join(path)
  }
}
