use std::{
  fs,
  path::{Path, PathBuf},
};

use quire_prose::RenderOptions;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prefix of every chapter-relative path: chapters sit two directories below
/// the book root.
const CHAPTER_DEPTH_PREFIX: &str = "../../";

/// File names searched for, in order, inside the book root.
const CONFIG_FILENAMES: [&str; 6] = [
  "quire.toml",
  "quire.json",
  ".quire.toml",
  ".quire.json",
  ".config/quire.toml",
  ".config/quire.json",
];

/// Configuration for the quire tools.
///
/// Every field has a default, so an empty file (or no file at all) describes
/// the standard book layout. Values are loaded from a TOML or JSON file and can
/// be overridden with `--config KEY=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
  /// Directory containing `arc-N/*.draft.md`, relative to the book root.
  pub manuscript_dir: PathBuf,

  /// Number of arc directories scanned for drafts.
  pub arc_count: u32,

  /// Planned number of chapters.
  pub total_chapters: u32,

  /// Stylesheet href, relative to a chapter page.
  pub style_href: String,

  /// Table of contents href, relative to a chapter page.
  pub index_href: String,

  /// Base of responsive illustration variants, relative to a chapter page.
  pub illustration_base: String,

  /// Base of SVG diagrams, relative to a chapter page.
  pub diagram_base: String,

  /// Base of chapter sigils, relative to a chapter page.
  pub sigil_base: String,

  /// Illustration variant widths, narrowest first.
  pub illustration_widths: Vec<u32>,

  /// Number of threads to use for parallel rendering.
  pub jobs: Option<usize>,

  /// Whether to write the legacy `build/index.html`.
  pub legacy_index: bool,

  /// Directory with template overrides (`chapter.html`, `index.html`,
  /// `chapter.js`), relative to the book root.
  pub template_dir: Option<PathBuf>,
}

impl Default for ToolConfig {
  fn default() -> Self {
    let render = RenderOptions::default();
    Self {
      manuscript_dir:      PathBuf::from("manuscript"),
      arc_count:           7,
      total_chapters:      40,
      style_href:          "../../style/novel.css".to_string(),
      index_href:          "../../index.html".to_string(),
      illustration_base:   render.illustration_base,
      diagram_base:        render.diagram_base,
      sigil_base:          "../../assets/sigils".to_string(),
      illustration_widths: render.illustration_widths,
      jobs:                None,
      legacy_index:        true,
      template_dir:        None,
    }
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "on" | "1" => Ok(true),
    "false" | "no" | "off" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, on/off or 1/0"
      )))
    },
  }
}

fn parse_number<T: std::str::FromStr>(
  key: &str,
  value: &str,
) -> Result<T, ConfigError> {
  value.parse().map_err(|_| {
    ConfigError::Config(format!("Invalid value for '{key}': '{value}'"))
  })
}

impl ToolConfig {
  /// Load configuration from a TOML or JSON file, chosen by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("json") => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      Some(ext) if ext.eq_ignore_ascii_case("toml") => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration for the book at `root`.
  ///
  /// Explicit `config_files` are loaded and merged in order; without them the
  /// book root is searched with [`ToolConfig::find_config_file`]. Overrides are
  /// applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load(
    root: &Path,
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged = Self::from_file(first)?;
      for path in rest {
        merged.merge(Self::from_file(path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    } else if let Some(discovered) = Self::find_config_file(root) {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      log::debug!("No config file found in {}, using defaults", root.display());
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Search the book root for a config file.
  #[must_use]
  pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|name| root.join(name))
      .find(|path| path.is_file())
  }

  /// Reject configurations that cannot describe a book.
  ///
  /// # Errors
  ///
  /// Returns an error describing every problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    if self.arc_count == 0 {
      errors.push("arc_count must be at least 1".to_string());
    }
    if self.total_chapters == 0 {
      errors.push("total_chapters must be at least 1".to_string());
    }
    if self.illustration_widths.is_empty() {
      errors.push("illustration_widths must not be empty".to_string());
    } else if !self.illustration_widths.is_sorted_by(|a, b| a < b) {
      errors.push(
        "illustration_widths must be strictly ascending, narrowest first"
          .to_string(),
      );
    }
    if self.jobs == Some(0) {
      errors.push("jobs must be at least 1".to_string());
    }
    if errors.is_empty() {
      Ok(())
    } else {
      Err(ConfigError::Config(errors.join("; ")))
    }
  }

  /// Apply configuration overrides from `KEY=VALUE` strings.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in `KEY=VALUE` form, names an
  /// unknown key, or carries a value of the wrong type.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Set a single field by key.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown keys or unparseable values.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "manuscript_dir" => self.manuscript_dir = PathBuf::from(value),
      "arc_count" => self.arc_count = parse_number(key, value)?,
      "total_chapters" => self.total_chapters = parse_number(key, value)?,
      "style_href" => self.style_href = value.to_string(),
      "index_href" => self.index_href = value.to_string(),
      "illustration_base" => self.illustration_base = value.to_string(),
      "diagram_base" => self.diagram_base = value.to_string(),
      "sigil_base" => self.sigil_base = value.to_string(),
      "illustration_widths" => {
        self.illustration_widths = value
          .split(',')
          .map(str::trim)
          .filter(|w| !w.is_empty())
          .map(|w| parse_number(key, w))
          .collect::<Result<_, _>>()?;
      },
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(parse_number(key, value)?)
        };
      },
      "legacy_index" => self.legacy_index = parse_bool(key, value)?,
      "template_dir" => {
        self.template_dir =
          (!value.is_empty()).then(|| PathBuf::from(value));
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'"
        )));
      },
    }
    Ok(())
  }

  /// Merge another config into this one.
  ///
  /// Fields of `other` that differ from the defaults replace the values in
  /// `self`, so a later file only overrides what it actually sets. Optional
  /// fields are replaced when `other` has a value.
  pub fn merge(&mut self, other: Self) {
    let defaults = Self::default();

    macro_rules! take_if_set {
      ($($field:ident),+ $(,)?) => {
        $(
          if other.$field != defaults.$field {
            self.$field = other.$field;
          }
        )+
      };
    }

    take_if_set!(
      manuscript_dir,
      arc_count,
      total_chapters,
      style_href,
      index_href,
      illustration_base,
      diagram_base,
      sigil_base,
      illustration_widths,
      legacy_index,
    );

    if other.jobs.is_some() {
      self.jobs = other.jobs;
    }
    if other.template_dir.is_some() {
      self.template_dir = other.template_dir;
    }
  }

  /// Options for the prose renderer.
  #[must_use]
  pub fn render_options(&self) -> RenderOptions {
    RenderOptions {
      illustration_base:   self.illustration_base.clone(),
      diagram_base:        self.diagram_base.clone(),
      illustration_widths: self.illustration_widths.clone(),
    }
  }

  /// Turn a chapter-relative href into one relative to the book root.
  ///
  /// `../../style/novel.css` becomes `style/novel.css`. Absolute URLs and
  /// paths without the chapter prefix are returned unchanged.
  #[must_use]
  pub fn root_relative(href: &str) -> &str {
    href.strip_prefix(CHAPTER_DEPTH_PREFIX).unwrap_or(href)
  }

  /// Directory of the drafts of `arc`.
  #[must_use]
  pub fn arc_dir(&self, root: &Path, arc: u32) -> PathBuf {
    root.join(&self.manuscript_dir).join(format!("arc-{arc}"))
  }

  /// Write a commented default configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let content = crate::templates::get_template(format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }

    fs::write(path, content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_apply_overrides_string_and_path() {
    let mut config = ToolConfig::default();
    config
      .apply_overrides(&[
        "manuscript_dir=drafts".to_string(),
        "style_href = /css/book.css".to_string(),
      ])
      .unwrap();
    assert_eq!(config.manuscript_dir, PathBuf::from("drafts"));
    assert_eq!(config.style_href, "/css/book.css");
  }

  #[test]
  fn test_apply_overrides_numeric_and_list() {
    let mut config = ToolConfig::default();
    config
      .apply_overrides(&[
        "jobs=8".to_string(),
        "total_chapters=12".to_string(),
        "illustration_widths=320, 960".to_string(),
      ])
      .unwrap();
    assert_eq!(config.jobs, Some(8));
    assert_eq!(config.total_chapters, 12);
    assert_eq!(config.illustration_widths, vec![320, 960]);

    config.apply_override("jobs", "").unwrap();
    assert_eq!(config.jobs, None);
  }

  #[test]
  fn test_apply_overrides_boolean() {
    let mut config = ToolConfig::default();
    config.apply_override("legacy_index", "no").unwrap();
    assert!(!config.legacy_index);
    config.apply_override("legacy_index", "1").unwrap();
    assert!(config.legacy_index);

    let err = config.apply_override("legacy_index", "maybe").unwrap_err();
    assert!(err.to_string().contains("Invalid boolean"));
  }

  #[test]
  fn test_apply_overrides_errors() {
    let mut config = ToolConfig::default();
    let err = config
      .apply_overrides(&["no_equals_sign".to_string()])
      .unwrap_err();
    assert!(err.to_string().contains("Expected KEY=VALUE"));

    let err = config
      .apply_overrides(&["unknown_key=value".to_string()])
      .unwrap_err();
    assert!(err.to_string().contains("Unknown configuration key"));

    let err = config
      .apply_overrides(&["arc_count=seven".to_string()])
      .unwrap_err();
    assert!(err.to_string().contains("Invalid value"));
  }

  #[test]
  fn test_merge_keeps_unset_fields() {
    let mut base = ToolConfig {
      total_chapters: 24,
      jobs: Some(2),
      ..Default::default()
    };
    let other = ToolConfig {
      style_href: "/novel.css".to_string(),
      ..Default::default()
    };
    base.merge(other);
    assert_eq!(base.total_chapters, 24);
    assert_eq!(base.jobs, Some(2));
    assert_eq!(base.style_href, "/novel.css");
  }

  #[test]
  fn test_root_relative() {
    assert_eq!(ToolConfig::root_relative("../../style/novel.css"), "style/novel.css");
    assert_eq!(ToolConfig::root_relative("/style/novel.css"), "/style/novel.css");
  }

  #[test]
  fn test_validate() {
    assert!(ToolConfig::default().validate().is_ok());
    let config = ToolConfig {
      arc_count: 0,
      illustration_widths: Vec::new(),
      ..Default::default()
    };
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("arc_count"));
    assert!(err.contains("illustration_widths"));
  }
}
