//! Chapter theme map from `style/chapter-svg-themes.yaml`.
//!
//! Each entry names the chapter's sigil and carries the art-direction fields
//! used to build chapter cards and visual prompts.
use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::ConfigError;

/// Location of the theme map, relative to the book root.
pub const THEMES_PATH: &str = "style/chapter-svg-themes.yaml";

/// Theme entry of a single chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterTheme {
  pub chapter:        u32,
  /// Sigil file stem.
  pub id:             String,
  pub title:          String,
  pub pov:            String,
  pub alt:            String,
  pub motif:          String,
  pub theme_keywords: Vec<String>,
  pub svg_prompt:     String,
}

/// Sigil reference of a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigilEntry {
  pub id:  String,
  pub alt: String,
}

/// Drawing defaults shared by every sigil, from the map's `meta` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigilStyle {
  pub view_box:     String,
  pub stroke_width: u32,
}

impl Default for SigilStyle {
  fn default() -> Self {
    Self {
      view_box:     "0 0 256 256".to_string(),
      stroke_width: 12,
    }
  }
}

impl SigilStyle {
  fn from_meta(meta: Option<&Value>) -> Self {
    let defaults = Self::default();
    let Some(meta) = meta else {
      return defaults;
    };
    let view_box = match meta.get("viewBox") {
      Some(Value::String(view_box)) => view_box.clone(),
      _ => defaults.view_box,
    };
    let stroke_width = meta
      .get("svg_style_defaults")
      .and_then(|style| style.get("stroke_width"))
      .and_then(Value::as_u64)
      .and_then(|width| u32::try_from(width).ok())
      .unwrap_or(defaults.stroke_width);
    Self {
      view_box,
      stroke_width,
    }
  }
}

/// Themes keyed by chapter number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeMap {
  chapters: BTreeMap<u32, ChapterTheme>,
  style:    SigilStyle,
}

impl ThemeMap {
  /// Load the theme map of the book at `root`.
  ///
  /// A missing file gives an empty map. Entries that are not mappings or lack
  /// a chapter number are skipped.
  ///
  /// # Errors
  ///
  /// Returns an error if the file exists but cannot be read or is not YAML.
  pub fn load(root: &Path) -> Result<Self, ConfigError> {
    let path = root.join(THEMES_PATH);
    if !path.is_file() {
      log::debug!("No theme map at {}", path.display());
      return Ok(Self::default());
    }
    let content = fs::read_to_string(&path)?;
    Self::parse(&content)
  }

  /// Like [`ThemeMap::load`], but degrades to an empty map on any error.
  #[must_use]
  pub fn load_or_empty(root: &Path) -> Self {
    Self::load(root).unwrap_or_else(|e| {
      log::warn!("Ignoring theme map: {e}");
      Self::default()
    })
  }

  /// Parse theme map YAML.
  ///
  /// # Errors
  ///
  /// Returns an error if `content` is not valid YAML.
  pub fn parse(content: &str) -> Result<Self, ConfigError> {
    let value: Value = serde_yaml::from_str(content)?;
    let entries = match value.get("chapters") {
      Some(Value::Sequence(entries)) => entries.clone(),
      _ => Vec::new(),
    };

    let mut chapters = BTreeMap::new();
    for entry in entries {
      if !entry.is_mapping() {
        continue;
      }
      match serde_yaml::from_value::<ChapterTheme>(entry) {
        Ok(theme) if theme.chapter > 0 => {
          chapters.insert(theme.chapter, theme);
        },
        Ok(_) => log::warn!("Skipping theme entry without a chapter number"),
        Err(e) => log::warn!("Skipping malformed theme entry: {e}"),
      }
    }
    Ok(Self {
      chapters,
      style: SigilStyle::from_meta(value.get("meta")),
    })
  }

  /// Themes in chapter order.
  pub fn iter(&self) -> impl Iterator<Item = &ChapterTheme> {
    self.chapters.values()
  }

  #[must_use]
  pub const fn style(&self) -> &SigilStyle {
    &self.style
  }

  #[must_use]
  pub fn get(&self, chapter: u32) -> Option<&ChapterTheme> {
    self.chapters.get(&chapter)
  }

  /// Sigil of `chapter`, if it has one with a non-empty id.
  #[must_use]
  pub fn sigil(&self, chapter: u32) -> Option<SigilEntry> {
    self
      .get(chapter)
      .filter(|theme| !theme.id.is_empty())
      .map(|theme| {
        SigilEntry {
          id:  theme.id.clone(),
          alt: theme.alt.clone(),
        }
      })
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.chapters.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.chapters.is_empty()
  }
}
