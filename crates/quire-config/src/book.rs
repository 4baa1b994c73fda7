//! Per-book metadata from `book.yaml`, and the arc and world tables.
use std::{collections::BTreeMap, fs, path::Path};

use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Built-in arc titles, by arc number.
pub const ARC_TITLES: [(u32, &str); 7] = [
  (1, "The Silence"),
  (2, "The Signal"),
  (3, "The Crossing"),
  (4, "The Stranger"),
  (5, "The Mirror"),
  (6, "The Return"),
  (7, "The Choice"),
];

/// Built-in POV to world mapping, used for sigil animation styles.
pub const POV_WORLDS: [(&str, &str); 6] = [
  ("Kael", "continental"),
  ("Moss", "continental"),
  ("Sūrya", "antarctic"),
  ("Sūrya + VEDA", "antarctic"),
  ("Dual", "dual"),
  ("Dual + VEDA", "dual"),
];

/// World used when a POV is not in the table.
pub const DEFAULT_WORLD: &str = "continental";

/// Arc title used when an arc number is not in the table.
pub const UNKNOWN_ARC: &str = "Unknown";

/// Book metadata.
///
/// Loading never fails: a missing, unreadable or malformed `book.yaml` yields
/// the defaults, and `null` values keep them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookConfig {
  pub title:        String,
  pub subtitle:     String,
  pub arcade_href:  String,
  pub arcade_label: String,
  pub home_href:    String,
  pub home_label:   String,
  /// Arc number to title.
  pub arcs:         BTreeMap<u32, String>,
  /// POV name to world.
  pub worlds:       BTreeMap<String, String>,
  /// The parsed file, for tools that read keys beyond the ones above.
  #[serde(skip)]
  pub raw:          Mapping,
}

impl BookConfig {
  /// Defaults for a book whose root directory is named `title`.
  #[must_use]
  pub fn with_title(title: &str) -> Self {
    Self {
      title:        if title.is_empty() {
        "Untitled".to_string()
      } else {
        title.to_string()
      },
      subtitle:     "A Novel".to_string(),
      arcade_href:  "/".to_string(),
      arcade_label: "All books".to_string(),
      home_href:    "https://too.foo/".to_string(),
      home_label:   "too.foo".to_string(),
      arcs:         ARC_TITLES
        .iter()
        .map(|(n, t)| (*n, (*t).to_string()))
        .collect(),
      worlds:       POV_WORLDS
        .iter()
        .map(|(p, w)| ((*p).to_string(), (*w).to_string()))
        .collect(),
      raw:          Mapping::new(),
    }
  }

  /// Load `book.yaml` from the book root.
  #[must_use]
  pub fn load(root: &Path) -> Self {
    let dir_name = root
      .canonicalize()
      .ok()
      .as_deref()
      .unwrap_or(root)
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let mut config = Self::with_title(&dir_name);

    let path = root.join("book.yaml");
    if !path.is_file() {
      log::debug!("No book.yaml in {}, using defaults", root.display());
      return config;
    }

    let mapping = match fs::read_to_string(&path)
      .map_err(|e| e.to_string())
      .and_then(|s| {
        serde_yaml::from_str::<Value>(&s).map_err(|e| e.to_string())
      }) {
      Ok(Value::Mapping(mapping)) => mapping,
      Ok(Value::Null) => return config,
      Ok(_) => {
        log::warn!("{} is not a mapping, using defaults", path.display());
        return config;
      },
      Err(e) => {
        log::warn!("Failed to read {}: {e}, using defaults", path.display());
        return config;
      },
    };

    config.apply_mapping(mapping);
    config
  }

  /// Apply the keys of a parsed `book.yaml` on top of the current values.
  pub fn apply_mapping(&mut self, mapping: Mapping) {
    for (key, field) in [
      ("title", &mut self.title),
      ("subtitle", &mut self.subtitle),
      ("arcade_href", &mut self.arcade_href),
      ("arcade_label", &mut self.arcade_label),
      ("home_href", &mut self.home_href),
      ("home_label", &mut self.home_label),
    ] {
      if let Some(value) = mapping.get(key).and_then(scalar_string) {
        *field = value;
      }
    }

    if let Some(Value::Mapping(arcs)) = mapping.get("arcs") {
      for (k, v) in arcs {
        let number = scalar_string(k).and_then(|s| s.parse::<u32>().ok());
        match (number, scalar_string(v)) {
          (Some(n), Some(title)) => {
            self.arcs.insert(n, title);
          },
          _ => log::warn!("Ignoring malformed arc entry in book.yaml: {k:?}"),
        }
      }
    }

    if let Some(Value::Mapping(worlds)) = mapping.get("worlds") {
      for (k, v) in worlds {
        if let (Some(pov), Some(world)) = (scalar_string(k), scalar_string(v)) {
          self.worlds.insert(pov, world);
        }
      }
    }

    self.raw = mapping;
  }

  /// Title of `arc`, or `"Unknown"`.
  #[must_use]
  pub fn arc_title(&self, arc: u32) -> &str {
    self.arcs.get(&arc).map_or(UNKNOWN_ARC, String::as_str)
  }

  /// World of a POV, or the default world.
  #[must_use]
  pub fn world_for(&self, pov: &str) -> &str {
    self.worlds.get(pov).map_or(DEFAULT_WORLD, String::as_str)
  }
}

impl Default for BookConfig {
  fn default() -> Self {
    Self::with_title("Untitled")
  }
}

/// String form of a scalar YAML value; `null`, sequences and mappings give
/// `None`.
#[must_use]
pub fn scalar_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Tagged(tagged) => scalar_string(&tagged.value),
    Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
  }
}
