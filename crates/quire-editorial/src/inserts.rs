//! Visual-insert plans: placing `@illust`/`@diagram` markers into drafts.
//!
//! A plan is YAML, either for one chapter
//!
//! ```yaml
//! chapter: 3
//! draft_path: manuscript/arc-1/03-tide.draft.md
//! inserts:
//!   - kind: illust
//!     type: thumb
//!     id: tide-01
//!     text: The tide line
//!     apply:
//!       after_paragraph_including: "the water drew back"
//! ```
//!
//! or for several, under `chapters: [...]`. Anchors are plain substrings;
//! placement never guesses. Every insert is keyed by its marker id, so
//! applying a plan twice changes nothing the second time.
use std::{
  path::{Path, PathBuf},
  sync::LazyLock,
};

use quire_config::book::scalar_string;
use quire_prose::{
  Marker,
  MarkerFamily,
  Placement,
  marker::contains_marker_id,
  utils::compile,
};
use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::{
  error::{EditorialError, PlanError, Result},
  files::{read_file, read_yaml, resolve, write_file},
};

/// Plan used when none is given, relative to the book root.
pub const DEFAULT_PLAN_PATH: &str = "agents/visual/visual-inserts.yaml";

const DRAFT_PATH_KEYS: [&str; 3] = ["draft_path", "path", "draft"];
const PARAGRAPH_GAP: &str = "\n\n";

static PARAGRAPH_GAP_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("PARAGRAPH_GAP", r"\n\n+"));

/// Where an insert goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
  /// After the paragraph containing the text.
  AfterParagraph(String),
  /// Before the paragraph containing the text.
  BeforeParagraph(String),
  /// In place of the text, which must occur exactly once.
  ReplaceExact(String),
}

impl Anchor {
  #[must_use]
  pub const fn mode(&self) -> &'static str {
    match self {
      Self::AfterParagraph(_) => "after_paragraph_including",
      Self::BeforeParagraph(_) => "before_paragraph_including",
      Self::ReplaceExact(_) => "replace_exact",
    }
  }

  fn from_mode(mode: &str, value: String) -> Option<Self> {
    match mode {
      "after_paragraph_including" => Some(Self::AfterParagraph(value)),
      "before_paragraph_including" => Some(Self::BeforeParagraph(value)),
      "replace_exact" => Some(Self::ReplaceExact(value)),
      _ => None,
    }
  }
}

/// One validated insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
  pub marker:     Marker,
  pub anchor:     Anchor,
  /// 1-based pick among paragraphs matching a paragraph anchor.
  pub occurrence: Option<usize>,
}

/// The inserts for one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPlan {
  pub chapter:    Option<u32>,
  /// As written in the plan; relative paths are resolved against the book
  /// root.
  pub draft_path: PathBuf,
  pub inserts:    Vec<Insert>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertPlan {
  pub chapters: Vec<ChapterPlan>,
}

fn lowercase_field(map: &Mapping, key: &str) -> String {
  map
    .get(key)
    .and_then(scalar_string)
    .unwrap_or_default()
    .trim()
    .to_lowercase()
}

fn trimmed_field(map: &Mapping, key: &str) -> String {
  map
    .get(key)
    .and_then(scalar_string)
    .unwrap_or_default()
    .trim()
    .to_string()
}

fn parse_marker(map: &Mapping) -> std::result::Result<Marker, PlanError> {
  let kind = lowercase_field(map, "kind");
  let family =
    MarkerFamily::from_keyword(&kind).ok_or(PlanError::InvalidKind(kind))?;
  let placement_kw = lowercase_field(map, "type");
  let placement = Placement::from_keyword(&placement_kw)
    .ok_or(PlanError::InvalidPlacement(placement_kw))?;
  let id = trimmed_field(map, "id");
  if !Marker::is_valid_id(&id) {
    return Err(PlanError::InvalidId(id));
  }
  let text = trimmed_field(map, "text");
  if text.is_empty() {
    return Err(PlanError::EmptyText(id));
  }
  Ok(Marker {
    family,
    placement,
    id,
    text,
  })
}

fn parse_occurrence(
  value: Option<&Value>,
  id: &str,
) -> std::result::Result<Option<usize>, PlanError> {
  match value {
    None | Some(Value::Null) => Ok(None),
    Some(value) => {
      scalar_string(value)
        .and_then(|s| s.trim().parse::<usize>().ok())
        .map(Some)
        .ok_or_else(|| PlanError::InvalidOccurrence(id.to_string()))
    },
  }
}

fn parse_insert(value: &Value) -> std::result::Result<Insert, PlanError> {
  let Value::Mapping(map) = value else {
    return Err(PlanError::InsertNotMapping(String::new()));
  };
  let marker = parse_marker(map)?;
  let id = marker.id.clone();

  let Some(Value::Mapping(apply)) = map.get("apply") else {
    return Err(PlanError::ApplyNotMapping(id));
  };
  let occurrence = parse_occurrence(apply.get("occurrence"), &id)?;

  let modes: Vec<(String, &Value)> = apply
    .iter()
    .filter(|(_, v)| !v.is_null())
    .filter_map(|(k, v)| scalar_string(k).map(|k| (k, v)))
    .filter(|(k, _)| k != "occurrence")
    .collect();
  let [(mode, value)] = modes.as_slice() else {
    return Err(PlanError::ModeCount {
      id,
      modes: modes.iter().map(|(k, _)| k.clone()).collect(),
    });
  };

  let value = scalar_string(value).unwrap_or_default();
  if value.is_empty() {
    return Err(PlanError::EmptyMode {
      id,
      mode: mode.clone(),
    });
  }
  let anchor =
    Anchor::from_mode(mode, value).ok_or_else(|| PlanError::UnknownMode {
      id:   id.clone(),
      mode: mode.clone(),
    })?;

  match (marker.placement, &anchor) {
    (Placement::Link, Anchor::ReplaceExact(_))
    | (Placement::Thumb, _)
    | (Placement::Full, Anchor::AfterParagraph(_) | Anchor::BeforeParagraph(_)) => {},
    (Placement::Link, _) => return Err(PlanError::LinkNeedsReplace(id)),
    (Placement::Full, Anchor::ReplaceExact(_)) => {
      return Err(PlanError::FullForbidsReplace(id));
    },
  }

  Ok(Insert {
    marker,
    anchor,
    occurrence,
  })
}

fn parse_chapter(value: &Value) -> std::result::Result<ChapterPlan, PlanError> {
  let Value::Mapping(map) = value else {
    return Err(PlanError::ChapterNotMapping);
  };
  let draft_path = DRAFT_PATH_KEYS
    .iter()
    .find_map(|key| map.get(*key).and_then(scalar_string))
    .filter(|path| !path.is_empty())
    .ok_or(PlanError::MissingDraftPath)?;

  let inserts = match map.get("inserts") {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::Sequence(items)) => {
      items
        .iter()
        .map(|item| {
          parse_insert(item).map_err(|e| {
            match e {
              PlanError::InsertNotMapping(_) => {
                PlanError::InsertNotMapping(draft_path.clone())
              },
              other => other,
            }
          })
        })
        .collect::<std::result::Result<_, _>>()?
    },
    Some(_) => return Err(PlanError::InsertsNotList(draft_path)),
  };

  Ok(ChapterPlan {
    chapter: map
      .get("chapter")
      .and_then(scalar_string)
      .and_then(|s| s.parse().ok()),
    draft_path: PathBuf::from(draft_path),
    inserts,
  })
}

impl InsertPlan {
  /// Validate a parsed plan document.
  ///
  /// # Errors
  ///
  /// Returns the first problem found; a plan is used whole or not at all.
  pub fn from_value(value: &Value) -> std::result::Result<Self, PlanError> {
    let Value::Mapping(map) = value else {
      return Err(PlanError::NotMapping);
    };
    let chapters = match map.get("chapters") {
      Some(Value::Sequence(chapters)) => {
        chapters
          .iter()
          .map(parse_chapter)
          .collect::<std::result::Result<_, _>>()?
      },
      Some(_) => return Err(PlanError::ChaptersNotList),
      None => vec![parse_chapter(value)?],
    };
    Ok(Self { chapters })
  }

  /// Load and validate a plan file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file is missing, not YAML or not a valid plan.
  pub fn load(path: &Path) -> Result<Self> {
    let value = read_yaml(path)?;
    Self::from_value(&value).map_err(|source| {
      EditorialError::Plan {
        path: path.to_path_buf(),
        source,
      }
    })
  }
}

/// Split text into paragraphs and the blank-line runs between them.
/// Paragraphs sit at even indexes.
fn split_chunks(text: &str) -> Vec<String> {
  let mut chunks = Vec::new();
  let mut last = 0;
  for gap in PARAGRAPH_GAP_RE.find_iter(text) {
    chunks.push(text[last..gap.start()].to_string());
    chunks.push(gap.as_str().to_string());
    last = gap.end();
  }
  chunks.push(text[last..].to_string());
  chunks
}

/// Index of the paragraph `anchor` selects.
fn select_paragraph(
  chunks: &[String],
  anchor: &str,
  mode: &'static str,
  occurrence: Option<usize>,
) -> std::result::Result<usize, PlanError> {
  let matches: Vec<usize> = (0..chunks.len())
    .step_by(2)
    .filter(|&i| chunks[i].contains(anchor))
    .collect();

  if matches.is_empty() {
    return Err(PlanError::AnchorNotFound {
      mode,
      anchor: anchor.to_string(),
    });
  }
  match occurrence {
    None if matches.len() == 1 => Ok(matches[0]),
    None => {
      Err(PlanError::AmbiguousAnchor {
        mode,
        count: matches.len(),
        anchor: anchor.to_string(),
      })
    },
    Some(n) => {
      n.checked_sub(1)
        .and_then(|i| matches.get(i).copied())
        .ok_or_else(|| {
          PlanError::OccurrenceOutOfRange {
            occurrence: n,
            count:      matches.len(),
            anchor:     anchor.to_string(),
          }
        })
    },
  }
}

fn is_blank(c: char) -> bool {
  c == ' ' || c == '\t'
}

/// Append `marker` to the end of a paragraph, before trailing whitespace.
fn append_inline(paragraph: &str, marker: &str) -> String {
  let head = paragraph.trim_end();
  let tail = &paragraph[head.len()..];
  let joiner = if head.is_empty() || head.ends_with(is_blank) {
    ""
  } else {
    " "
  };
  format!("{head}{joiner}{marker}{tail}")
}

/// Prepend `marker` to a paragraph, after leading whitespace.
fn prepend_inline(paragraph: &str, marker: &str) -> String {
  let rest = paragraph.trim_start();
  let lead = &paragraph[..paragraph.len() - rest.len()];
  let joiner = if rest.is_empty() || rest.starts_with(is_blank) {
    ""
  } else {
    " "
  };
  format!("{lead}{marker}{joiner}{rest}")
}

impl Insert {
  /// Apply this insert to `text`.
  ///
  /// Returns `None` when a marker with the same id (in any case) is already
  /// present.
  ///
  /// # Errors
  ///
  /// Returns an error if the anchor matches no paragraph, several paragraphs
  /// without an occurrence, or replacement text not exactly once.
  pub fn apply(
    &self,
    text: &str,
  ) -> std::result::Result<Option<String>, PlanError> {
    if contains_marker_id(text, &self.marker.id) {
      log::debug!("Marker {} already present", self.marker.id);
      return Ok(None);
    }
    let marker = self.marker.to_comment();
    let full = self.marker.placement == Placement::Full;
    let mode = self.anchor.mode();

    let updated = match &self.anchor {
      Anchor::ReplaceExact(old) => {
        match text.matches(old.as_str()).count() {
          0 => return Err(PlanError::ReplaceNotFound(old.clone())),
          1 => text.replacen(old.as_str(), &marker, 1),
          count => {
            return Err(PlanError::ReplaceAmbiguous {
              count,
              text: old.clone(),
            });
          },
        }
      },
      Anchor::AfterParagraph(anchor) => {
        let mut chunks = split_chunks(text);
        let i = select_paragraph(&chunks, anchor, mode, self.occurrence)?;
        if !full {
          chunks[i] = append_inline(&chunks[i], &marker);
        } else if let Some(gap) = chunks.get(i + 1).cloned() {
          chunks.insert(i + 2, gap);
          chunks.insert(i + 2, marker);
        } else {
          chunks.extend([PARAGRAPH_GAP.to_string(), marker]);
        }
        chunks.concat()
      },
      Anchor::BeforeParagraph(anchor) => {
        let mut chunks = split_chunks(text);
        let i = select_paragraph(&chunks, anchor, mode, self.occurrence)?;
        if full {
          let gap = i
            .checked_sub(1)
            .map_or_else(|| PARAGRAPH_GAP.to_string(), |g| chunks[g].clone());
          chunks.insert(i, gap);
          chunks.insert(i, marker);
        } else {
          chunks[i] = prepend_inline(&chunks[i], &marker);
        }
        chunks.concat()
      },
    };
    Ok(Some(updated))
  }
}

/// Apply `inserts` in order. Returns the new text and how many inserts
/// changed it.
///
/// # Errors
///
/// Returns the first insert that cannot be placed.
pub fn apply_inserts(
  text: &str,
  inserts: &[Insert],
) -> std::result::Result<(String, usize), PlanError> {
  let mut current = text.to_string();
  let mut applied = 0;
  for insert in inserts {
    if let Some(updated) = insert.apply(&current)? {
      if updated != current {
        applied += 1;
      }
      current = updated;
    }
  }
  Ok((current, applied))
}

/// The effect of a plan on one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftChange {
  pub path:     PathBuf,
  pub original: String,
  pub updated:  String,
  pub applied:  usize,
}

impl DraftChange {
  #[must_use]
  pub fn is_changed(&self) -> bool {
    self.original != self.updated
  }
}

/// Apply the plan at `plan_path` to the drafts of the book at `root`.
///
/// Every draft is updated in memory first; with `write`, changed drafts are
/// then rewritten, ending with a newline. Nothing is written if any insert
/// fails.
///
/// # Errors
///
/// Returns an error if the plan is invalid, a draft is missing or an insert
/// cannot be placed.
pub fn run_plan(
  root: &Path,
  plan_path: &Path,
  write: bool,
) -> Result<Vec<DraftChange>> {
  let plan_path = resolve(root, plan_path);
  let plan = InsertPlan::load(&plan_path)?;

  let mut changes = Vec::with_capacity(plan.chapters.len());
  for chapter in &plan.chapters {
    let path = resolve(root, &chapter.draft_path);
    if !path.is_file() {
      return Err(EditorialError::NotFound(path));
    }
    let original = read_file(&path)?;
    let (updated, applied) = apply_inserts(&original, &chapter.inserts)
      .map_err(|source| {
        EditorialError::Insert {
          draft: path.clone(),
          source,
        }
      })?;
    log::info!(
      "{}: {applied} of {} inserts to apply",
      path.display(),
      chapter.inserts.len()
    );
    changes.push(DraftChange {
      path,
      original,
      updated,
      applied,
    });
  }

  if write {
    for change in changes.iter_mut().filter(|c| c.is_changed()) {
      if !change.updated.ends_with('\n') {
        change.updated.push('\n');
      }
      write_file(&change.path, &change.updated)?;
      log::info!("Wrote {}", change.path.display());
    }
  }
  Ok(changes)
}
