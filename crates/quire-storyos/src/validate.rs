//! Consistency checks over the StoryOS sources.
use std::path::Path;

use crate::{
  assemble::{ENTITIES_PATH, STORYOS_PATH, StorySources},
  cards::CARDS_PATH,
  sources::ArcRow,
  value::{chapter_range, int_field, items, text_field},
};

/// Files a StoryOS build reads and cannot do without.
pub const REQUIRED_FILES: [&str; 4] =
  [STORYOS_PATH, ENTITIES_PATH, CARDS_PATH, "book.yaml"];

const THREAD_STATUSES: [&str; 3] = ["open", "closed", "dormant"];
const PROMISE_STATUSES: [&str; 2] = ["open", "closed"];

/// Every problem found, as a human-readable message. Empty means valid.
#[must_use]
pub fn validate(
  root: &Path,
  sources: &StorySources,
  total_chapters: u32,
) -> Vec<String> {
  let mut errors = Vec::new();
  let storyos = &sources.storyos;

  for key in ["meta", "book", "arcs"] {
    if storyos.get(key).is_none() {
      errors.push(format!("storyos.yaml: missing '{key}' key"));
    }
  }

  let ranges: Vec<(i64, i64)> = items(storyos, "arcs")
    .iter()
    .filter_map(chapter_range)
    .collect();
  for chapter in 1..=i64::from(total_chapters) {
    match ranges
      .iter()
      .filter(|(lo, hi)| (*lo..=*hi).contains(&chapter))
      .count()
    {
      1 => {},
      0 => {
        errors.push(format!(
          "Chapter {chapter} not covered by any arc in storyos.yaml"
        ));
      },
      n => {
        errors.push(format!(
          "Chapter {chapter} covered by {n} arcs in storyos.yaml"
        ));
      },
    }
  }

  if sources.cards.len() != total_chapters as usize {
    errors.push(format!(
      "Expected {total_chapters} chapters in chapter-cards.yaml, found {}",
      sources.cards.len()
    ));
  }

  for thread in items(storyos, "threads") {
    let status = text_field(thread, "status");
    if !THREAD_STATUSES.contains(&status.as_str()) {
      errors.push(format!(
        "Thread '{}' has invalid status: {status}",
        text_field(thread, "id")
      ));
    }
  }

  for promise in items(storyos, "promises") {
    let status = text_field(promise, "status");
    if !PROMISE_STATUSES.contains(&status.as_str()) {
      errors.push(format!(
        "Promise '{}' has invalid status: {status}",
        text_field(promise, "id")
      ));
    }
  }

  for file in REQUIRED_FILES {
    if !root.join(file).exists() {
      errors.push(format!("Required file missing: {file}"));
    }
  }

  errors
}

/// Warn about arcs whose title or range in `storyos.yaml` disagrees with the
/// outline's arc table. Returns the number of disagreements.
pub fn cross_check_arcs(sources: &StorySources, rows: &[ArcRow]) -> usize {
  let mut mismatches = 0;
  for arc in items(&sources.storyos, "arcs") {
    let Some(id) = int_field(arc, "id") else {
      continue;
    };
    let Some(row) = rows.iter().find(|row| i64::from(row.id) == id) else {
      continue;
    };
    let range = chapter_range(arc);
    if range != Some((i64::from(row.lo), i64::from(row.hi))) {
      log::warn!(
        "Arc {id}: chapter range {range:?} in storyos.yaml differs from \
         {}–{} in the outline",
        row.lo,
        row.hi
      );
      mismatches += 1;
    }
    let title = text_field(arc, "title");
    if title != row.title {
      log::warn!(
        "Arc {id}: title '{title}' in storyos.yaml differs from '{}' in the \
         outline",
        row.title
      );
      mismatches += 1;
    }
  }
  mismatches
}

#[cfg(test)]
mod tests {
  use quire_config::BookConfig;
  use serde_json::{Value, json};

  use super::*;

  fn sources(storyos: Value, cards: usize) -> StorySources {
    StorySources {
      storyos,
      entities: Value::Null,
      cards: vec![json!({}); cards],
      book: BookConfig::default(),
    }
  }

  #[test]
  fn reports_gaps_and_bad_statuses() {
    let sources = sources(
      json!({
        "meta": {},
        "book": {},
        "arcs": [{"id": 1, "chapter_range": [1, 2]}],
        "threads": [{"id": "bells", "status": "stalled"}],
        "promises": [{"id": "who", "status": "dormant"}],
      }),
      2,
    );
    let errors = validate(Path::new("/nonexistent"), &sources, 3);
    assert_eq!(errors, vec![
      "Chapter 3 not covered by any arc in storyos.yaml",
      "Expected 3 chapters in chapter-cards.yaml, found 2",
      "Thread 'bells' has invalid status: stalled",
      "Promise 'who' has invalid status: dormant",
      "Required file missing: schema/storyos.yaml",
      "Required file missing: schema/entities.yaml",
      "Required file missing: schema/chapter-cards.yaml",
      "Required file missing: book.yaml",
    ]);
  }

  #[test]
  fn overlapping_arcs_are_reported() {
    let sources = sources(
      json!({"arcs": [
        {"id": 1, "chapter_range": [1, 3]},
        {"id": 2, "chapter_range": [2, 3]},
      ]}),
      3,
    );
    let errors = validate(Path::new("/nonexistent"), &sources, 3);
    let coverage: Vec<_> =
      errors.iter().filter(|e| e.starts_with("Chapter")).collect();
    assert_eq!(coverage, [
      "Chapter 2 covered by 2 arcs in storyos.yaml",
      "Chapter 3 covered by 2 arcs in storyos.yaml",
    ]);
  }

  #[test]
  fn missing_top_level_keys() {
    let errors = validate(Path::new("/nonexistent"), &sources(Value::Null, 0), 0);
    assert_eq!(&errors[..3], [
      "storyos.yaml: missing 'meta' key",
      "storyos.yaml: missing 'book' key",
      "storyos.yaml: missing 'arcs' key",
    ]);
  }

  #[test]
  fn arc_table_disagreements_are_counted() {
    let sources = sources(
      json!({"arcs": [
        {"id": 1, "title": "Silence", "chapter_range": [1, 6]},
        {"id": 2, "title": "Signal", "chapter_range": [7, 11]},
      ]}),
      0,
    );
    let rows = [
      ArcRow { id: 1, title: "Silence".to_string(), lo: 1, hi: 6 },
      ArcRow { id: 2, title: "The Signal".to_string(), lo: 7, hi: 12 },
    ];
    assert_eq!(cross_check_arcs(&sources, &rows), 2);
  }
}
