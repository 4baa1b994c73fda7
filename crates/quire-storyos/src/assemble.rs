//! Loading the StoryOS sources and assembling the aggregate document.
use std::path::Path;

use quire_config::BookConfig;
use serde_json::{Map, Value, json};

use crate::{
  error::Result,
  files::read_yaml,
  mermaid,
  sources::{ButterflyGraph, ContinuityLog, DocEntry, RevisionQueue},
  value::items,
};

pub const STORYOS_PATH: &str = "schema/storyos.yaml";
pub const ENTITIES_PATH: &str = "schema/entities.yaml";

/// The hand-maintained YAML sources.
#[derive(Debug, Clone)]
pub struct StorySources {
  /// `schema/storyos.yaml`; `null` when missing.
  pub storyos:  Value,
  /// `schema/entities.yaml`; `null` when missing.
  pub entities: Value,
  /// The `chapters` of `schema/chapter-cards.yaml`.
  pub cards:    Vec<Value>,
  pub book:     BookConfig,
}

impl StorySources {
  /// Load the sources of the book at `root`. Missing files give empty values.
  ///
  /// # Errors
  ///
  /// Returns an error if a file exists but cannot be read or parsed.
  pub fn load(root: &Path) -> Result<Self> {
    let cards = read_yaml(&root.join(crate::cards::CARDS_PATH))?;
    Ok(Self {
      storyos:  read_yaml(&root.join(STORYOS_PATH))?,
      entities: read_yaml(&root.join(ENTITIES_PATH))?,
      cards:    items(&cards, "chapters").to_vec(),
      book:     BookConfig::load(root),
    })
  }

  /// `storyos[key]`, or an empty array.
  #[must_use]
  pub fn list(&self, key: &str) -> Value {
    self
      .storyos
      .get(key)
      .cloned()
      .unwrap_or_else(|| Value::Array(Vec::new()))
  }
}

/// Values derived from the markdown sources and the filesystem.
#[derive(Debug, Clone, Default)]
pub struct Supplements {
  pub graph:      ButterflyGraph,
  pub continuity: ContinuityLog,
  pub revision:   RevisionQueue,
  pub drafted:    usize,
  pub docs:       Vec<DocEntry>,
}

/// `storyos.book`, with title and subtitle filled from `book.yaml` when
/// absent.
fn book_section(sources: &StorySources) -> Value {
  let mut book = match sources.storyos.get("book") {
    Some(Value::Object(book)) => book.clone(),
    _ => Map::new(),
  };
  book
    .entry("title")
    .or_insert_with(|| Value::String(sources.book.title.clone()));
  book
    .entry("subtitle")
    .or_insert_with(|| Value::String(sources.book.subtitle.clone()));
  Value::Object(book)
}

/// Assemble the aggregate document. Keys keep the order written here.
///
/// # Errors
///
/// Returns an error if a supplement cannot be converted to JSON.
pub fn assemble(
  sources: &StorySources,
  supplements: &Supplements,
  total_chapters: u32,
  generated_at: &str,
) -> Result<Value> {
  let arcs = sources.list("arcs");
  let arc_map = mermaid::arc_map(
    arcs.as_array().map_or(&[][..], Vec::as_slice),
    &sources.cards,
  );

  Ok(json!({
    "generated_at": generated_at,
    "meta": sources.storyos.get("meta").cloned().unwrap_or_else(|| json!({})),
    "book": book_section(sources),
    "arcs": arcs,
    "threads": sources.list("threads"),
    "promises": sources.list("promises"),
    "continuity_promises": serde_json::to_value(&supplements.continuity.promises)?,
    "dashboard_pins": sources.list("dashboard_pins"),
    "stats": {
      "total_chapters": total_chapters,
      "chapters_drafted": supplements.drafted,
      "chapters_with_html": supplements.drafted,
      "continuity_chapters_logged": supplements.continuity.chapters_logged,
      "revision_queue_open": supplements.revision.open,
      "revision_queue_closed": supplements.revision.closed,
    },
    "entities": sources.entities.get("entities").cloned().unwrap_or_else(|| json!({})),
    "do_not_translate_tokens": sources
      .entities
      .get("do_not_translate_tokens")
      .cloned()
      .unwrap_or_else(|| json!([])),
    "chapters": sources.cards,
    "butterfly_graph": serde_json::to_value(&supplements.graph)?,
    "docs_index": serde_json::to_value(&supplements.docs)?,
    "mermaid": {
      "pipeline": mermaid::pipeline(),
      "arc_map": arc_map,
      "butterfly": mermaid::butterfly(&supplements.graph),
    },
  }))
}
