//! Book metadata tooling for quire.
//!
//! This crate reads the planning documents of a book (the chapter outline,
//! the StoryOS schema files and the review logs) and produces:
//!
//! - chapter cards (`schema/chapter-cards.yaml`), see [`cards`];
//! - baseline visual prompts, see [`prompts`];
//! - the StoryOS aggregate (`meta/storyos.json`) and its markdown dashboard
//!   (`meta/storyos.md`), see [`build`].
pub mod assemble;
pub mod cards;
pub mod error;
pub mod files;
pub mod markdown;
pub mod mermaid;
pub mod outline;
pub mod prompts;
pub mod sources;
pub mod validate;
pub mod value;
pub mod world;

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use quire_config::ToolConfig;

pub use crate::{
  assemble::{StorySources, Supplements, assemble},
  error::{Result, StoryOsError},
  markdown::render_markdown,
  validate::validate,
  world::World,
};
use crate::{
  files::{read_optional, write_text},
  sources::{
    ARCS_PATH,
    CONTINUITY_PATH,
    GRAPH_PATH,
    REVISION_PATH,
    build_docs_index,
    count_drafted,
    parse_arcs_table,
    parse_butterfly_graph,
    parse_continuity_log,
    parse_revision_queue,
  },
};

pub const JSON_PATH: &str = "meta/storyos.json";
pub const MARKDOWN_PATH: &str = "meta/storyos.md";

/// What a StoryOS build produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoryOsReport {
  /// Validation problems. A build writes its outputs regardless.
  pub errors:   Vec<String>,
  pub written:  Vec<PathBuf>,
  pub chapters: usize,
  pub docs:     usize,
  pub drafted:  usize,
}

/// Validate the sources of the book at `root` without writing anything.
///
/// # Errors
///
/// Returns an error if a source exists but cannot be read or parsed.
pub fn check(root: &Path, config: &ToolConfig) -> Result<Vec<String>> {
  let sources = StorySources::load(root)?;
  Ok(validate(root, &sources, config.total_chapters))
}

/// Read every markdown source of the book at `root`.
///
/// # Errors
///
/// Returns an error if a source exists but cannot be read.
pub fn gather_supplements(
  root: &Path,
  config: &ToolConfig,
) -> Result<Supplements> {
  let read = |rel: &str| read_optional(&root.join(rel));
  Ok(Supplements {
    graph:      read(GRAPH_PATH)?
      .map(|text| parse_butterfly_graph(&text))
      .unwrap_or_default(),
    continuity: read(CONTINUITY_PATH)?
      .map(|text| parse_continuity_log(&text))
      .unwrap_or_default(),
    revision:   read(REVISION_PATH)?
      .map(|text| parse_revision_queue(&text))
      .unwrap_or_default(),
    drafted:    count_drafted(&root.join(&config.manuscript_dir)),
    docs:       build_docs_index(root),
  })
}

/// Validate, aggregate and write `meta/storyos.json` and `meta/storyos.md`.
///
/// # Errors
///
/// Returns an error if a source cannot be read or parsed, or an output
/// cannot be written. Validation problems are reported, not returned as
/// errors.
pub fn build(root: &Path, config: &ToolConfig) -> Result<StoryOsReport> {
  let sources = StorySources::load(root)?;
  let errors = validate(root, &sources, config.total_chapters);
  for error in &errors {
    log::warn!("{error}");
  }

  if let Some(text) = read_optional(&root.join(ARCS_PATH))? {
    validate::cross_check_arcs(&sources, &parse_arcs_table(&text));
  }

  let supplements = gather_supplements(root, config)?;
  let payload = assemble(
    &sources,
    &supplements,
    config.total_chapters,
    &Timestamp::now().to_string(),
  )?;

  let json = format!("{}\n", serde_json::to_string_pretty(&payload)?);
  let written = vec![
    write_text(&root.join(JSON_PATH), &json)?,
    write_text(&root.join(MARKDOWN_PATH), &render_markdown(&payload))?,
  ];

  log::info!(
    "{} chapters, {} docs indexed, {} HTML files",
    sources.cards.len(),
    supplements.docs.len(),
    supplements.drafted
  );
  Ok(StoryOsReport {
    errors,
    written,
    chapters: sources.cards.len(),
    docs: supplements.docs.len(),
    drafted: supplements.drafted,
  })
}
