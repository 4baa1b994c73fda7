use std::{io, path::PathBuf};

use thiserror::Error;

/// A malformed insert plan, or an insert that cannot be placed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
  #[error("plan must be a YAML mapping at the top level")]
  NotMapping,

  #[error("plan.chapters must be a list")]
  ChaptersNotList,

  #[error("chapter entry must be a mapping")]
  ChapterNotMapping,

  #[error("chapter entry missing draft_path")]
  MissingDraftPath,

  #[error("inserts must be a list for draft {0}")]
  InsertsNotList(String),

  #[error("insert must be a mapping for draft {0}")]
  InsertNotMapping(String),

  #[error("insert.kind must be illust|diagram (got '{0}')")]
  InvalidKind(String),

  #[error("insert.type must be full|thumb|link (got '{0}')")]
  InvalidPlacement(String),

  #[error("insert.id must match [a-z0-9_-]+ (got '{0}')")]
  InvalidId(String),

  #[error("insert.text is required (caption/alt/link text) for id={0}")]
  EmptyText(String),

  #[error("insert.apply must be a mapping for id={0}")]
  ApplyNotMapping(String),

  #[error("insert.apply must contain exactly 1 mode key (got {modes:?}) for id={id}")]
  ModeCount { id: String, modes: Vec<String> },

  #[error("insert.apply.{mode} must be a non-empty string for id={id}")]
  EmptyMode { id: String, mode: String },

  #[error("unknown apply mode: '{mode}' for id={id}")]
  UnknownMode { id: String, mode: String },

  #[error("insert.apply.occurrence must be a positive integer for id={0}")]
  InvalidOccurrence(String),

  #[error("link inserts must use apply.replace_exact (id={0})")]
  LinkNeedsReplace(String),

  #[error("full inserts must not use apply.replace_exact (id={0})")]
  FullForbidsReplace(String),

  #[error("anchor not found for {mode}: '{anchor}'")]
  AnchorNotFound { mode: &'static str, anchor: String },

  #[error(
    "anchor matched {count} paragraphs for {mode}; add apply.occurrence to \
     disambiguate: '{anchor}'"
  )]
  AmbiguousAnchor {
    mode:   &'static str,
    count:  usize,
    anchor: String,
  },

  #[error("occurrence out of range: {occurrence} (matches: {count}) for '{anchor}'")]
  OccurrenceOutOfRange {
    occurrence: usize,
    count:      usize,
    anchor:     String,
  },

  #[error("replace_exact not found: '{0}'")]
  ReplaceNotFound(String),

  #[error("replace_exact matched {count} times (must be exactly 1): '{text}'")]
  ReplaceAmbiguous { count: usize, text: String },
}

/// Error type for quire-editorial operations
#[derive(Debug, Error)]
pub enum EditorialError {
  #[error("Not found: {0}")]
  NotFound(PathBuf),

  #[error("Failed to read {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

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

  #[error("Invalid plan {path}: {source}")]
  Plan {
    path:   PathBuf,
    #[source]
    source: PlanError,
  },

  #[error("{draft}: {source}")]
  Insert {
    draft:  PathBuf,
    #[source]
    source: PlanError,
  },

  #[error("Unknown role '{0}'")]
  UnknownRole(String),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditorialError>;
