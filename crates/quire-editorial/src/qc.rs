//! Translation QC: structural and token checks between a source draft and
//! its translation. Literary quality is out of scope; this catches the hard
//! failures (dropped protected tokens, paragraph drift, leftover
//! placeholders).
use std::{
  collections::BTreeSet,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use quire_config::book::scalar_string;
use quire_prose::{draft::strip_scaffolding, utils::compile};
use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;

use crate::{
  error::Result,
  files::{read_file, read_yaml},
};

/// Pipeline config used when none is given, relative to the book root.
pub const PIPELINE_PATH: &str = "agents/translation/translation-pipeline.yaml";

static TITLE_LINE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("TITLE_LINE", r"^# Chapter\s+(\d+):\s*(.+)$"));

static SINGLE_COMMENT_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("SINGLE_COMMENT", r"^\s*<!--.*-->\s*$"));

static TRAILING_RULE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("TRAILING_RULE", r"\n---\s*$"));

static PARAGRAPH_SPLIT_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("PARAGRAPH_SPLIT", r"\n\s*\n"));

static STAR_BREAK_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("STAR_BREAK", r"^\*\s*\*\s*\*$"));

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile(
    "PLACEHOLDER",
    r"(?:_{1,3}|\[\[|\[)\s*PROT\d{3}\s*(?:_{1,3}|\]\]|\])",
  )
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QcStats {
  pub src_blocks: usize,
  pub mt_blocks:  usize,
  pub src_chars:  usize,
  pub mt_chars:   usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QcReport {
  pub ok:     bool,
  pub issues: Vec<String>,
  pub stats:  QcStats,
}

/// Prose of a translation: title lines and single-line comments removed.
#[must_use]
pub fn translation_prose(content: &str) -> String {
  let kept: Vec<&str> = content
    .lines()
    .filter(|line| {
      !TITLE_LINE_RE.is_match(line) && !SINGLE_COMMENT_RE.is_match(line)
    })
    .collect();
  TRAILING_RULE_RE
    .replace(kept.join("\n").trim(), "")
    .into_owned()
}

/// Non-blank paragraphs, right-trimmed.
#[must_use]
pub fn split_paragraphs(prose: &str) -> Vec<String> {
  PARAGRAPH_SPLIT_RE
    .split(prose)
    .map(str::trim_end)
    .filter(|p| !p.trim().is_empty())
    .map(str::to_string)
    .collect()
}

fn is_scene_break(block: &str) -> bool {
  let block = block.trim();
  block == "---" || STAR_BREAK_RE.is_match(block)
}

fn is_ascii_word(token: &str) -> bool {
  !token.is_empty()
    && token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_word_byte(b: u8) -> bool {
  b.is_ascii_alphanumeric() || b == b'_'
}

/// Whether `token` occurs in `text`. ASCII word tokens need ASCII word
/// boundaries, so `Kael` counts inside `Kael把` but not inside `Kaela`.
#[must_use]
pub fn contains_token(text: &str, token: &str) -> bool {
  if !is_ascii_word(token) {
    return text.contains(token);
  }
  let bytes = text.as_bytes();
  text.match_indices(token).any(|(start, _)| {
    let end = start + token.len();
    let before = start.checked_sub(1).map(|i| bytes[i]);
    let after = bytes.get(end).copied();
    !before.is_some_and(is_word_byte) && !after.is_some_and(is_word_byte)
  })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
  value
    .and_then(Value::as_sequence)
    .map(|items| items.iter().filter_map(scalar_string).collect())
    .unwrap_or_default()
}

/// Protected tokens from a pipeline config, longest first.
///
/// `protected.tokens` are taken as is. With
/// `protected.include_entities_registry`, the `entity_tokens` are added.
/// Every `protected.italic_terms` entry is protected both bare and as
/// `*term*`.
#[must_use]
pub fn protected_tokens(config: &Value, entity_tokens: &[String]) -> Vec<String> {
  let protected = config.get("protected");
  let field = |key: &str| protected.and_then(|p| p.get(key));

  let mut tokens: BTreeSet<String> =
    string_list(field("tokens")).into_iter().collect();
  if field("include_entities_registry").and_then(Value::as_bool) == Some(true) {
    tokens.extend(entity_tokens.iter().cloned());
  }
  for term in string_list(field("italic_terms")) {
    tokens.insert(format!("*{term}*"));
    tokens.insert(term);
  }

  let mut tokens: Vec<String> =
    tokens.into_iter().filter(|t| !t.is_empty()).collect();
  tokens.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
  tokens
}

/// Compare source and translated paragraphs.
#[must_use]
pub fn check_translation(
  src_blocks: &[String],
  mt_blocks: &[String],
  tokens: &[String],
) -> QcReport {
  let mut issues = Vec::new();

  if src_blocks.len() != mt_blocks.len() {
    issues.push(format!(
      "[STRUCTURE] Paragraph count mismatch: src={} mt={}",
      src_blocks.len(),
      mt_blocks.len()
    ));
  }
  for (i, (src, mt)) in src_blocks.iter().zip(mt_blocks).enumerate() {
    if is_scene_break(src) != is_scene_break(mt) {
      issues.push(format!("[STRUCTURE] Scene-break mismatch at block {}", i + 1));
    }
  }

  let src_all = src_blocks.join("\n\n");
  let mt_all = mt_blocks.join("\n\n");
  for token in tokens {
    if contains_token(&src_all, token) && !contains_token(&mt_all, token) {
      issues.push(format!("[TOKENS] Missing protected token in MT: '{token}'"));
    }
  }
  if PLACEHOLDER_RE.is_match(&mt_all) {
    issues.push(
      "[TOKENS] Placeholder(s) found in MT output (PROT placeholder left \
       behind)."
        .to_string(),
    );
  }

  QcReport {
    ok: issues.is_empty(),
    issues,
    stats: QcStats {
      src_blocks: src_blocks.len(),
      mt_blocks:  mt_blocks.len(),
      src_chars:  src_all.chars().count(),
      mt_chars:   mt_all.chars().count(),
    },
  }
}

/// Inputs of a QC run.
#[derive(Debug, Clone)]
pub struct QcInputs {
  pub source:      PathBuf,
  pub translation: PathBuf,
  pub pipeline:    PathBuf,
}

/// Run QC on files, with tokens from the pipeline config and, when it asks
/// for them, the entity registry of the book at `root`.
///
/// # Errors
///
/// Returns an error if an input file is missing or the config is not YAML.
pub fn run_qc(root: &Path, inputs: &QcInputs) -> Result<QcReport> {
  let config = read_yaml(&inputs.pipeline)?;

  let entities = root.join(quire_storyos::assemble::ENTITIES_PATH);
  let entity_tokens = if entities.is_file() {
    read_yaml(&entities)
      .map(|value| string_list(value.get("do_not_translate_tokens")))
      .unwrap_or_else(|e| {
        log::warn!("Ignoring entity registry: {e}");
        Vec::new()
      })
  } else {
    Vec::new()
  };
  let tokens = protected_tokens(&config, &entity_tokens);
  log::debug!("{} protected tokens", tokens.len());

  let source = strip_scaffolding(&read_file(&inputs.source)?, false);
  let translation = translation_prose(&read_file(&inputs.translation)?);
  Ok(check_translation(
    &split_paragraphs(&source),
    &split_paragraphs(&translation),
    &tokens,
  ))
}
