//! Readers for the book's markdown sources: arc table, butterfly graph,
//! continuity log, revision queue, drafted chapters and the docs index.
//!
//! Every reader takes text (or a root) and degrades to an empty value when
//! its source is missing.
use std::{
  collections::BTreeMap,
  fs,
  path::{Component, Path},
  sync::LazyLock,
};

use jiff::Timestamp;
use quire_prose::utils::compile;
use regex::Regex;
use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

pub const ARCS_PATH: &str = "outline/ARCS.md";
pub const GRAPH_PATH: &str = "outline/BUTTERFLY_GRAPH.md";
pub const CONTINUITY_PATH: &str = "review/continuity-log.md";
pub const REVISION_PATH: &str = "review/revision-queue.md";

/// Directories left out of the docs index, at any depth.
const DOCS_SKIP_DIRS: [&str; 4] = ["manuscript", "meta", "translations", ".venv"];

/// Top-level directories that name a docs category; anything else is `root`.
const DOCS_CATEGORIES: [&str; 8] = [
  "bible",
  "outline",
  "review",
  "style",
  "schema",
  "agents",
  "translations",
  "assets",
];

const CROSS_CHAPTER_HEADING: &str = "## Cross-Chapter";
const SYNOPSIS_CHARS: usize = 120;

static ARC_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile(
    "ARC_ROW",
    r"\|\s*(\d+)\s*\|\s*(.+?)\s*\|\s*(\d+)\s*[–-]\s*(\d+)\s*\|",
  )
});

static CHAIN_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("CHAIN", r"(?m)^## Chain ([A-Z]):\s*(.+)$"));

static FENCE_BODY_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("FENCE_BODY", r"(?s)```\n(.*?)```"));

static FENCED_BLOCK_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("FENCED_BLOCK", r"(?s)```.*?```"));

static GRAPH_NODE_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile("GRAPH_NODE", r"\[(\d+\.\d+|BACKSTORY[^\]]*)\]\s*(.+?)\s*$")
});

static DEPENDENCY_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile("DEPENDENCY_ROW", r"\|\s*(\d+\.\d+)\s*\|\s*(.+?)\s*\|\s*(.+?)\s*\|")
});

static LOG_CHAPTER_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("LOG_CHAPTER", r"(?m)^### Chapter \d+"));

static LOG_SECTION_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("LOG_SECTION", r"### Chapter (\d+)"));

static LIST_BULLET_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("LIST_BULLET", r"^[-*+]\s+"));

static OPEN_ITEM_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("OPEN_ITEM", r"(?m)^- \[ \]"));

static CLOSED_ITEM_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("CLOSED_ITEM", r"(?mi)^- \[x\]"));

static MD_INLINE_RES: LazyLock<[Regex; 6]> = LazyLock::new(|| {
  [
    compile("MD_STRONG", r"\*\*(.+?)\*\*"),
    compile("MD_EM", r"\*(.+?)\*"),
    compile("MD_STRONG_UNDERSCORE", r"__(.+?)__"),
    compile("MD_EM_UNDERSCORE", r"_(.+?)_"),
    compile("MD_LINK", r"\[([^\]]+)\]\([^)]+\)"),
    compile("MD_CODE", r"`([^`]+)`"),
  ]
});

/// A row of the arc table in `outline/ARCS.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArcRow {
  pub id:    u32,
  pub title: String,
  pub lo:    u32,
  pub hi:    u32,
}

/// Rows `| id | title | lo–hi |` of the arc table.
#[must_use]
pub fn parse_arcs_table(text: &str) -> Vec<ArcRow> {
  ARC_ROW_RE
    .captures_iter(text)
    .filter_map(|caps| {
      Some(ArcRow {
        id:    caps[1].parse().ok()?,
        title: caps[2].trim().to_string(),
        lo:    caps[3].parse().ok()?,
        hi:    caps[4].parse().ok()?,
      })
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
  pub id:    String,
  pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
  pub from: String,
  pub to:   String,
}

/// One causal chain of the butterfly graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Chain {
  pub title: String,
  pub nodes: Vec<GraphNode>,
  pub edges: Vec<GraphEdge>,
}

/// A row of the cross-chapter dependency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
  pub chapter:    String,
  pub depends_on: String,
  pub feeds_into: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ButterflyGraph {
  /// Chains keyed by their letter.
  pub chains:            BTreeMap<String, Chain>,
  pub dependency_matrix: Vec<Dependency>,
}

/// Nodes and edges from the fenced blocks of one chain section.
///
/// Within a block, a node on a line containing `→` is linked from the
/// previous node of the same block.
fn parse_chain_block(block: &str, chain: &mut Chain) {
  for fence in FENCE_BODY_RE.captures_iter(block) {
    let mut previous: Option<String> = None;
    for line in fence[1].trim().lines() {
      let Some(caps) = GRAPH_NODE_RE.captures(line) else {
        continue;
      };
      let id = caps[1].trim().to_string();
      if let Some(from) = previous.as_ref().filter(|_| line.contains('→')) {
        chain.edges.push(GraphEdge {
          from: from.clone(),
          to:   id.clone(),
        });
      }
      chain.nodes.push(GraphNode {
        id:    id.clone(),
        label: caps[2].trim().to_string(),
      });
      previous = Some(id);
    }
  }
}

/// Parse `outline/BUTTERFLY_GRAPH.md`.
///
/// Chains are `## Chain X: title` sections; the last one ends at the
/// `## Cross-Chapter` heading, whose table gives the dependency matrix.
#[must_use]
pub fn parse_butterfly_graph(text: &str) -> ButterflyGraph {
  let mut graph = ButterflyGraph::default();
  let cross = text.find(CROSS_CHAPTER_HEADING);

  let heads: Vec<_> = CHAIN_RE.captures_iter(text).collect();
  for (i, caps) in heads.iter().enumerate() {
    let Some(whole) = caps.get(0) else { continue };
    let start = whole.end();
    let end = heads
      .get(i + 1)
      .and_then(|next| next.get(0))
      .map(|m| m.start())
      .or(cross)
      .unwrap_or(text.len());

    let mut chain = Chain {
      title: caps[2].trim().to_string(),
      ..Chain::default()
    };
    if end > start {
      parse_chain_block(&text[start..end], &mut chain);
    }
    graph.chains.insert(caps[1].to_string(), chain);
  }

  if let Some(cross) = cross {
    graph.dependency_matrix = DEPENDENCY_ROW_RE
      .captures_iter(&text[cross..])
      .filter(|caps| {
        let depends = caps[2].trim();
        !depends.starts_with("Depends") && !depends.starts_with("---")
      })
      .map(|caps| {
        Dependency {
          chapter:    caps[1].trim().to_string(),
          depends_on: caps[2].trim().to_string(),
          feeds_into: caps[3].trim().to_string(),
        }
      })
      .collect();
  }
  graph
}

/// A reader question raised by a chapter, from the continuity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedPromise {
  pub chapter:  u32,
  pub question: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContinuityLog {
  pub chapters_logged: usize,
  pub promises:        Vec<LoggedPromise>,
}

/// Questions listed after the promises label of one log section.
fn section_promises(chapter: u32, section: &str) -> Vec<LoggedPromise> {
  const LABEL: &str = "**Promises to reader:**";
  let Some(at) = section.find(LABEL) else {
    return Vec::new();
  };
  let rest = &section[at + LABEL.len()..];
  let rest = rest.find("\n---").map_or(rest, |end| &rest[..end]);

  rest
    .trim()
    .lines()
    .map(str::trim)
    .take_while(|line| !line.is_empty() && !line.starts_with("---"))
    .map(|line| {
      LIST_BULLET_RE
        .replace(line, "")
        .replace(['*', '_'], "")
        .trim()
        .to_string()
    })
    .filter(|question| !question.is_empty())
    .map(|question| LoggedPromise { chapter, question })
    .collect()
}

/// Parse `review/continuity-log.md`: logged chapter count and reader
/// promises per chapter section.
#[must_use]
pub fn parse_continuity_log(text: &str) -> ContinuityLog {
  let heads: Vec<_> = LOG_SECTION_RE.captures_iter(text).collect();
  let promises = heads
    .iter()
    .enumerate()
    .filter_map(|(i, caps)| {
      let start = caps.get(0)?.end();
      let end = heads
        .get(i + 1)
        .and_then(|next| next.get(0))
        .map_or(text.len(), |m| m.start());
      let chapter = caps[1].parse().ok()?;
      Some(section_promises(chapter, &text[start..end]))
    })
    .flatten()
    .collect();

  ContinuityLog {
    chapters_logged: LOG_CHAPTER_RE.find_iter(text).count(),
    promises,
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RevisionQueue {
  pub open:   usize,
  pub closed: usize,
}

/// Count open and closed checklist items outside fenced code.
#[must_use]
pub fn parse_revision_queue(text: &str) -> RevisionQueue {
  let text = FENCED_BLOCK_RE.replace_all(text, "");
  RevisionQueue {
    open:   OPEN_ITEM_RE.find_iter(&text).count(),
    closed: CLOSED_ITEM_RE.find_iter(&text).count(),
  }
}

/// Number of rendered chapter pages under the manuscript directory.
#[must_use]
pub fn count_drafted(manuscript: &Path) -> usize {
  WalkDir::new(manuscript)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| {
      entry.file_type().is_file()
        && entry.path().extension().is_some_and(|ext| ext == "html")
    })
    .count()
}

/// A markdown document of the book, for the docs index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocEntry {
  pub category:  String,
  /// File stem.
  pub name:      String,
  /// Path relative to the book root, `/`-separated.
  pub path:      String,
  pub mtime_iso: String,
  pub synopsis:  String,
  pub content:   String,
}

/// Remove emphasis, code and link markup from a line.
#[must_use]
pub fn strip_md_inline(text: &str) -> String {
  let mut text = text.to_string();
  for re in MD_INLINE_RES.iter() {
    text = re.replace_all(&text, "$1").into_owned();
  }
  text.trim().to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
  text.chars().take(max).collect()
}

/// First line that is not blank, a heading, a rule or a fence. Blockquotes
/// give their content.
#[must_use]
pub fn first_meaningful_line(content: &str) -> String {
  for line in content.lines() {
    let line = line.trim();
    if line.is_empty()
      || line.starts_with('#')
      || line.starts_with("---")
      || line.starts_with("```")
    {
      continue;
    }
    let line = if line.starts_with('>') {
      line.trim_start_matches(['>', ' ']).trim()
    } else {
      line
    };
    return truncate_chars(&strip_md_inline(line), SYNOPSIS_CHARS);
  }
  String::new()
}

fn category_of(rel: &Path) -> String {
  let first = rel
    .components()
    .next()
    .and_then(|c| {
      match c {
        Component::Normal(name) => name.to_str(),
        _ => None,
      }
    })
    .unwrap_or_default();
  if rel.components().count() > 1 && DOCS_CATEGORIES.contains(&first) {
    first.to_string()
  } else {
    "root".to_string()
  }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
  if entry.depth() == 0 || !entry.file_type().is_dir() {
    return false;
  }
  let name = entry.file_name().to_string_lossy();
  name.starts_with('.') || DOCS_SKIP_DIRS.contains(&&*name)
}

fn mtime_iso(entry: &DirEntry) -> String {
  entry
    .metadata()
    .ok()
    .and_then(|meta| meta.modified().ok())
    .and_then(|time| Timestamp::try_from(time).ok())
    .map(|ts| ts.to_string())
    .unwrap_or_default()
}

/// Index every markdown file under `root`, sorted by path.
#[must_use]
pub fn build_docs_index(root: &Path) -> Vec<DocEntry> {
  let mut docs: Vec<DocEntry> = WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| !is_skipped_dir(entry))
    .filter_map(|entry| {
      entry
        .map_err(|e| log::warn!("Skipping unreadable entry: {e}"))
        .ok()
    })
    .filter(|entry| {
      entry.file_type().is_file()
        && entry.path().extension().is_some_and(|ext| ext == "md")
    })
    .filter_map(|entry| {
      let rel = entry.path().strip_prefix(root).ok()?;
      let content = fs::read(entry.path())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_else(|e| {
          log::warn!("Failed to read {}: {e}", entry.path().display());
          String::new()
        });
      Some(DocEntry {
        category: category_of(rel),
        name: entry
          .path()
          .file_stem()
          .map(|s| s.to_string_lossy().into_owned())
          .unwrap_or_default(),
        path: rel
          .components()
          .map(|c| c.as_os_str().to_string_lossy())
          .collect::<Vec<_>>()
          .join("/"),
        mtime_iso: mtime_iso(&entry),
        synopsis: first_meaningful_line(&content),
        content,
      })
    })
    .collect();
  docs.sort_by(|a, b| a.path.cmp(&b.path));
  log::debug!("Indexed {} documents", docs.len());
  docs
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn arc_rows_accept_both_dashes() {
    let rows = parse_arcs_table(
      "| Arc | Title | Chapters |\n|---|---|---|\n| 1 | The Silence | 1–6 \
       |\n| 2 | The Signal | 7-12 |\n",
    );
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, "The Silence");
    assert_eq!((rows[1].lo, rows[1].hi), (7, 12));
  }

  #[test]
  fn continuity_promises_stop_at_blank_line() {
    let log = parse_continuity_log(
      "### Chapter 1\n\n**Promises to reader:**\n- Who rang the *bell*?\n- \
       Why now?\n\nNotes here.\n\n---\n\n### Chapter 2\n\nNothing.\n",
    );
    assert_eq!(log.chapters_logged, 2);
    assert_eq!(log.promises, vec![
      LoggedPromise {
        chapter:  1,
        question: "Who rang the bell?".to_string(),
      },
      LoggedPromise {
        chapter:  1,
        question: "Why now?".to_string(),
      },
    ]);
  }

  #[test]
  fn revision_items_in_fences_are_ignored() {
    let queue = parse_revision_queue(
      "- [ ] fix ch3\n- [X] fix ch1\n- [x] fix ch2\n```\n- [ ] template\n```\n",
    );
    assert_eq!(queue, RevisionQueue { open: 1, closed: 2 });
  }

  #[test]
  fn synopsis_skips_scaffolding() {
    assert_eq!(
      first_meaningful_line("# Title\n\n---\n```\n> The **first** [line](x.md)\n"),
      "The first line"
    );
    assert_eq!(first_meaningful_line("# Only a heading\n"), "");
    let long = "a".repeat(200);
    assert_eq!(first_meaningful_line(&long).len(), SYNOPSIS_CHARS);
  }

  #[test]
  fn categories_come_from_top_directory() {
    assert_eq!(category_of(Path::new("bible/WORLD.md")), "bible");
    assert_eq!(category_of(Path::new("notes/x.md")), "root");
    assert_eq!(category_of(Path::new("README.md")), "root");
  }
}
