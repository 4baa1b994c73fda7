//! Draft parsing: title, metadata and scaffolding removal.
use std::{fs, io, path::Path, sync::LazyLock};

use regex::Regex;

use crate::{
  types::{ChapterDraft, DraftMeta},
  utils::compile,
};

static TITLE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("TITLE", r"(?m)^# Chapter (\d+):[ \t]*(.+?)[ \t\r]*$"));

static TITLE_LINE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("TITLE_LINE", r"^# Chapter \d+:"));

static META_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile(
    "META",
    r"<!--\s*Arc:\s*(\d+)\s*\|\s*POV:\s*(.+?)\s*\|\s*Location:\s*(.+?)\s*\|\s*Timeline:\s*(.+?)\s*-->",
  )
});

static MARKER_LINE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("MARKER_LINE", r"^\s*<!--\s*@(illust|diagram)\s"));

static SINGLE_COMMENT_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("SINGLE_COMMENT", r"^\s*<!--.*-->\s*$"));

static COMMENT_OPEN_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("COMMENT_OPEN", r"^\s*<!--"));

static WORD_COUNT_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("WORD_COUNT", r"(?i)^\s*<!--\s*Word count"));

static TRAILING_RULE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("TRAILING_RULE", r"\n---\s*$"));

/// Where the scaffolding pass is relative to HTML comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentState {
  Outside,
  /// Inside a comment that spans several lines; everything is dropped until
  /// a line containing `-->`.
  Inside,
}

/// Extract the chapter number and title from the first `# Chapter N: Title`
/// line.
#[must_use]
pub fn extract_title(content: &str) -> Option<(u32, String)> {
  let caps = TITLE_RE.captures(content)?;
  let number = caps[1].parse().ok()?;
  Some((number, caps[2].trim().to_string()))
}

/// Extract the metadata comment, falling back to defaults when absent.
#[must_use]
pub fn extract_metadata(content: &str) -> DraftMeta {
  META_RE
    .captures(content)
    .and_then(|caps| {
      Some(DraftMeta {
        arc_num:  caps[1].parse().ok()?,
        pov:      caps[2].trim().to_string(),
        location: caps[3].trim().to_string(),
        timeline: caps[4].trim().to_string(),
      })
    })
    .unwrap_or_default()
}

/// Remove the title line and editorial comments from a draft.
///
/// Visual-marker comment lines survive when `keep_markers` is set. The result
/// is trimmed, loses a trailing `---` separator, and ends with exactly one
/// newline unless it is empty.
#[must_use]
pub fn strip_scaffolding(content: &str, keep_markers: bool) -> String {
  let mut state = CommentState::Outside;
  let mut kept = Vec::new();

  for line in content.split('\n') {
    match state {
      CommentState::Inside => {
        if line.contains("-->") {
          state = CommentState::Outside;
        }
      },
      CommentState::Outside => {
        if TITLE_LINE_RE.is_match(line) {
          continue;
        }
        if MARKER_LINE_RE.is_match(line) {
          if keep_markers {
            kept.push(line);
          }
          continue;
        }
        if SINGLE_COMMENT_RE.is_match(line) {
          continue;
        }
        if COMMENT_OPEN_RE.is_match(line) && !line.contains("-->") {
          state = CommentState::Inside;
          continue;
        }
        if WORD_COUNT_RE.is_match(line) {
          continue;
        }
        kept.push(line);
      },
    }
  }

  let joined = kept.join("\n");
  let prose = TRAILING_RULE_RE.replace(joined.trim(), "");
  let prose = prose.trim_end();
  if prose.is_empty() {
    String::new()
  } else {
    format!("{prose}\n")
  }
}

/// Parse a draft. Returns `None` when there is no chapter heading.
#[must_use]
pub fn parse_draft(content: &str) -> Option<ChapterDraft> {
  let (chapter_num, chapter_title) = extract_title(content)?;
  let meta = extract_metadata(content);
  Some(ChapterDraft {
    chapter_num,
    chapter_title,
    arc_num: meta.arc_num,
    pov: meta.pov,
    location: meta.location,
    timeline: meta.timeline,
    prose: strip_scaffolding(content, true),
  })
}

/// Read and parse a draft file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn parse_draft_file(path: &Path) -> io::Result<Option<ChapterDraft>> {
  let content = fs::read_to_string(path)?;
  Ok(parse_draft(&content))
}
