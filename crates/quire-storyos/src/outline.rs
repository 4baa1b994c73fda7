//! Parsing `outline/CHAPTERS.md`.
//!
//! Each chapter is a `### Chapter N: "Title"` section. Within a section the
//! parser picks up the POV line, the word-count target, numbered beats, the
//! chapter hook and the causal links; anything else is ignored.
use std::sync::LazyLock;

use quire_prose::utils::compile;
use regex::Regex;
use serde::Serialize;

/// Location of the chapter outline, relative to the book root.
pub const CHAPTERS_PATH: &str = "outline/CHAPTERS.md";

static CHAPTER_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile("CHAPTER", r#"(?m)^### Chapter\s+(\d+):\s+"([^"]+)"\s*$"#)
});

static POV_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile(
    "POV",
    r"(?m)^\*\*POV:\*\*\s*(.+?)\s*·\s*\*\*Location:\*\*\s*(.+?)\s*·\s*\*\*Timeline:\*\*\s*(.+?)\s*$",
  )
});

static POV_ONLY_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("POV_ONLY", r"(?m)^\*\*POV:\*\*\s*(.+?)\s*·"));

static WORD_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile("WORD_COUNT", r"(?m)^\*\*Word count:\*\*\s*([0-9,]+)\s*$")
});

static BEAT_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile("BEAT", r"(?m)^\*\*Beat\s+(\d+)\s+—\s+(.+?)\.\*\*\s*(.*)$")
});

static HOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile("HOOK", r"(?m)^\*\*CHAPTER HOOK.*?:\*\*\s*(.+)$")
});

static CAUSAL_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile("CAUSAL", r"(?m)^\*\*Causal links:\*\*\s*(.+)$")
});

/// A numbered beat of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Beat {
  pub beat:  u32,
  pub title: String,
  pub desc:  String,
}

/// One chapter of the outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineChapter {
  pub chapter:           u32,
  pub title:             String,
  pub pov:               String,
  pub location:          String,
  pub timeline:          String,
  /// Target as written, without thousands separators.
  pub word_count_target: String,
  pub beats:             Vec<Beat>,
  pub hook:              String,
  pub causal_links:      String,
}

/// Heading spans of every chapter section: number, title, start, end.
fn sections(text: &str) -> Vec<(u32, &str, usize, usize)> {
  let heads: Vec<_> = CHAPTER_RE
    .captures_iter(text)
    .filter_map(|caps| {
      let whole = caps.get(0)?;
      let number = caps[1].parse::<u32>().ok()?;
      let title = caps.get(2)?.as_str();
      Some((number, title, whole.start()))
    })
    .collect();

  heads
    .iter()
    .enumerate()
    .map(|(i, (number, title, start))| {
      let end = heads.get(i + 1).map_or(text.len(), |next| next.2);
      (*number, *title, *start, end)
    })
    .collect()
}

fn first_capture(re: &Regex, text: &str) -> String {
  re.captures(text)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().trim().to_string())
    .unwrap_or_default()
}

fn parse_section(number: u32, title: &str, block: &str) -> OutlineChapter {
  let mut chapter = OutlineChapter {
    chapter: number,
    title: title.trim().to_string(),
    ..OutlineChapter::default()
  };

  if let Some(caps) = POV_RE.captures(block) {
    chapter.pov = caps[1].trim().to_string();
    chapter.location = caps[2].trim().to_string();
    chapter.timeline = caps[3].trim().to_string();
  } else {
    chapter.pov = first_capture(&POV_ONLY_RE, block);
  }

  chapter.word_count_target =
    first_capture(&WORD_COUNT_RE, block).replace(',', "");

  chapter.beats = BEAT_RE
    .captures_iter(block)
    .filter_map(|caps| {
      Some(Beat {
        beat:  caps[1].parse().ok()?,
        title: caps[2].trim().to_string(),
        desc:  caps[3].trim().to_string(),
      })
    })
    .collect();

  chapter.hook = first_capture(&HOOK_RE, block);
  chapter.causal_links = first_capture(&CAUSAL_RE, block);
  chapter
}

/// Parse every chapter section of an outline, in document order.
#[must_use]
pub fn parse_outline(text: &str) -> Vec<OutlineChapter> {
  sections(text)
    .into_iter()
    .map(|(number, title, start, end)| {
      parse_section(number, title, &text[start..end])
    })
    .collect()
}

/// The raw section of `chapter`, trimmed, or an empty string when the outline
/// has no such chapter.
#[must_use]
pub fn chapter_excerpt(text: &str, chapter: u32) -> &str {
  sections(text)
    .into_iter()
    .find(|(number, ..)| *number == chapter)
    .map_or("", |(_, _, start, end)| text[start..end].trim())
}
