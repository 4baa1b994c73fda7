//! Prose to HTML.
//!
//! Rendering works on blank-line separated chunks. Scene breaks are isolated
//! into chunks of their own first, then each chunk is classified as a scene
//! break, a block-level figure, a blockquote or an ordinary paragraph.
use std::sync::LazyLock;

use regex::Regex;

use crate::{
  escape::{Shield, escape_text},
  inline::{apply_emphasis, render_inline_markdown},
  marker::{Marker, expand_inline},
  types::{RenderOptions, RenderedBlock},
  utils::compile,
};

/// Stand-in for a scene break while chunking. NUL never survives
/// [`Shield::sanitize`], so prose cannot contain it.
const SCENE_BREAK_TOKEN: &str = "\u{0}SCENE_BREAK\u{0}";

static PARAGRAPH_SPLIT_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("PARAGRAPH_SPLIT", r"\n\s*\n"));

static STAR_BREAK_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("STAR_BREAK", r"^\*\s*\*\s*\*$"));

fn is_scene_break_line(line: &str) -> bool {
  let line = line.trim();
  line == "---" || STAR_BREAK_RE.is_match(line)
}

/// Replace scene-break lines with the token, padded by blank lines.
fn isolate_scene_breaks(prose: &str) -> String {
  prose
    .split('\n')
    .map(|line| {
      if is_scene_break_line(line) {
        format!("\n{SCENE_BREAK_TOKEN}\n")
      } else {
        line.to_string()
      }
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// Text of a quoted line, or `None` when the line is not quoted.
fn quoted_line(line: &str) -> Option<&str> {
  if line == ">" {
    Some("")
  } else {
    line.strip_prefix("> ")
  }
}

/// Lines of a chunk in which every non-blank line is quoted.
fn blockquote_lines(chunk: &str) -> Option<Vec<&str>> {
  let mut lines = Vec::new();
  for line in chunk.lines().filter(|l| !l.trim().is_empty()) {
    lines.push(quoted_line(line)?);
  }
  (!lines.is_empty()).then_some(lines)
}

/// Render one ordinary paragraph: inline markers, escaping, emphasis.
#[must_use]
pub fn render_paragraph(text: &str, options: &RenderOptions) -> String {
  let text = Shield::sanitize(text);
  let mut shield = Shield::new();
  let expanded = expand_inline(&text, options, &mut shield);
  let html = apply_emphasis(&escape_text(&expanded));
  shield.release(&html)
}

/// Render prose into blocks, in document order.
#[must_use]
pub fn render_prose(prose: &str, options: &RenderOptions) -> Vec<RenderedBlock> {
  let prose = Shield::sanitize(prose);
  let prose = isolate_scene_breaks(&prose);

  PARAGRAPH_SPLIT_RE
    .split(&prose)
    .filter_map(|raw| {
      let chunk = raw.trim();
      if chunk.is_empty() {
        return None;
      }
      if chunk == SCENE_BREAK_TOKEN {
        return Some(RenderedBlock::SceneBreak);
      }
      if let Some(marker) = Marker::parse_block(chunk) {
        return Some(RenderedBlock::Figure(marker.expand(options)));
      }
      // Quote prefixes are matched on untrimmed lines.
      if let Some(lines) = blockquote_lines(raw) {
        let lines: Vec<String> = lines
          .into_iter()
          .map(str::trim)
          .filter(|l| !l.is_empty())
          .map(render_inline_markdown)
          .collect();
        return (!lines.is_empty()).then_some(RenderedBlock::Blockquote(lines));
      }
      Some(RenderedBlock::Paragraph(render_paragraph(chunk, options)))
    })
    .collect()
}

/// Render prose into the HTML of a chapter body.
///
/// Blocks are joined by newlines and indented by four spaces to sit inside
/// the page's `<article>`.
#[must_use]
pub fn prose_to_html(prose: &str, options: &RenderOptions) -> String {
  render_prose(prose, options)
    .iter()
    .map(|block| {
      let html = block.to_html();
      match block {
        RenderedBlock::Blockquote(_) => html
          .lines()
          .map(|line| format!("    {line}"))
          .collect::<Vec<_>>()
          .join("\n"),
        _ => format!("    {html}"),
      }
    })
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn star_breaks_allow_inner_whitespace() {
    assert!(is_scene_break_line("*  * *"));
    assert!(is_scene_break_line("  ---  "));
    assert!(!is_scene_break_line("----"));
    assert!(!is_scene_break_line("* * * *"));
  }

  #[test]
  fn scene_break_without_blank_lines_still_splits() {
    let blocks = render_prose("One.\n---\nTwo.", &RenderOptions::default());
    assert_eq!(
      blocks,
      vec![
        RenderedBlock::Paragraph("One.".to_string()),
        RenderedBlock::SceneBreak,
        RenderedBlock::Paragraph("Two.".to_string()),
      ]
    );
  }

  #[test]
  fn bare_quote_marker_lines_are_skipped() {
    let blocks = render_prose("> one\n>\n> two", &RenderOptions::default());
    assert_eq!(
      blocks,
      vec![RenderedBlock::Blockquote(vec![
        "one".to_string(),
        "two".to_string()
      ])]
    );
  }

  #[test]
  fn paragraph_keeps_line_breaks() {
    assert_eq!(
      render_paragraph("line one\nline two", &RenderOptions::default()),
      "line one\nline two"
    );
  }
}
