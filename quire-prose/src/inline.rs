//! Inline emphasis: `**strong**` and `*em*`.
use std::sync::LazyLock;

use regex::Regex;

use crate::{escape::escape_text, utils::compile};

static STRONG: LazyLock<Regex> =
  LazyLock::new(|| compile("STRONG", r"\*\*(.+?)\*\*"));

static EMPHASIS: LazyLock<Regex> =
  LazyLock::new(|| compile("EMPHASIS", r"\*(.+?)\*"));

/// Turn emphasis markers into tags. The input must already be escaped.
#[must_use]
pub fn apply_emphasis(escaped: &str) -> String {
  let text = STRONG.replace_all(escaped, "<strong>$1</strong>");
  EMPHASIS.replace_all(&text, "<em>$1</em>").into_owned()
}

/// Escape `text` and render its emphasis.
#[must_use]
pub fn render_inline_markdown(text: &str) -> String {
  apply_emphasis(&escape_text(text))
}

/// Plain-text form of `text` with emphasis markers removed, for attributes.
#[must_use]
pub fn strip_inline_markdown(text: &str) -> String {
  let text = STRONG.replace_all(text, "$1");
  EMPHASIS.replace_all(&text, "$1").into_owned()
}
