//! Types shared by the parser and the renderer.
use serde::{Deserialize, Serialize};

/// Fallback for POV, location and timeline when a draft has no metadata.
pub const UNKNOWN: &str = "Unknown";

/// One parsed chapter draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDraft {
  pub chapter_num:   u32,
  pub chapter_title: String,
  pub arc_num:       u32,
  pub pov:           String,
  pub location:      String,
  pub timeline:      String,
  /// Prose with editorial scaffolding removed; marker comments are kept.
  pub prose:         String,
}

/// The pipe-delimited metadata comment of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftMeta {
  pub arc_num:  u32,
  pub pov:      String,
  pub location: String,
  pub timeline: String,
}

impl Default for DraftMeta {
  fn default() -> Self {
    Self {
      arc_num:  1,
      pov:      UNKNOWN.to_string(),
      location: UNKNOWN.to_string(),
      timeline: UNKNOWN.to_string(),
    }
  }
}

/// A rendered block of chapter prose, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBlock {
  /// Inner HTML of a `<p>`.
  Paragraph(String),
  /// A scene break, rendered as a horizontal rule.
  SceneBreak,
  /// Inner HTML of each line of a blockquote.
  Blockquote(Vec<String>),
  /// A block-level figure produced by a `full` marker.
  Figure(String),
}

impl RenderedBlock {
  /// HTML for this block, without leading indentation.
  #[must_use]
  pub fn to_html(&self) -> String {
    match self {
      Self::Paragraph(inner) => format!("<p>{inner}</p>"),
      Self::SceneBreak => "<hr class=\"scene-break\">".to_string(),
      Self::Blockquote(lines) => {
        let mut html = String::from("<blockquote>\n");
        for line in lines {
          html.push_str("  <p>");
          html.push_str(line);
          html.push_str("</p>\n");
        }
        html.push_str("</blockquote>");
        html
      },
      Self::Figure(html) => html.clone(),
    }
  }
}

/// Where generated image markup points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
  /// Base path of responsive illustration variants, relative to the chapter.
  pub illustration_base:   String,
  /// Base path of SVG diagrams, relative to the chapter.
  pub diagram_base:        String,
  /// Widths of the raster variants, narrowest first.
  pub illustration_widths: Vec<u32>,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      illustration_base:   "../../assets/illustrations".to_string(),
      diagram_base:        "../../assets/diagrams".to_string(),
      illustration_widths: vec![480, 768, 1200],
    }
  }
}

impl RenderOptions {
  pub(crate) fn narrowest_width(&self) -> u32 {
    self.illustration_widths.first().copied().unwrap_or(480)
  }

  pub(crate) fn widest_width(&self) -> u32 {
    self.illustration_widths.last().copied().unwrap_or(1200)
  }
}
