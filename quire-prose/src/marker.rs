//! Illustration and diagram markers.
//!
//! Drafts reference artwork through HTML comments:
//!
//! ```text
//! <!-- @illust full|thumb|link: <id> | <caption or text> -->
//! <!-- @diagram full|thumb|link: <id> | <caption or text> -->
//! ```
//!
//! `full` markers become a block-level figure and are only honoured when they
//! make up a whole paragraph. `thumb` and `link` markers expand in running
//! prose. Illustrations point at responsive raster variants, diagrams at a
//! single SVG; otherwise both families share one expansion routine.
use std::{fmt, sync::LazyLock};

use regex::{Captures, Regex};

use crate::{
  escape::{Shield, escape_attr},
  inline::{render_inline_markdown, strip_inline_markdown},
  types::RenderOptions,
  utils::compile,
};

/// Any marker, anywhere in a text.
pub static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile(
    "MARKER",
    r"<!--\s*@(illust|diagram)\s+(full|thumb|link):\s*([a-z0-9_-]+)\s*\|\s*(.+?)\s*-->",
  )
});

/// A `full` marker that is the entire (trimmed) paragraph.
static BLOCK_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile(
    "BLOCK_MARKER",
    r"^\s*<!--\s*@(illust|diagram)\s+full:\s*([a-z0-9_-]+)\s*\|\s*(.+?)\s*-->\s*$",
  )
});

/// Marker identifiers, lenient about case and the trailing text, for
/// duplicate detection.
static MARKER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile(
    "MARKER_ID",
    r"(?i)<!--\s*@(illust|diagram)\s+(full|thumb|link):\s*([a-z0-9_-]+)\b",
  )
});

static VALID_ID_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("VALID_ID", r"^[a-z0-9_-]+$"));

/// Which kind of artwork a marker references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerFamily {
  Illustration,
  Diagram,
}

impl MarkerFamily {
  /// The keyword used in the comment grammar.
  #[must_use]
  pub const fn keyword(self) -> &'static str {
    match self {
      Self::Illustration => "illust",
      Self::Diagram => "diagram",
    }
  }

  #[must_use]
  pub fn from_keyword(keyword: &str) -> Option<Self> {
    match keyword.to_ascii_lowercase().as_str() {
      "illust" => Some(Self::Illustration),
      "diagram" => Some(Self::Diagram),
      _ => None,
    }
  }

  const fn data_attr(self) -> &'static str {
    match self {
      Self::Illustration => "data-illust",
      Self::Diagram => "data-diagram",
    }
  }

  const fn label(self) -> &'static str {
    match self {
      Self::Illustration => "Illustration",
      Self::Diagram => "Diagram",
    }
  }

  fn class_suffix(self, base: &'static str) -> &'static str {
    match (self, base) {
      (Self::Diagram, "full") => " diagram-full",
      (Self::Diagram, "thumb") => " diagram-thumb",
      (Self::Diagram, "link") => " diagram-link",
      _ => "",
    }
  }
}

/// Where a marker is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
  /// Block-level figure.
  Full,
  /// Inline thumbnail that opens an overlay.
  Thumb,
  /// Inline text link that opens an overlay.
  Link,
}

impl Placement {
  #[must_use]
  pub const fn keyword(self) -> &'static str {
    match self {
      Self::Full => "full",
      Self::Thumb => "thumb",
      Self::Link => "link",
    }
  }

  #[must_use]
  pub fn from_keyword(keyword: &str) -> Option<Self> {
    match keyword.to_ascii_lowercase().as_str() {
      "full" => Some(Self::Full),
      "thumb" => Some(Self::Thumb),
      "link" => Some(Self::Link),
      _ => None,
    }
  }
}

/// A parsed marker comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
  pub family:    MarkerFamily,
  pub placement: Placement,
  pub id:        String,
  /// Caption, alt text or link text; may carry inline emphasis.
  pub text:      String,
}

impl Marker {
  /// Whether `id` is a valid marker identifier.
  #[must_use]
  pub fn is_valid_id(id: &str) -> bool {
    VALID_ID_RE.is_match(id)
  }

  fn from_captures(caps: &Captures) -> Option<Self> {
    Some(Self {
      family:    MarkerFamily::from_keyword(&caps[1])?,
      placement: Placement::from_keyword(&caps[2])?,
      id:        caps[3].to_string(),
      text:      caps[4].trim().to_string(),
    })
  }

  /// Parse the first marker found anywhere in `text`.
  #[must_use]
  pub fn parse(text: &str) -> Option<Self> {
    MARKER_RE
      .captures(text)
      .and_then(|caps| Self::from_captures(&caps))
  }

  /// Parse a paragraph that consists of nothing but a `full` marker.
  #[must_use]
  pub fn parse_block(paragraph: &str) -> Option<Self> {
    let caps = BLOCK_MARKER_RE.captures(paragraph)?;
    Some(Self {
      family:    MarkerFamily::from_keyword(&caps[1])?,
      placement: Placement::Full,
      id:        caps[2].to_string(),
      text:      caps[3].trim().to_string(),
    })
  }

  /// The comment form of this marker, as it appears in a draft.
  #[must_use]
  pub fn to_comment(&self) -> String {
    format!(
      "<!-- @{} {}: {} | {} -->",
      self.family.keyword(),
      self.placement.keyword(),
      self.id,
      self.text
    )
  }

  /// Expand this marker into HTML, whatever its placement.
  #[must_use]
  pub fn expand(&self, options: &RenderOptions) -> String {
    match self.placement {
      Placement::Full => figure_html(self, options),
      Placement::Thumb => thumb_html(self, options),
      Placement::Link => link_html(self, options),
    }
  }
}

impl fmt::Display for Marker {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_comment())
  }
}

/// Whether a marker with `id` (case-insensitive) already exists in `text`.
#[must_use]
pub fn contains_marker_id(text: &str, id: &str) -> bool {
  MARKER_ID_RE
    .captures_iter(text)
    .any(|caps| caps[3].eq_ignore_ascii_case(id))
}

/// Expand inline `thumb`/`link` markers in `text`.
///
/// Generated markup is handed to `shield`, so the returned text contains only
/// placeholders where markers used to be. `full` markers are not legal inline
/// and are left in place as literal text.
#[must_use]
pub fn expand_inline(
  text: &str,
  options: &RenderOptions,
  shield: &mut Shield,
) -> String {
  MARKER_RE
    .replace_all(text, |caps: &Captures| {
      match Marker::from_captures(caps) {
        Some(marker) if marker.placement != Placement::Full => {
          shield.hold(marker.expand(options))
        },
        _ => caps[0].to_string(),
      }
    })
    .into_owned()
}

fn raster_src(options: &RenderOptions, id: &str, width: u32) -> String {
  format!("{}/{id}-{width}w.webp", options.illustration_base)
}

fn diagram_src(options: &RenderOptions, id: &str) -> String {
  format!("{}/{id}.svg", options.diagram_base)
}

/// The source opened by the overlay or zoom link.
fn full_src(marker: &Marker, options: &RenderOptions) -> String {
  match marker.family {
    MarkerFamily::Illustration => {
      raster_src(options, &marker.id, options.widest_width())
    },
    MarkerFamily::Diagram => diagram_src(options, &marker.id),
  }
}

fn srcset(options: &RenderOptions, id: &str, format: &str) -> String {
  options
    .illustration_widths
    .iter()
    .map(|w| {
      format!("{}/{id}-{w}w.{format} {w}w", options.illustration_base)
    })
    .collect::<Vec<_>>()
    .join(", ")
}

/// `<picture>` with AVIF and WebP sources over every configured width.
fn picture_element(
  options: &RenderOptions,
  id: &str,
  alt: &str,
  sizes: &str,
) -> String {
  format!(
    "<picture><source type=\"image/avif\" srcset=\"{avif}\" \
     sizes=\"{sizes}\"><source type=\"image/webp\" srcset=\"{webp}\" \
     sizes=\"{sizes}\"><img src=\"{fallback}\" alt=\"{alt}\" loading=\"lazy\" \
     decoding=\"async\"></picture>",
    avif = srcset(options, id, "avif"),
    webp = srcset(options, id, "webp"),
    fallback = raster_src(options, id, options.widest_width()),
  )
}

fn figure_html(marker: &Marker, options: &RenderOptions) -> String {
  let id = escape_attr(&marker.id);
  let alt = escape_attr(&strip_inline_markdown(&marker.text)).into_owned();
  let caption = render_inline_markdown(&marker.text);
  let src = full_src(marker, options);
  let image = match marker.family {
    MarkerFamily::Illustration => {
      picture_element(options, &marker.id, &alt, "(min-width: 900px) 82ch, 100vw")
    },
    MarkerFamily::Diagram => {
      format!("<img src=\"{src}\" alt=\"{alt}\" loading=\"lazy\" decoding=\"async\">")
    },
  };
  format!(
    "<figure class=\"illust-full{suffix}\" {data}=\"{id}\"><a \
     class=\"illust-zoom\" href=\"{src}\" data-full=\"{src}\" aria-label=\"View: \
     {alt}\">{image}</a><figcaption>{caption}</figcaption></figure>",
    suffix = marker.family.class_suffix("full"),
    data = marker.family.data_attr(),
  )
}

fn thumb_html(marker: &Marker, options: &RenderOptions) -> String {
  let id = escape_attr(&marker.id);
  let alt = escape_attr(&strip_inline_markdown(&marker.text)).into_owned();
  let src = full_src(marker, options);
  let thumb = match marker.family {
    MarkerFamily::Illustration => {
      raster_src(options, &marker.id, options.narrowest_width())
    },
    MarkerFamily::Diagram => src.clone(),
  };
  format!(
    "<a class=\"illust-thumb{suffix}\" {data}=\"{id}\" data-full=\"{src}\" \
     href=\"{src}\" aria-label=\"View: {alt}\"><img src=\"{thumb}\" \
     alt=\"{alt}\" loading=\"lazy\" decoding=\"async\"></a>",
    suffix = marker.family.class_suffix("thumb"),
    data = marker.family.data_attr(),
  )
}

fn link_html(marker: &Marker, options: &RenderOptions) -> String {
  let id = escape_attr(&marker.id);
  let src = full_src(marker, options);
  let stripped = strip_inline_markdown(&marker.text);
  let label = match stripped.trim() {
    "" => marker.family.label().to_string(),
    text => escape_attr(text).into_owned(),
  };
  format!(
    "<a class=\"illust-link{suffix}\" {data}=\"{id}\" data-full=\"{src}\" \
     href=\"{src}\" aria-label=\"View {noun}: {label}\">{text}</a>",
    suffix = marker.family.class_suffix("link"),
    data = marker.family.data_attr(),
    noun = marker.family.label().to_lowercase(),
    text = render_inline_markdown(&marker.text),
  )
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use super::*;

  fn marker(family: MarkerFamily, placement: Placement, text: &str) -> Marker {
    Marker {
      family,
      placement,
      id: "sky-01".to_string(),
      text: text.to_string(),
    }
  }

  #[test]
  fn parses_both_families() {
    let m = Marker::parse("x <!-- @diagram link: flow_2 | the *flow* --> y")
      .expect("marker");
    assert_eq!(m.family, MarkerFamily::Diagram);
    assert_eq!(m.placement, Placement::Link);
    assert_eq!(m.id, "flow_2");
    assert_eq!(m.text, "the *flow*");
  }

  #[test]
  fn rejects_uppercase_ids() {
    assert!(Marker::parse("<!-- @illust thumb: Sky | text -->").is_none());
    assert!(!Marker::is_valid_id("Sky"));
    assert!(Marker::is_valid_id("sky_01-b"));
  }

  #[test]
  fn block_marker_must_be_whole_paragraph() {
    assert!(Marker::parse_block("<!-- @illust full: a | cap -->").is_some());
    assert!(
      Marker::parse_block("text <!-- @illust full: a | cap -->").is_none()
    );
    assert!(Marker::parse_block("<!-- @illust thumb: a | cap -->").is_none());
  }

  #[test]
  fn comment_form_round_trips() {
    let m = marker(MarkerFamily::Illustration, Placement::Thumb, "A red sky");
    assert_eq!(m.to_comment(), "<!-- @illust thumb: sky-01 | A red sky -->");
    assert_eq!(Marker::parse(&m.to_comment()), Some(m));
  }

  #[test]
  fn figure_has_responsive_picture() {
    let html = marker(MarkerFamily::Illustration, Placement::Full, "Dawn")
      .expand(&RenderOptions::default());
    assert!(html.starts_with(
      "<figure class=\"illust-full\" data-illust=\"sky-01\"><a \
       class=\"illust-zoom\" \
       href=\"../../assets/illustrations/sky-01-1200w.webp\""
    ));
    assert!(html.contains("../../assets/illustrations/sky-01-480w.avif 480w"));
    assert!(html.contains("../../assets/illustrations/sky-01-768w.webp 768w"));
    assert!(html.contains("<figcaption>Dawn</figcaption></figure>"));
  }

  #[test]
  fn diagram_figure_uses_svg() {
    let html = marker(MarkerFamily::Diagram, Placement::Full, "Flow")
      .expand(&RenderOptions::default());
    assert!(html.contains("class=\"illust-full diagram-full\""));
    assert!(html.contains("data-diagram=\"sky-01\""));
    assert!(html.contains("<img src=\"../../assets/diagrams/sky-01.svg\""));
    assert!(!html.contains("<picture>"));
  }

  #[test]
  fn thumb_uses_narrowest_variant() {
    let html = marker(MarkerFamily::Illustration, Placement::Thumb, "Sky")
      .expand(&RenderOptions::default());
    assert!(html.contains("<img src=\"../../assets/illustrations/sky-01-480w.webp\""));
    assert!(html.contains("data-full=\"../../assets/illustrations/sky-01-1200w.webp\""));
  }

  #[test]
  fn link_renders_emphasis_but_strips_label() {
    let html = marker(MarkerFamily::Illustration, Placement::Link, "the *red* sky")
      .expand(&RenderOptions::default());
    assert!(html.contains("aria-label=\"View illustration: the red sky\""));
    assert!(html.ends_with(">the <em>red</em> sky</a>"));
  }

  #[test]
  fn link_label_falls_back_when_text_is_only_markup() {
    let html = marker(MarkerFamily::Diagram, Placement::Link, "** **")
      .expand(&RenderOptions::default());
    assert!(html.contains("aria-label=\"View diagram: Diagram\""));
  }

  #[test]
  fn attributes_are_escaped() {
    let html = marker(MarkerFamily::Illustration, Placement::Thumb, "a \"quoted\" <sky>")
      .expand(&RenderOptions::default());
    assert!(html.contains("alt=\"a &quot;quoted&quot; &lt;sky&gt;\""));
  }

  #[test]
  fn inline_expansion_skips_full_markers() {
    let mut shield = Shield::new();
    let text = "a <!-- @illust full: x | y --> b";
    let out = expand_inline(text, &RenderOptions::default(), &mut shield);
    assert_eq!(out, text);
    assert!(shield.is_empty());
  }

  #[test]
  fn duplicate_detection_ignores_case() {
    let text = "<!-- @ILLUST thumb: sky-01 | A -->";
    assert!(contains_marker_id(text, "SKY-01"));
    assert!(!contains_marker_id(text, "sky-02"));
  }
}
