//! The table of contents page.
use std::path::Path;

use color_eyre::eyre::Result;
use html_escape::{encode_double_quoted_attribute, encode_text};
use quire_config::{BookConfig, ThemeMap, ToolConfig};
use quire_prose::ChapterDraft;

use crate::{
  chapter::chapter_file_name,
  sigil::sigil_img,
  template::Templates,
  toc::{ArcGroup, TocEntry, group_by_arc},
};

/// Paths used by an index page, relative to where it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLayout {
  pub style_href:        String,
  pub manuscript_prefix: String,
  pub sigil_base:        String,
  pub meta_href:         String,
}

impl IndexLayout {
  /// Layout of `index.html` at the book root.
  #[must_use]
  pub fn root(config: &ToolConfig) -> Self {
    Self {
      style_href:        ToolConfig::root_relative(&config.style_href)
        .to_string(),
      manuscript_prefix: path_prefix(&config.manuscript_dir),
      sigil_base:        ToolConfig::root_relative(&config.sigil_base)
        .to_string(),
      meta_href:         "meta/ui/".to_string(),
    }
  }

  /// Layout of the legacy `build/index.html`: the root layout one directory
  /// down.
  #[must_use]
  pub fn legacy(config: &ToolConfig) -> Self {
    let root = Self::root(config);
    Self {
      style_href:        up_one(&root.style_href),
      manuscript_prefix: up_one(&root.manuscript_prefix),
      sigil_base:        up_one(&root.sigil_base),
      meta_href:         up_one(&root.meta_href),
    }
  }
}

fn path_prefix(path: &Path) -> String {
  path
    .to_string_lossy()
    .replace('\\', "/")
    .trim_end_matches('/')
    .to_string()
}

/// Prefix a relative href with `../`; absolute hrefs and URLs are kept.
fn up_one(href: &str) -> String {
  if href.starts_with('/') || href.contains("://") {
    href.to_string()
  } else {
    format!("../{href}")
  }
}

/// Build the arc groups shown on an index page.
#[must_use]
pub fn arc_groups(
  chapters: &[ChapterDraft],
  book: &BookConfig,
  themes: &ThemeMap,
  layout: &IndexLayout,
) -> Vec<ArcGroup> {
  group_by_arc(chapters)
    .into_iter()
    .map(|(arc_num, drafts)| {
      ArcGroup {
        arc_num,
        title: encode_text(book.arc_title(arc_num)).into_owned(),
        chapters: drafts
          .into_iter()
          .map(|draft| {
            TocEntry {
              chapter_num: draft.chapter_num,
              href:        format!(
                "{}/arc-{}/{}",
                encode_double_quoted_attribute(&layout.manuscript_prefix),
                arc_num,
                chapter_file_name(draft.chapter_num)
              ),
              sigil_html:  themes
                .sigil(draft.chapter_num)
                .map(|s| sigil_img(&layout.sigil_base, &s))
                .unwrap_or_default(),
              title:       encode_text(&draft.chapter_title).into_owned(),
              pov:         encode_text(&draft.pov).into_owned(),
              location:    encode_text(&draft.location).into_owned(),
            }
          })
          .collect(),
      }
    })
    .collect()
}

/// Render an index page.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_index(
  templates: &Templates,
  book: &BookConfig,
  themes: &ThemeMap,
  chapters: &[ChapterDraft],
  layout: &IndexLayout,
) -> Result<String> {
  let attr = |s: &str| encode_double_quoted_attribute(s).into_owned();
  let text = |s: &str| encode_text(s).into_owned();

  let mut ctx = tera::Context::new();
  ctx.insert("book_title", &text(&book.title));
  ctx.insert("subtitle", &text(&book.subtitle));
  ctx.insert("style_href", &attr(&layout.style_href));
  ctx.insert("meta_href", &attr(&layout.meta_href));
  ctx.insert("arcade_href", &attr(&book.arcade_href));
  ctx.insert("arcade_label", &text(&book.arcade_label));
  ctx.insert("home_href", &attr(&book.home_href));
  ctx.insert("home_label", &text(&book.home_label));
  ctx.insert("arcs", &arc_groups(chapters, book, themes, layout));

  templates.render_index(&ctx)
}
