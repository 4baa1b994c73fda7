//! Full chapter pages.
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};
use quire_config::{BookConfig, ThemeMap, ToolConfig};
use quire_prose::{ChapterDraft, RenderOptions, prose_to_html};

use crate::{sigil::chapter_sigil, template::Templates};

/// File name of a rendered chapter: `chapter-07.html`.
#[must_use]
pub fn chapter_file_name(chapter_num: u32) -> String {
  format!("chapter-{chapter_num:02}.html")
}

/// Href of a chapter relative to another chapter page.
#[must_use]
pub fn sibling_href(draft: &ChapterDraft) -> String {
  format!(
    "../arc-{}/{}",
    draft.arc_num,
    chapter_file_name(draft.chapter_num)
  )
}

/// Output path of a chapter, under the arc its metadata names.
#[must_use]
pub fn output_path(
  root: &Path,
  config: &ToolConfig,
  draft: &ChapterDraft,
) -> PathBuf {
  config
    .arc_dir(root, draft.arc_num)
    .join(chapter_file_name(draft.chapter_num))
}

/// Previous and next links of a chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLinks {
  pub prev_href: String,
  pub next_href: String,
}

impl ChapterLinks {
  /// Links for the chapter at `position` in the sorted chapter list. The first
  /// and last chapters link back to the table of contents.
  #[must_use]
  pub fn for_position(
    chapters: &[ChapterDraft],
    position: usize,
    index_href: &str,
  ) -> Self {
    let prev_href = position
      .checked_sub(1)
      .and_then(|i| chapters.get(i))
      .map_or_else(|| index_href.to_string(), sibling_href);
    let next_href = chapters
      .get(position + 1)
      .map_or_else(|| index_href.to_string(), sibling_href);
    Self {
      prev_href,
      next_href,
    }
  }
}

/// Everything a chapter page needs besides the draft itself.
#[derive(Debug)]
pub struct ChapterRenderer<'a> {
  pub root:      &'a Path,
  pub config:    &'a ToolConfig,
  pub book:      &'a BookConfig,
  pub themes:    &'a ThemeMap,
  pub templates: &'a Templates,
  options:       RenderOptions,
  sigil_dir:     PathBuf,
}

impl<'a> ChapterRenderer<'a> {
  #[must_use]
  pub fn new(
    root: &'a Path,
    config: &'a ToolConfig,
    book: &'a BookConfig,
    themes: &'a ThemeMap,
    templates: &'a Templates,
  ) -> Self {
    let sigil_dir = root.join(ToolConfig::root_relative(&config.sigil_base));
    Self {
      root,
      config,
      book,
      themes,
      templates,
      options: config.render_options(),
      sigil_dir,
    }
  }

  /// The article body of a chapter.
  #[must_use]
  pub fn body(&self, draft: &ChapterDraft) -> String {
    prose_to_html(&draft.prose, &self.options)
  }

  /// The complete HTML document of a chapter.
  ///
  /// # Errors
  ///
  /// Returns an error if the template fails to render.
  pub fn render(
    &self,
    draft: &ChapterDraft,
    links: &ChapterLinks,
  ) -> Result<String> {
    let world = self.book.world_for(&draft.pov);
    let sigil_html = chapter_sigil(
      self.themes.sigil(draft.chapter_num).as_ref(),
      &self.sigil_dir,
      &self.config.sigil_base,
      world,
    );
    let chapter_title = encode_text(&draft.chapter_title);

    let mut ctx = tera::Context::new();
    ctx.insert(
      "page_title",
      &format!(
        "{} — Chapter {}: {}",
        encode_text(&self.book.title),
        draft.chapter_num,
        chapter_title
      ),
    );
    ctx.insert(
      "style_href",
      &encode_double_quoted_attribute(&self.config.style_href),
    );
    ctx.insert(
      "index_href",
      &encode_double_quoted_attribute(&self.config.index_href),
    );
    ctx.insert("prev_href", &links.prev_href);
    ctx.insert("next_href", &links.next_href);
    ctx.insert("sigil_html", &sigil_html);
    ctx.insert("arc_num", &draft.arc_num);
    ctx.insert("arc_title", &encode_text(self.book.arc_title(draft.arc_num)));
    ctx.insert("chapter_num", &draft.chapter_num);
    ctx.insert("chapter_title", &chapter_title);
    ctx.insert("pov", &encode_text(&draft.pov));
    ctx.insert("location", &encode_text(&draft.location));
    ctx.insert("timeline", &encode_text(&draft.timeline));
    ctx.insert("body_html", &self.body(draft));
    ctx.insert("script", self.templates.script());

    self.templates.render_chapter(&ctx).wrap_err_with(|| {
      format!(
        "Failed to render chapter {}: {}",
        draft.chapter_num, draft.chapter_title
      )
    })
  }
}
