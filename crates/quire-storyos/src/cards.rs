//! Chapter cards: one compact record per chapter for agents, translators
//! and art direction.
use std::path::{Path, PathBuf};

use quire_config::{ThemeMap, themes::THEMES_PATH};
use serde::Serialize;

use crate::{
  error::Result,
  files::{read_required, write_text},
  outline::{Beat, CHAPTERS_PATH, OutlineChapter, parse_outline},
  world::World,
};

/// Location of the chapter cards, relative to the book root.
pub const CARDS_PATH: &str = "schema/chapter-cards.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterCard {
  pub chapter:           u32,
  pub title:             String,
  pub pov:               String,
  pub world:             World,
  pub register_hint:     String,
  pub location:          String,
  pub timeline:          String,
  pub word_count_target: String,
  pub beats:             Vec<Beat>,
  pub hook:              String,
  pub causal_links:      String,
  pub theme_keywords:    Vec<String>,
  pub motif:             String,
  pub svg_prompt:        String,
}

#[derive(Debug, Serialize)]
struct CardsMeta {
  generated_from: [&'static str; 2],
  note:           &'static str,
}

#[derive(Debug, Serialize)]
struct CardsFile<'a> {
  meta:     CardsMeta,
  chapters: &'a [ChapterCard],
}

/// Cards for every outline chapter, enriched from the theme map.
#[must_use]
pub fn build_cards(
  outline: &[OutlineChapter],
  themes: &ThemeMap,
) -> Vec<ChapterCard> {
  outline
    .iter()
    .map(|chapter| {
      let world = World::from_pov(&chapter.pov);
      let theme = themes.get(chapter.chapter);
      ChapterCard {
        chapter: chapter.chapter,
        title: chapter.title.clone(),
        pov: chapter.pov.clone(),
        world,
        register_hint: world.register_hint().to_string(),
        location: chapter.location.clone(),
        timeline: chapter.timeline.clone(),
        word_count_target: chapter.word_count_target.clone(),
        beats: chapter.beats.clone(),
        hook: chapter.hook.clone(),
        causal_links: chapter.causal_links.clone(),
        theme_keywords: theme
          .map(|t| t.theme_keywords.clone())
          .unwrap_or_default(),
        motif: theme.map(|t| t.motif.clone()).unwrap_or_default(),
        svg_prompt: theme.map(|t| t.svg_prompt.clone()).unwrap_or_default(),
      }
    })
    .collect()
}

/// Serialize cards into the chapter-cards document.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn cards_yaml(cards: &[ChapterCard]) -> Result<String> {
  let file = CardsFile {
    meta:     CardsMeta {
      generated_from: [CHAPTERS_PATH, THEMES_PATH],
      note:           "Chapter cards for agent context and \
                       translation/visual consistency.",
    },
    chapters: cards,
  };
  Ok(serde_yaml::to_string(&file)?)
}

/// Read the outline and theme map of the book at `root` and write its chapter
/// cards. Returns the written path and the number of cards.
///
/// # Errors
///
/// Returns an error if the outline is missing, a source cannot be parsed or
/// the cards cannot be written.
pub fn write_cards(root: &Path) -> Result<(PathBuf, usize)> {
  let outline = parse_outline(&read_required(&root.join(CHAPTERS_PATH))?);
  let themes = ThemeMap::load(root)?;
  let cards = build_cards(&outline, &themes);
  let path = write_text(&root.join(CARDS_PATH), &cards_yaml(&cards)?)?;
  Ok((path, cards.len()))
}
