//! Baseline image and video prompts per chapter.
use std::path::{Path, PathBuf};

use quire_config::{ChapterTheme, ThemeMap, themes::THEMES_PATH};
use quire_prose::UNKNOWN;
use serde::Serialize;

use crate::{
  error::Result,
  files::{read_required, write_text},
  outline::{CHAPTERS_PATH, OutlineChapter, parse_outline},
  world::World,
};

/// Location of the prompt sheet, relative to the book root.
pub const PROMPTS_PATH: &str = "agents/visual/chapter-visual-prompts.yaml";

const ASPECT: &str = "16:9";
const STILL_PARAMS: &str = "--ar 16:9 --style raw --stylize 100 --no text \
                            --no letters --no watermark --no logo";
const STILL_NEGATIVE: &str =
  "--no text --no letters --no watermark --no logo --no subtitles";
const VIDEO_NEGATIVE: &str =
  "text, subtitles, watermark, logo, UI overlay, low-res, blurry faces";
const VIDEO_DURATION: &str = "4-8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StillPrompts {
  pub cover_still_prompt: String,
  pub scene_still_prompt: String,
  pub params:             &'static str,
  pub negative:           &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoPrompt {
  pub video_prompt: String,
  pub camera:       &'static str,
  pub negative:     &'static str,
  pub aspect:       &'static str,
  pub duration_s:   &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterPrompts {
  pub chapter:        u32,
  pub title:          String,
  pub pov:            String,
  pub theme_keywords: Vec<String>,
  pub motif:          String,
  pub still:          StillPrompts,
  pub video:          VideoPrompt,
}

#[derive(Debug, Serialize)]
struct PromptsMeta {
  generated_from:       [&'static str; 2],
  aspect_ratio_default: &'static str,
  note:                 &'static str,
}

#[derive(Debug, Serialize)]
struct PromptsFile<'a> {
  meta:     PromptsMeta,
  chapters: &'a [ChapterPrompts],
}

/// Recurring character description for a POV.
fn character_tags(pov: &str) -> &'static str {
  let pov = pov.to_lowercase();
  if pov.contains("kael") {
    "Kael: dark brown skin, close-cropped hair, burn scar on left forearm, \
     strong hands"
  } else if pov.contains("moss") {
    "Moss: weathered sailor build, crooked/broken nose, tar-and-salt texture"
  } else if pov.contains("sūrya") || pov.contains("surya") {
    "Sūrya: very pale skin, large gray eyes, long dark hair, precise posture"
  } else if pov.contains("dual") {
    "Dual POV: contrast between Continental warmth and Antarctic precision"
  } else {
    "Characters: keep features consistent with the character bible"
  }
}

/// Prompts for one chapter.
#[must_use]
pub fn chapter_prompts(
  chapter: &OutlineChapter,
  theme: Option<&ChapterTheme>,
) -> ChapterPrompts {
  let pov = if chapter.pov.is_empty() {
    UNKNOWN
  } else {
    chapter.pov.as_str()
  };
  let (vibe, camera) = World::from_pov(pov).visual_tags();
  let chars = character_tags(pov);
  let motif = theme.map(|t| t.motif.clone()).unwrap_or_default();
  let keywords = theme
    .map(|t| t.theme_keywords.clone())
    .unwrap_or_default();
  let title = &chapter.title;

  let cover = format!(
    "{title}, theme: {}. Visual motif: {motif}. {chars}. {vibe}. {camera}. \
     editorial hard sci-fi, high detail, restrained color, no text",
    keywords.join(", ")
  );
  let scene = format!(
    "Key moment from '{title}': {} {chars}. {vibe}. {camera}. no text",
    chapter.hook
  );
  let video = format!(
    "Atmospheric cinematic shot inspired by '{title}': {motif}. {vibe}. \
     {camera}. No text."
  );

  ChapterPrompts {
    chapter: chapter.chapter,
    title: title.clone(),
    pov: pov.to_string(),
    theme_keywords: keywords,
    motif,
    still: StillPrompts {
      cover_still_prompt: cover,
      scene_still_prompt: scene.trim().to_string(),
      params:             STILL_PARAMS,
      negative:           STILL_NEGATIVE,
    },
    video: VideoPrompt {
      video_prompt: video,
      camera,
      negative: VIDEO_NEGATIVE,
      aspect: ASPECT,
      duration_s: VIDEO_DURATION,
    },
  }
}

/// Prompts for every outline chapter, in chapter order.
#[must_use]
pub fn build_prompts(
  outline: &[OutlineChapter],
  themes: &ThemeMap,
) -> Vec<ChapterPrompts> {
  let mut prompts: Vec<_> = outline
    .iter()
    .map(|chapter| chapter_prompts(chapter, themes.get(chapter.chapter)))
    .collect();
  prompts.sort_by_key(|p| p.chapter);
  prompts
}

/// Serialize prompts into the prompt-sheet document.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn prompts_yaml(prompts: &[ChapterPrompts]) -> Result<String> {
  let file = PromptsFile {
    meta:     PromptsMeta {
      generated_from:       [CHAPTERS_PATH, THEMES_PATH],
      aspect_ratio_default: ASPECT,
      note:                 "Baseline prompts; refine per chapter with \
                             character/scene specificity as needed.",
    },
    chapters: prompts,
  };
  Ok(serde_yaml::to_string(&file)?)
}

/// Write the prompt sheet of the book at `root`. Returns the written path and
/// the number of chapters.
///
/// # Errors
///
/// Returns an error if the outline is missing, a source cannot be parsed or
/// the sheet cannot be written.
pub fn write_prompts(root: &Path) -> Result<(PathBuf, usize)> {
  let outline = parse_outline(&read_required(&root.join(CHAPTERS_PATH))?);
  let themes = ThemeMap::load(root)?;
  let prompts = build_prompts(&outline, &themes);
  let path = write_text(&root.join(PROMPTS_PATH), &prompts_yaml(&prompts)?)?;
  Ok((path, prompts.len()))
}
