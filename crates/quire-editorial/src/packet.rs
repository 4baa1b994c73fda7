//! Agent packets: everything a reviewing agent needs for one chapter, as a
//! single markdown document.
use std::path::Path;

use quire_prose::draft::extract_title;
use quire_storyos::outline::{CHAPTERS_PATH, chapter_excerpt};

use crate::{
  error::{EditorialError, Result},
  files::read_file,
};

/// Role name to role prompt, relative to the book root.
pub const ROLE_MAP: [(&str, &str); 13] = [
  ("beta", "agents/roles/beta-reader.md"),
  ("continuity", "agents/roles/continuity-reviewer.md"),
  ("eic", "agents/roles/editor-in-chief.md"),
  ("hi-naturalness", "agents/roles/hindi-naturalness-editor.md"),
  ("language", "agents/roles/language-consultant.md"),
  ("proof", "agents/roles/proofreader.md"),
  ("science", "agents/roles/science-reviewer.md"),
  ("structure", "agents/roles/structure-beat-reviewer.md"),
  ("style", "agents/roles/style-voice-reviewer.md"),
  ("translate-hi", "agents/roles/translator-hi.md"),
  ("visual-inserts", "agents/roles/visual-insert-planner.md"),
  ("visual-mj", "agents/roles/visual-midjourney.md"),
  ("visual-runway", "agents/roles/visual-runway.md"),
];

pub const STYLE_GUIDE_PATH: &str = "style/STYLE_GUIDE.md";
pub const WORLD_RULES_PATH: &str = "bible/WORLD_RULES.md";
pub const LANGUAGES_PATH: &str = "bible/LANGUAGES.md";

/// Role names, sorted.
#[must_use]
pub fn role_names() -> impl Iterator<Item = &'static str> {
  ROLE_MAP.iter().map(|(name, _)| *name)
}

/// Prompt path of `role`.
#[must_use]
pub fn role_path(role: &str) -> Option<&'static str> {
  ROLE_MAP
    .iter()
    .find(|(name, _)| *name == role)
    .map(|(_, path)| *path)
}

/// Optional canon sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketOptions {
  pub include_style: bool,
  pub include_world: bool,
  pub include_lang:  bool,
}

/// Build the packet for `role` on the draft at `chapter`.
///
/// `chapter` is shown in the heading as given; the outline excerpt is found
/// by the draft's chapter number.
///
/// # Errors
///
/// Returns an error if the role is unknown, or the role prompt, the draft or
/// a requested canon file is missing.
pub fn build_packet(
  root: &Path,
  role: &str,
  chapter: &Path,
  options: PacketOptions,
) -> Result<String> {
  let role_file = role_path(role)
    .ok_or_else(|| EditorialError::UnknownRole(role.to_string()))?;
  let draft = read_file(chapter)?;
  let draft = draft.trim();
  let role_text = read_file(&root.join(role_file))?;

  let outline = match extract_title(draft) {
    Some((number, _)) => {
      match read_file(&root.join(CHAPTERS_PATH)) {
        Ok(text) => chapter_excerpt(&text, number).to_string(),
        Err(e) => {
          log::warn!("No outline excerpt: {e}");
          String::new()
        },
      }
    },
    None => String::new(),
  };

  let mut sections = vec![
    format!(
      "# Agent Packet: {role} / {}",
      chapter.to_string_lossy().replace('\\', "/")
    ),
    String::new(),
    "## Role Prompt".to_string(),
    role_text.trim().to_string(),
    String::new(),
  ];
  if !outline.is_empty() {
    sections.extend([
      "## Outline Excerpt (Contract)".to_string(),
      outline,
      String::new(),
    ]);
  }
  for (included, heading, path) in [
    (options.include_style, "Style Guide", STYLE_GUIDE_PATH),
    (options.include_world, "World Rules (Canon)", WORLD_RULES_PATH),
    (options.include_lang, "Languages (Canon)", LANGUAGES_PATH),
  ] {
    if included {
      sections.extend([
        format!("## {heading}"),
        read_file(&root.join(path))?.trim().to_string(),
        String::new(),
      ]);
    }
  }
  sections.extend(["## Chapter Draft".to_string(), draft.to_string()]);

  Ok(format!("{}\n", sections.join("\n").trim_end()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn roles_resolve() {
    assert_eq!(role_path("eic"), Some("agents/roles/editor-in-chief.md"));
    assert_eq!(role_path("EIC"), None);
    assert_eq!(role_names().count(), ROLE_MAP.len());
  }
}
