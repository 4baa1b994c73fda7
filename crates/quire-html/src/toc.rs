//! Grouping chapters by arc for the table of contents.
use std::collections::BTreeMap;

use quire_prose::ChapterDraft;
use serde::Serialize;

/// One chapter link in the table of contents. Text fields are HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
  pub chapter_num: u32,
  pub href:        String,
  pub sigil_html:  String,
  pub title:       String,
  pub pov:         String,
  pub location:    String,
}

/// The chapters of one arc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArcGroup {
  pub arc_num:  u32,
  pub title:    String,
  pub chapters: Vec<TocEntry>,
}

/// Chapters grouped by arc: arcs ascending, chapters by number within each
/// arc.
#[must_use]
pub fn group_by_arc(chapters: &[ChapterDraft]) -> BTreeMap<u32, Vec<&ChapterDraft>> {
  let mut groups: BTreeMap<u32, Vec<&ChapterDraft>> = BTreeMap::new();
  for chapter in chapters {
    groups.entry(chapter.arc_num).or_default().push(chapter);
  }
  for group in groups.values_mut() {
    group.sort_by_key(|c| c.chapter_num);
  }
  groups
}
