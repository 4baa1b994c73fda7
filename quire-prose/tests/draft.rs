#![allow(clippy::expect_used, clippy::unwrap_used, reason = "Fine in tests")]
use std::fs;

use quire_prose::{UNKNOWN, parse_draft, parse_draft_file};
use tempfile::TempDir;

const FULL_DRAFT: &str = r#"# Chapter 5: The Mirror Room

<!-- Arc: 2 | POV: Sūrya + VEDA | Location: Station Halley | Timeline: Year 3, winter -->
<!-- Word count target: 4,200 -->

<!--
CONTINUITY
- the lens is cracked
-->

The corridor hummed.

<!-- @illust full: mirror-room | The *mirror* room -->

She stopped at the door.

---
<!-- continuity notes follow -->
"#;

#[test]
fn test_parses_title_and_metadata() {
  let draft = parse_draft(FULL_DRAFT).expect("draft has a title");
  assert_eq!(draft.chapter_num, 5);
  assert_eq!(draft.chapter_title, "The Mirror Room");
  assert_eq!(draft.arc_num, 2);
  assert_eq!(draft.pov, "Sūrya + VEDA");
  assert_eq!(draft.location, "Station Halley");
  assert_eq!(draft.timeline, "Year 3, winter");
}

#[test]
fn test_scaffolding_is_removed_and_markers_kept() {
  let draft = parse_draft(FULL_DRAFT).unwrap();
  assert_eq!(
    draft.prose,
    "The corridor hummed.\n\n<!-- @illust full: mirror-room | The *mirror* \
     room -->\n\nShe stopped at the door.\n"
  );
}

#[test]
fn test_missing_title_is_not_a_chapter() {
  assert!(parse_draft("Just some notes.\n\n<!-- Arc: 1 | POV: Kael | Location: x | Timeline: y -->").is_none());
  assert!(parse_draft("## Chapter 1: Not a title\n").is_none());
}

#[test]
fn test_missing_metadata_uses_defaults() {
  let draft = parse_draft("# Chapter 9: Quiet\n\nNothing here.\n").unwrap();
  assert_eq!(draft.arc_num, 1);
  assert_eq!(draft.pov, UNKNOWN);
  assert_eq!(draft.location, UNKNOWN);
  assert_eq!(draft.timeline, UNKNOWN);
}

#[test]
fn test_canonical_example() {
  let draft = parse_draft("# Chapter 3: Test\n\nHello *world*.\n").unwrap();
  assert_eq!(draft.chapter_num, 3);
  assert_eq!(draft.chapter_title, "Test");
  assert_eq!(draft.prose, "Hello *world*.\n");
}

#[test]
fn test_first_metadata_comment_wins() {
  let content = "# Chapter 1: A\n<!-- Arc: 4 | POV: Moss | Location: L1 | Timeline: T1 -->\n<!-- Arc: 6 | POV: Kael | Location: L2 | Timeline: T2 -->\nText.\n";
  let draft = parse_draft(content).unwrap();
  assert_eq!(draft.arc_num, 4);
  assert_eq!(draft.pov, "Moss");
}

#[test]
fn test_title_only_draft_has_empty_prose() {
  let draft = parse_draft("# Chapter 2: Empty\n<!-- todo -->\n").unwrap();
  assert_eq!(draft.prose, "");
}

#[test]
fn test_parse_draft_file() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("chapter-01.draft.md");
  fs::write(&path, "# Chapter 1: Start\n\nGo.\n").unwrap();

  let draft = parse_draft_file(&path).unwrap().expect("chapter");
  assert_eq!(draft.chapter_num, 1);
  assert_eq!(draft.prose, "Go.\n");

  let notes = dir.path().join("notes.md");
  fs::write(&notes, "no heading").unwrap();
  assert!(parse_draft_file(&notes).unwrap().is_none());

  assert!(parse_draft_file(&dir.path().join("missing.md")).is_err());
}
