#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
use std::{fs, path::Path};

use quire_editorial::{EditorialError, PlanError, run_plan};
use tempfile::TempDir;

const DRAFT: &str = "# Chapter 3: Tide\n<!-- Arc: 1 | POV: Kael | Location: \
                     Shore | Timeline: Day 4 -->\n\nThe water drew \
                     back.\n\nGulls circled the wreck.\n\nThe bell rang \
                     twice.\n";

fn book(plan: &str) -> TempDir {
  let dir = TempDir::new().unwrap();
  let root = dir.path();
  fs::create_dir_all(root.join("manuscript/arc-1")).unwrap();
  fs::create_dir_all(root.join("agents/visual")).unwrap();
  fs::write(root.join("manuscript/arc-1/03-tide.draft.md"), DRAFT).unwrap();
  fs::write(root.join("agents/visual/visual-inserts.yaml"), plan).unwrap();
  dir
}

fn draft(root: &Path) -> String {
  fs::read_to_string(root.join("manuscript/arc-1/03-tide.draft.md")).unwrap()
}

fn plan_path() -> &'static Path {
  Path::new("agents/visual/visual-inserts.yaml")
}

const PLAN: &str = r#"
chapter: 3
draft_path: manuscript/arc-1/03-tide.draft.md
inserts:
  - kind: illust
    type: full
    id: tide-01
    text: The tide line
    apply:
      after_paragraph_including: "drew back"
  - kind: diagram
    type: thumb
    id: gulls-map
    text: Gull paths
    apply:
      after_paragraph_including: "Gulls"
  - kind: illust
    type: link
    id: bell-01
    text: rang twice
    apply:
      replace_exact: "rang twice"
  - kind: illust
    type: full
    id: opening
    text: Before everything
    apply:
      before_paragraph_including: "The water"
"#;

#[test]
fn test_plan_places_every_kind() {
  let book = book(PLAN);
  let root = book.path();
  let changes = run_plan(root, plan_path(), true).unwrap();
  assert_eq!(changes.len(), 1);
  assert_eq!(changes[0].applied, 4);

  let expected = "# Chapter 3: Tide\n<!-- Arc: 1 | POV: Kael | Location: \
                  Shore | Timeline: Day 4 -->\n\n<!-- @illust full: opening | \
                  Before everything -->\n\nThe water drew back.\n\n<!-- \
                  @illust full: tide-01 | The tide line -->\n\nGulls circled \
                  the wreck. <!-- @diagram thumb: gulls-map | Gull paths \
                  -->\n\nThe bell <!-- @illust link: bell-01 | rang twice \
                  -->.\n";
  assert_eq!(draft(root), expected);
}

#[test]
fn test_applying_twice_does_not_duplicate() {
  let book = book(PLAN);
  let root = book.path();
  run_plan(root, plan_path(), true).unwrap();
  let once = draft(root);

  let changes = run_plan(root, plan_path(), true).unwrap();
  assert_eq!(changes[0].applied, 0);
  assert!(!changes[0].is_changed());
  assert_eq!(draft(root), once);
  assert_eq!(once.matches("tide-01").count(), 1);
}

#[test]
fn test_dry_run_reports_without_writing() {
  let book = book(PLAN);
  let root = book.path();
  let changes = run_plan(root, plan_path(), false).unwrap();
  assert!(changes[0].is_changed());
  assert_eq!(draft(root), DRAFT);
}

#[test]
fn test_existing_marker_id_matches_case_insensitively() {
  let book = book(
    "draft_path: manuscript/arc-1/03-tide.draft.md\ninserts:\n  - kind: \
     illust\n    type: thumb\n    id: gulls\n    text: Gulls\n    apply:\n      \
     after_paragraph_including: Gulls\n",
  );
  let root = book.path();
  let path = root.join("manuscript/arc-1/03-tide.draft.md");
  fs::write(&path, format!("{DRAFT}\n<!-- @ILLUST Full: GULLS | Old -->\n")).unwrap();
  let changes = run_plan(root, plan_path(), false).unwrap();
  assert!(!changes[0].is_changed());
}

#[test]
fn test_ambiguous_anchor_names_draft_and_count() {
  let book = book(
    "chapters:\n  - draft_path: manuscript/arc-1/03-tide.draft.md\n    \
     inserts:\n      - kind: illust\n        type: thumb\n        id: the\n        \
     text: The\n        apply:\n          after_paragraph_including: The\n",
  );
  let root = book.path();
  let err = run_plan(root, plan_path(), true).unwrap_err();
  match &err {
    EditorialError::Insert { draft, source } => {
      assert!(draft.ends_with("03-tide.draft.md"));
      assert_eq!(*source, PlanError::AmbiguousAnchor {
        mode:   "after_paragraph_including",
        count:  2,
        anchor: "The".to_string(),
      });
    },
    other => panic!("unexpected error: {other}"),
  }
  let message = err.to_string();
  assert!(message.contains("03-tide.draft.md"));
  assert!(message.contains("matched 2 paragraphs"));
  assert_eq!(draft(root), DRAFT);
}

#[test]
fn test_occurrence_selects_a_match() {
  let book = book(
    "draft_path: manuscript/arc-1/03-tide.draft.md\ninserts:\n  - kind: \
     illust\n    type: full\n    id: second\n    text: Second\n    apply:\n      \
     before_paragraph_including: The\n      occurrence: 2\n",
  );
  let root = book.path();
  run_plan(root, plan_path(), true).unwrap();
  assert!(draft(root).contains(
    "wreck.\n\n<!-- @illust full: second | Second -->\n\nThe bell rang"
  ));
}

#[test]
fn test_replace_exact_must_match_once() {
  let book = book(
    "draft_path: manuscript/arc-1/03-tide.draft.md\ninserts:\n  - kind: \
     illust\n    type: link\n    id: the\n    text: the\n    apply:\n      \
     replace_exact: The\n",
  );
  let err = run_plan(book.path(), plan_path(), true).unwrap_err();
  assert!(err.to_string().contains("matched 2 times"), "{err}");
}

#[test]
fn test_missing_draft_is_fatal() {
  let book = book("draft_path: manuscript/arc-9/missing.draft.md\ninserts: []\n");
  let err = run_plan(book.path(), plan_path(), false).unwrap_err();
  assert!(matches!(err, EditorialError::NotFound(_)));
}

#[test]
fn test_invalid_plan_is_rejected_before_any_write() {
  let book = book(
    "chapters:\n  - draft_path: manuscript/arc-1/03-tide.draft.md\n    \
     inserts:\n      - kind: illust\n        type: full\n        id: ok\n        \
     text: Fine\n        apply: {after_paragraph_including: Gulls}\n  - \
     draft_path: manuscript/arc-1/03-tide.draft.md\n    inserts:\n      - \
     kind: illust\n        type: full\n        id: Not-Valid\n        text: \
     x\n        apply: {after_paragraph_including: Gulls}\n",
  );
  let err = run_plan(book.path(), plan_path(), true).unwrap_err();
  assert!(matches!(err, EditorialError::Plan {
    source: PlanError::InvalidId(_),
    ..
  }));
  assert_eq!(draft(book.path()), DRAFT);
}
