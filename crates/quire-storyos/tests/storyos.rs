#![allow(clippy::expect_used, clippy::unwrap_used, reason = "Fine in tests")]
use std::{fs, path::Path};

use quire_config::ToolConfig;
use quire_storyos::{
  JSON_PATH,
  MARKDOWN_PATH,
  build,
  cards::{CARDS_PATH, write_cards},
  check,
  prompts::{PROMPTS_PATH, write_prompts},
};
use serde_json::Value;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn config(total: u32) -> ToolConfig {
  ToolConfig {
    total_chapters: total,
    ..ToolConfig::default()
  }
}

const OUTLINE: &str = r#"# Chapters

### Chapter 1: "The Silence"

**POV:** Kael · **Location:** Glass Coast · **Timeline:** Day 1

**Word count:** 4,500

**Beat 1 — Morning.** The sea is wrong.

**CHAPTER HOOK:** The bells stop.

### Chapter 2: "The Signal"

**POV:** Sūrya · **Location:** Halley · **Timeline:** Day 3

**CHAPTER HOOK:** Someone answers.
"#;

fn sample_book() -> TempDir {
  let dir = TempDir::new().unwrap();
  let root = dir.path();
  write(root, "book.yaml", "title: The Butterfly Effect\n");
  write(root, "outline/CHAPTERS.md", OUTLINE);
  write(
    root,
    "style/chapter-svg-themes.yaml",
    "chapters:\n  - chapter: 1\n    id: ch01\n    motif: stopped bell\n    \
     theme_keywords: [silence, salt]\n",
  );
  write(
    root,
    "schema/storyos.yaml",
    "meta:\n  version: 1\nbook:\n  working_title: Butterfly\narcs:\n  - id: \
     1\n    title: The Silence\n    chapter_range: [1, 2]\n    purpose: \
     Setup\nthreads:\n  - id: bells\n    title: The bells\n    status: \
     open\npromises:\n  - id: who\n    question: Who rang?\n    status: \
     open\ndashboard_pins:\n  - Draft chapter 2\n",
  );
  write(
    root,
    "schema/entities.yaml",
    "entities:\n  characters:\n    - id: kael\n      name: Kael\n      \
     culture: coast\n      notes: [smith]\ndo_not_translate_tokens: [VEDA]\n",
  );
  write(
    root,
    "outline/ARCS.md",
    "| Arc | Title | Chapters |\n|---|---|---|\n| 1 | The Silence | 1–2 |\n",
  );
  write(
    root,
    "outline/BUTTERFLY_GRAPH.md",
    "## Chain A: Bells\n\n```\n[1.1] Bell cracks\n→ [2.1] Signal \
     heard\n```\n\n## Cross-Chapter Dependency Matrix\n\n| Chapter | Depends \
     on | Feeds into |\n|---|---|---|\n| 2.1 | 1.1 | 3.2 |\n",
  );
  write(
    root,
    "review/continuity-log.md",
    "### Chapter 1\n\n**Promises to reader:**\n- Who rang the bell?\n",
  );
  write(root, "review/revision-queue.md", "- [ ] tighten ch1\n- [x] name the bell\n");
  write(root, "manuscript/arc-1/chapter-01.html", "<html></html>");
  write(root, "manuscript/arc-1/01.draft.md", "# Chapter 1: The Silence\n");
  write(root, ".venv/lib/README.md", "# ignored\n");
  write(root, "README.md", "# Book\n\nA story about *bells*.\n");
  dir
}

#[test]
fn test_cards_carry_outline_world_and_theme() {
  let book = sample_book();
  let (path, count) = write_cards(book.path()).unwrap();
  assert_eq!(path, book.path().join(CARDS_PATH));
  assert_eq!(count, 2);

  let cards: serde_yaml::Value =
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap();
  let first = &cards["chapters"][0];
  assert_eq!(first["title"].as_str(), Some("The Silence"));
  assert_eq!(first["world"].as_str(), Some("continental"));
  assert_eq!(first["word_count_target"].as_str(), Some("4500"));
  assert_eq!(first["motif"].as_str(), Some("stopped bell"));
  assert_eq!(first["beats"][0]["title"].as_str(), Some("Morning"));
  assert_eq!(cards["chapters"][1]["world"].as_str(), Some("antarctic"));
  assert_eq!(
    cards["meta"]["generated_from"][0].as_str(),
    Some("outline/CHAPTERS.md")
  );
}

#[test]
fn test_prompts_are_written_per_chapter() {
  let book = sample_book();
  let (path, count) = write_prompts(book.path()).unwrap();
  assert_eq!(path, book.path().join(PROMPTS_PATH));
  assert_eq!(count, 2);
  let sheet: serde_yaml::Value =
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap();
  assert_eq!(sheet["meta"]["aspect_ratio_default"].as_str(), Some("16:9"));
  let scene = sheet["chapters"][1]["still"]["scene_still_prompt"]
    .as_str()
    .unwrap();
  assert!(scene.starts_with("Key moment from 'The Signal': Someone answers."));
}

#[test]
fn test_missing_outline_is_an_error() {
  let dir = TempDir::new().unwrap();
  assert!(write_cards(dir.path()).is_err());
}

#[test]
fn test_build_writes_json_and_dashboard() {
  let book = sample_book();
  let root = book.path();
  write_cards(root).unwrap();

  let report = build(root, &config(2)).unwrap();
  assert!(report.errors.is_empty(), "{:?}", report.errors);
  assert_eq!(report.chapters, 2);
  assert_eq!(report.drafted, 1);

  let json_text = fs::read_to_string(root.join(JSON_PATH)).unwrap();
  assert!(json_text.ends_with("}\n"));
  let payload: Value = serde_json::from_str(&json_text).unwrap();
  let keys: Vec<&str> = payload
    .as_object()
    .unwrap()
    .keys()
    .map(String::as_str)
    .collect();
  assert_eq!(&keys[..3], ["generated_at", "meta", "book"]);
  assert_eq!(payload["book"]["title"], "The Butterfly Effect");
  assert_eq!(payload["book"]["working_title"], "Butterfly");
  assert_eq!(payload["stats"]["revision_queue_open"], 1);
  assert_eq!(payload["stats"]["revision_queue_closed"], 1);
  assert_eq!(payload["stats"]["continuity_chapters_logged"], 1);
  assert_eq!(payload["continuity_promises"][0]["question"], "Who rang the bell?");
  assert_eq!(
    payload["butterfly_graph"]["chains"]["A"]["edges"][0]["to"],
    "2.1"
  );
  assert_eq!(
    payload["butterfly_graph"]["dependency_matrix"][0]["feeds_into"],
    "3.2"
  );

  let docs: Vec<&str> = payload["docs_index"]
    .as_array()
    .unwrap()
    .iter()
    .map(|d| d["path"].as_str().unwrap())
    .collect();
  assert!(docs.contains(&"README.md"));
  assert!(docs.contains(&"outline/CHAPTERS.md"));
  assert!(!docs.iter().any(|p| p.starts_with(".venv") || p.starts_with("manuscript")));

  let dashboard = fs::read_to_string(root.join(MARKDOWN_PATH)).unwrap();
  assert!(dashboard.starts_with("# The Butterfly Effect\n"));
  assert!(dashboard.contains("| `README.md` | A story about bells. |"));
  assert!(dashboard.contains("ch1[\"Ch 1: Kael\"]"));
  assert!(dashboard.contains("n1_1 --> n2_1"));
}

#[test]
fn test_check_reports_without_writing() {
  let book = sample_book();
  let root = book.path();
  let errors = check(root, &config(2)).unwrap();
  assert_eq!(errors, vec![
    "Expected 2 chapters in chapter-cards.yaml, found 0",
    "Required file missing: schema/chapter-cards.yaml",
  ]);
  assert!(!root.join(JSON_PATH).exists());
}

#[test]
fn test_build_writes_despite_errors() {
  let dir = TempDir::new().unwrap();
  let report = build(dir.path(), &config(1)).unwrap();
  assert!(!report.errors.is_empty());
  assert!(dir.path().join(JSON_PATH).is_file());
  assert!(dir.path().join(MARKDOWN_PATH).is_file());
}
