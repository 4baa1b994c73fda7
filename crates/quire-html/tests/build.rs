#![allow(clippy::expect_used, clippy::unwrap_used, reason = "Fine in tests")]
use std::{fs, path::Path};

use quire_config::{ThemeMap, ToolConfig};
use quire_html::{
  build_site,
  collect_drafts,
  placeholder::write_placeholders,
  site::render_draft_body,
};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn sample_book() -> TempDir {
  let dir = TempDir::new().unwrap();
  let root = dir.path();
  write(
    root,
    "manuscript/arc-1/01-silence.draft.md",
    "# Chapter 1: The Silence\n<!-- Arc: 1 | POV: Kael | Location: Glass \
     Coast | Timeline: Day 1 -->\n\nThe sea was *quiet*.\n",
  );
  write(
    root,
    "manuscript/arc-1/02-signal.draft.md",
    "# Chapter 2: Static & Noise\n<!-- Arc: 2 | POV: Sūrya | Location: \
     Halley | Timeline: Day 3 -->\n\n> Listen.\n> Again.\n\n---\n\n<!-- \
     @illust full: halley-01 | The station -->\n",
  );
  write(root, "manuscript/arc-2/notes.draft.md", "Scratch notes, no heading.\n");
  write(root, "manuscript/arc-2/readme.md", "# Chapter 9: Ignored\n");
  write(
    root,
    "book.yaml",
    "title: The Butterfly Effect\nhome_label: home\n",
  );
  write(
    root,
    "style/chapter-svg-themes.yaml",
    "chapters:\n  - chapter: 1\n    id: ch01\n    alt: A closed eye\n  - \
     chapter: 2\n    id: ch02\n    alt: An antenna\n",
  );
  write(
    root,
    "assets/sigils/ch01.svg",
    "<?xml version=\"1.0\"?>\n<svg viewBox=\"0 0 1 1\"><path d=\"M0 0\"/></svg>\n",
  );
  dir
}

#[test]
fn test_collects_and_sorts_drafts() {
  let book = sample_book();
  let collected = collect_drafts(book.path(), &ToolConfig::default());
  let numbers: Vec<u32> =
    collected.chapters.iter().map(|c| c.chapter_num).collect();
  assert_eq!(numbers, vec![1, 2]);
  assert_eq!(collected.skipped.len(), 1);
  assert!(collected.skipped[0].ends_with("notes.draft.md"));
}

#[test]
fn test_build_writes_chapters_and_indexes() {
  let book = sample_book();
  let root = book.path();
  let report = build_site(root, &ToolConfig::default(), false).unwrap();

  assert_eq!(report.chapters.len(), 2);
  assert_eq!(report.indexes.len(), 2);
  assert!(root.join("manuscript/arc-1/chapter-01.html").is_file());
  // Output follows the metadata arc, not the source directory.
  assert!(root.join("manuscript/arc-2/chapter-02.html").is_file());

  let first =
    fs::read_to_string(root.join("manuscript/arc-1/chapter-01.html")).unwrap();
  assert!(first.contains(
    "<title>The Butterfly Effect — Chapter 1: The Silence</title>"
  ));
  assert!(first.contains("<a href=\"../../index.html\">← Previous</a>"));
  assert!(first.contains("<a href=\"../arc-2/chapter-02.html\">Next →</a>"));
  assert!(first.contains("<p class=\"arc-label\">Arc 1: The Silence</p>"));
  assert!(first.contains("<p class=\"chapter-meta\">Kael · Glass Coast · Day 1</p>"));
  assert!(first.contains("    <p>The sea was <em>quiet</em>.</p>"));
  assert!(first.contains(
    "<svg class=\"sigil svg-anim svg-anim-continental\" \
     data-anim=\"draw-on-scroll\""
  ));
  assert!(!first.contains("<?xml"));

  let second =
    fs::read_to_string(root.join("manuscript/arc-2/chapter-02.html")).unwrap();
  assert!(second.contains("Chapter 2<br><span class=\"chapter-title\">Static &amp; Noise</span>"));
  assert!(second.contains("<blockquote>"));
  assert!(second.contains("<hr class=\"scene-break\">"));
  assert!(second.contains("data-illust=\"halley-01\""));
  // No SVG file for this sigil, so it is referenced.
  assert!(second.contains("<img class=\"sigil\" src=\"../../assets/sigils/ch02.svg\""));
  assert!(second.contains("<a href=\"../../index.html\">Next →</a>"));
}

#[test]
fn test_index_groups_chapters_by_arc() {
  let book = sample_book();
  let root = book.path();
  build_site(root, &ToolConfig::default(), false).unwrap();

  let index = fs::read_to_string(root.join("index.html")).unwrap();
  assert!(index.contains("<h1>The Butterfly Effect</h1>"));
  assert!(index.contains("<p class=\"subtitle\">A Novel</p>"));
  assert!(index.contains("<link rel=\"stylesheet\" href=\"style/novel.css\">"));
  assert!(index.contains("home ↗</a>"));
  let arc1 = index.find("<h2>Arc 1: The Silence</h2>").unwrap();
  let arc2 = index.find("<h2>Arc 2: The Signal</h2>").unwrap();
  assert!(arc1 < arc2);
  assert!(index.contains("href=\"manuscript/arc-1/chapter-01.html\""));
  assert!(index.contains("<img class=\"sigil\" src=\"assets/sigils/ch01.svg\" alt=\"A closed eye\""));
  assert!(index.contains("<span class=\"chapter-sub\">Sūrya · Halley</span>"));

  let legacy = fs::read_to_string(root.join("build/index.html")).unwrap();
  assert!(legacy.contains("href=\"../manuscript/arc-2/chapter-02.html\""));
  assert!(legacy.contains("href=\"../style/novel.css\""));
}

#[test]
fn test_legacy_index_can_be_disabled() {
  let book = sample_book();
  let config = ToolConfig {
    legacy_index: false,
    ..Default::default()
  };
  let report = build_site(book.path(), &config, false).unwrap();
  assert_eq!(report.indexes.len(), 1);
  assert!(!book.path().join("build/index.html").exists());
}

#[test]
fn test_empty_book_still_gets_an_index() {
  let dir = TempDir::new().unwrap();
  let report = build_site(dir.path(), &ToolConfig::default(), false).unwrap();
  assert!(report.chapters.is_empty());
  let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
  assert!(!index.contains("arc-group"));
}

#[test]
fn test_render_draft_body() {
  let book = sample_book();
  let body = render_draft_body(
    &book.path().join("manuscript/arc-1/01-silence.draft.md"),
    &ToolConfig::default(),
  )
  .unwrap()
  .expect("chapter");
  assert_eq!(body, "    <p>The sea was <em>quiet</em>.</p>");

  let none = render_draft_body(
    &book.path().join("manuscript/arc-2/notes.draft.md"),
    &ToolConfig::default(),
  )
  .unwrap();
  assert!(none.is_none());
}

#[test]
fn test_placeholder_sigils_feed_the_build() {
  let book = sample_book();
  let root = book.path();
  write(
    root,
    "style/chapter-svg-themes.yaml",
    "meta:\n  viewBox: 0 0 256 256\n  svg_style_defaults:\n    \
     stroke_width: 10\nchapters:\n  - chapter: 1\n    id: ch01-lens\n    \
     title: The Silence\n    pov: Kael\n    alt: A cracked lens\n    \
     svg_prompt: A cracked lens over still water\n  - chapter: 2\n    \
     title: No id\n",
  );

  let sigil_dir = root.join("assets/sigils");
  let themes = ThemeMap::load(root).unwrap();
  let written = write_placeholders(&sigil_dir, &themes).unwrap();
  assert_eq!(written, vec![sigil_dir.join("ch01-lens.svg")]);

  let svg = fs::read_to_string(&written[0]).unwrap();
  assert!(svg.starts_with(
    "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 256 256\""
  ));
  assert!(svg.contains("stroke-width=\"10\"><title>A cracked lens</title>"));
  assert!(svg.contains("<circle cx=\"128.0\" cy=\"128.0\" r=\"84.0\"/>"));
  assert!(svg.ends_with("</svg>\n"));

  let index = fs::read_to_string(sigil_dir.join("INDEX.md")).unwrap();
  assert_eq!(
    index,
    "# Sigils\n\n- Chapter 01: `ch01-lens.svg`: The Silence\n"
  );

  build_site(root, &ToolConfig::default(), false).unwrap();
  let page =
    fs::read_to_string(root.join("manuscript/arc-1/chapter-01.html")).unwrap();
  assert!(page.contains("aria-label=\"A cracked lens\" xmlns="));
  assert!(page.contains("r=\"84.0\""));
}
