#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
use std::{fs, path::Path, process::ExitCode};

use clap::Parser;
use quire::{
  cli::{Cli, Commands},
  commands::run,
};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn cli(root: &Path, args: &[&str]) -> Cli {
  let root = root.to_str().unwrap();
  Cli::try_parse_from(
    ["quire", "--root", root].into_iter().chain(args.iter().copied()),
  )
  .unwrap()
}

const DRAFT: &str = "# Chapter 1: The Silence\n<!-- Arc: 1 | POV: Kael | \
                     Location: Glass Coast | Timeline: Day 1 -->\n\nThe sea \
                     was quiet.\n";

#[test]
fn test_global_flags_after_subcommand() {
  let cli = Cli::try_parse_from([
    "quire",
    "insert",
    "--write",
    "--root",
    "books/one",
    "--config",
    "arc_count=3",
    "-vv",
  ])
  .unwrap();
  assert_eq!(cli.root, Path::new("books/one"));
  assert_eq!(cli.config_overrides, vec!["arc_count=3"]);
  let Commands::Insert { plan, write } = &cli.command else {
    panic!("parsed {:?}", cli.command);
  };
  assert!(*write);
  assert_eq!(plan, Path::new("agents/visual/visual-inserts.yaml"));
}

#[test]
fn test_packet_role_is_checked() {
  assert!(
    Cli::try_parse_from([
      "quire",
      "packet",
      "--role",
      "critic",
      "--chapter",
      "x.md"
    ])
    .is_err()
  );
  assert!(
    Cli::try_parse_from(["quire", "packet", "--role", "eic", "--chapter", "x.md"])
      .is_ok()
  );
}

#[test]
fn test_lint_needs_paths() {
  assert!(Cli::try_parse_from(["quire", "lint"]).is_err());
}

#[test]
fn test_init_refuses_to_overwrite() {
  let dir = TempDir::new().unwrap();
  let root = dir.path();

  let code = run(&cli(root, &["init"])).unwrap();
  assert_eq!(code, ExitCode::SUCCESS);
  assert!(root.join("quire.toml").is_file());

  assert!(run(&cli(root, &["init"])).is_err());
  assert_eq!(run(&cli(root, &["init", "--force"])).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn test_insert_dry_run_fails_while_pending() {
  let dir = TempDir::new().unwrap();
  let root = dir.path();
  write(root, "manuscript/arc-1/01.draft.md", DRAFT);
  write(
    root,
    "agents/visual/visual-inserts.yaml",
    "draft_path: manuscript/arc-1/01.draft.md\ninserts:\n  - kind: illust\n    \
     type: thumb\n    id: sea-01\n    text: Quiet sea\n    apply:\n      \
     after_paragraph_including: quiet\n",
  );

  assert_eq!(run(&cli(root, &["insert"])).unwrap(), ExitCode::FAILURE);
  assert_eq!(
    run(&cli(root, &["insert", "--write"])).unwrap(),
    ExitCode::SUCCESS
  );
  assert_eq!(run(&cli(root, &["insert"])).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn test_lint_exit_codes() {
  let dir = TempDir::new().unwrap();
  let root = dir.path();
  write(root, "clean.draft.md", DRAFT);
  write(root, "noisy.draft.md", &format!("{DRAFT}\nIt was very loud.\n"));

  let clean = root.join("clean.draft.md");
  let noisy = root.join("noisy.draft.md");
  assert_eq!(
    run(&cli(root, &["lint", clean.to_str().unwrap()])).unwrap(),
    ExitCode::SUCCESS
  );
  assert_eq!(
    run(&cli(root, &["lint", clean.to_str().unwrap(), noisy.to_str().unwrap()]))
      .unwrap(),
    ExitCode::FAILURE
  );
}

#[test]
fn test_render_rejects_non_chapter() {
  let dir = TempDir::new().unwrap();
  let root = dir.path();
  write(root, "notes.md", "Just notes.\n");
  let notes = root.join("notes.md");
  assert_eq!(
    run(&cli(root, &["render", "--chapter", notes.to_str().unwrap()])).unwrap(),
    ExitCode::FAILURE
  );
}

#[test]
fn test_sigils_need_a_theme_map() {
  let dir = TempDir::new().unwrap();
  let root = dir.path();
  let err = run(&cli(root, &["sigils"])).unwrap_err();
  assert!(err.to_string().contains("No chapter themes found"));

  write(
    root,
    "style/chapter-svg-themes.yaml",
    "chapters:\n  - chapter: 3\n    id: ch03-ship\n    svg_prompt: a ship\n",
  );
  assert_eq!(run(&cli(root, &["sigils"])).unwrap(), ExitCode::SUCCESS);
  let svg = fs::read_to_string(root.join("assets/sigils/ch03-ship.svg")).unwrap();
  assert!(svg.contains("<title>Chapter 3: </title>"));
  assert!(svg.contains("<path d=\"M 58 176 H 198\"/>"));
}
