//! Building every chapter and index of a book.
use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use quire_config::{BookConfig, ThemeMap, ToolConfig};
use quire_prose::{ChapterDraft, parse_draft_file};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::{
  chapter::{ChapterLinks, ChapterRenderer, output_path},
  index::{IndexLayout, render_index},
  template::Templates,
};

const DRAFT_SUFFIX: &str = ".draft.md";

/// What a build produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
  /// Chapter pages written, in chapter order.
  pub chapters: Vec<PathBuf>,
  /// Draft files that could not be read or had no chapter heading.
  pub skipped:  Vec<PathBuf>,
  /// Index pages written.
  pub indexes:  Vec<PathBuf>,
}

/// Drafts found under the manuscript directory.
#[derive(Debug, Default)]
pub struct CollectedDrafts {
  /// Parsed drafts, sorted by chapter number.
  pub chapters: Vec<ChapterDraft>,
  pub skipped:  Vec<PathBuf>,
}

/// Collect and parse `arc-N/*.draft.md` for every configured arc.
///
/// Arc directories are visited in order and files by name. Missing arc
/// directories are skipped, as are drafts that cannot be read or have no
/// chapter heading.
#[must_use]
pub fn collect_drafts(root: &Path, config: &ToolConfig) -> CollectedDrafts {
  let mut collected = CollectedDrafts::default();

  for arc in 1..=config.arc_count {
    let arc_dir = config.arc_dir(root, arc);
    if !arc_dir.is_dir() {
      log::debug!("No arc directory {}", arc_dir.display());
      continue;
    }

    let entries = WalkDir::new(&arc_dir)
      .min_depth(1)
      .max_depth(1)
      .sort_by_file_name()
      .into_iter()
      .filter_map(|entry| {
        entry
          .map_err(|e| log::warn!("Skipping unreadable entry: {e}"))
          .ok()
      })
      .filter(|entry| {
        entry.file_type().is_file()
          && entry.file_name().to_string_lossy().ends_with(DRAFT_SUFFIX)
      });

    for entry in entries {
      let path = entry.path();
      match parse_draft_file(path) {
        Ok(Some(draft)) => {
          log::debug!(
            "Parsed chapter {} from {}",
            draft.chapter_num,
            path.display()
          );
          collected.chapters.push(draft);
        },
        Ok(None) => {
          log::warn!("Skipping {}: no chapter heading", path.display());
          collected.skipped.push(path.to_path_buf());
        },
        Err(e) => {
          log::warn!("Skipping {}: {e}", path.display());
          collected.skipped.push(path.to_path_buf());
        },
      }
    }
  }

  collected.chapters.sort_by_key(|c| c.chapter_num);
  for pair in collected.chapters.windows(2) {
    if pair[0].chapter_num == pair[1].chapter_num {
      log::warn!(
        "Chapter {} appears more than once; both drafts are rendered",
        pair[0].chapter_num
      );
    }
  }
  collected
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
  if !show {
    return ProgressBar::hidden();
  }
  let bar = ProgressBar::new(len as u64);
  match ProgressStyle::default_bar()
    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chapters")
  {
    Ok(style) => bar.set_style(style.progress_chars("#>-")),
    Err(e) => log::debug!("Using default progress style: {e}"),
  }
  bar
}

fn write_file(path: &Path, content: &str) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory {}", parent.display())
    })?;
  }
  fs::write(path, content)
    .wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Render every chapter of the book at `root`, then its table of contents.
///
/// Chapters are rendered in parallel on the current rayon pool. Each chapter
/// writes its own file, so the result does not depend on scheduling.
///
/// # Errors
///
/// Returns an error if a template fails to compile or render, or an output
/// file cannot be written.
pub fn build_site(
  root: &Path,
  config: &ToolConfig,
  show_progress: bool,
) -> Result<BuildReport> {
  let book = BookConfig::load(root);
  let themes = ThemeMap::load_or_empty(root);
  let templates = Templates::load(root, config)?;

  let CollectedDrafts { chapters, skipped } = collect_drafts(root, config);
  log::info!("Found {} chapters", chapters.len());

  let renderer = ChapterRenderer::new(root, config, &book, &themes, &templates);
  let bar = progress_bar(chapters.len(), show_progress);

  let written = chapters
    .par_iter()
    .enumerate()
    .progress_with(bar.clone())
    .map(|(position, draft)| {
      let links =
        ChapterLinks::for_position(&chapters, position, &config.index_href);
      let html = renderer.render(draft, &links)?;
      let path = output_path(root, config, draft);
      write_file(&path, &html)?;
      log::info!(
        "Chapter {}: {} -> {}",
        draft.chapter_num,
        draft.chapter_title,
        path.display()
      );
      Ok(path)
    })
    .collect::<Result<Vec<_>>>()?;
  bar.finish_and_clear();

  let mut indexes = Vec::new();

  let index_path = root.join("index.html");
  let html = render_index(
    &templates,
    &book,
    &themes,
    &chapters,
    &IndexLayout::root(config),
  )?;
  write_file(&index_path, &html)?;
  log::info!("Index -> {}", index_path.display());
  indexes.push(index_path);

  if config.legacy_index {
    let legacy_path = root.join("build").join("index.html");
    let html = render_index(
      &templates,
      &book,
      &themes,
      &chapters,
      &IndexLayout::legacy(config),
    )?;
    write_file(&legacy_path, &html)?;
    log::info!("Index (legacy) -> {}", legacy_path.display());
    indexes.push(legacy_path);
  }

  log::info!("Done. {} chapters converted.", written.len());
  Ok(BuildReport {
    chapters: written,
    skipped,
    indexes,
  })
}

/// Body HTML of a single draft file, or `None` if it is not a chapter.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn render_draft_body(
  path: &Path,
  config: &ToolConfig,
) -> Result<Option<String>> {
  let draft = parse_draft_file(path)
    .wrap_err_with(|| format!("Failed to read draft {}", path.display()))?;
  Ok(draft.map(|d| quire_prose::prose_to_html(&d.prose, &config.render_options())))
}
