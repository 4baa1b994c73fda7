//! Command handlers. Each returns the process exit code for outcomes that are
//! not errors: pending changes, lint findings, failed checks.
use std::{
  io::{self, IsTerminal, Write},
  path::{Path, PathBuf},
  process::ExitCode,
};

use color_eyre::eyre::{Context, Result, bail};
use quire_config::{ThemeMap, ToolConfig, themes::THEMES_PATH};
use quire_editorial::{PacketOptions, QcInputs};

use crate::cli::{Cli, Commands, PacketIncludes};

/// Path relative to the book root when it lies inside it.
fn display_path(root: &Path, path: &Path) -> String {
  path
    .strip_prefix(root)
    .unwrap_or(path)
    .display()
    .to_string()
}

const fn exit_code(ok: bool) -> ExitCode {
  if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn load_config(cli: &Cli) -> Result<ToolConfig> {
  ToolConfig::load(&cli.root, &cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")
}

/// Run the command selected on the command line.
///
/// # Errors
///
/// Returns an error for anything that stops a command from running: bad
/// configuration, missing inputs, invalid plans, unwritable outputs.
pub fn run(cli: &Cli) -> Result<ExitCode> {
  let root = cli.root.as_path();
  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => init(&root.join(output), format, *force),
    Commands::Build { jobs } => {
      let mut config = load_config(cli)?;
      if jobs.is_some() {
        config.jobs = *jobs;
      }
      build(root, &config)
    },
    Commands::Render { chapter } => render(chapter, &load_config(cli)?),
    Commands::Insert { plan, write } => insert(root, plan, *write),
    Commands::Lint { paths } => lint(paths),
    Commands::Qc { src, mt, cfg, json } => {
      let inputs = QcInputs {
        source:      src.clone(),
        translation: mt.clone(),
        pipeline:    root.join(cfg),
      };
      qc(root, &inputs, *json)
    },
    Commands::Cards => {
      let (path, count) = quire_storyos::cards::write_cards(root)?;
      writeln!(
        io::stdout().lock(),
        "Wrote {} ({count} chapters)",
        display_path(root, &path)
      )?;
      Ok(ExitCode::SUCCESS)
    },
    Commands::Prompts => {
      let (path, count) = quire_storyos::prompts::write_prompts(root)?;
      writeln!(
        io::stdout().lock(),
        "Wrote {} ({count} chapters)",
        display_path(root, &path)
      )?;
      Ok(ExitCode::SUCCESS)
    },
    Commands::Sigils => sigils(root, &load_config(cli)?),
    Commands::Storyos { check } => storyos(root, &load_config(cli)?, *check),
    Commands::Packet {
      role,
      chapter,
      include,
    } => packet(root, role, chapter, *include),
  }
}

fn init(output: &Path, format: &str, force: bool) -> Result<ExitCode> {
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }
  ToolConfig::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;
  log::info!(
    "Configuration file created successfully. Edit it to customize the build."
  );
  Ok(ExitCode::SUCCESS)
}

fn build(root: &Path, config: &ToolConfig) -> Result<ExitCode> {
  let threads = config.jobs.unwrap_or_else(num_cpus::get);
  rayon::ThreadPoolBuilder::new()
    .num_threads(threads)
    .build_global()
    .wrap_err("Failed to set up the thread pool")?;

  let report =
    quire_html::build_site(root, config, io::stderr().is_terminal())?;
  for path in &report.skipped {
    log::warn!("Skipped {}", display_path(root, path));
  }
  Ok(ExitCode::SUCCESS)
}

fn render(chapter: &Path, config: &ToolConfig) -> Result<ExitCode> {
  let Some(html) = quire_html::site::render_draft_body(chapter, config)? else {
    log::error!("{} has no chapter heading", chapter.display());
    return Ok(ExitCode::FAILURE);
  };
  writeln!(io::stdout().lock(), "{html}")?;
  Ok(ExitCode::SUCCESS)
}

fn insert(root: &Path, plan: &Path, write: bool) -> Result<ExitCode> {
  let changes = quire_editorial::run_plan(root, plan, write)?;
  let mut out = io::stdout().lock();
  let mut pending = false;
  for change in &changes {
    let path = display_path(root, &change.path);
    if !change.is_changed() {
      writeln!(out, "{path}: up to date")?;
    } else if write {
      writeln!(out, "{path}: applied {} inserts", change.applied)?;
    } else {
      pending = true;
      writeln!(out, "{path}: {} inserts pending", change.applied)?;
    }
  }
  Ok(exit_code(!pending))
}

fn lint(paths: &[PathBuf]) -> Result<ExitCode> {
  let mut out = io::stdout().lock();
  let mut clean = true;
  for path in paths {
    let report = quire_editorial::lint_file(path)?;
    let (chapter, title) = report
      .chapter
      .map_or_else(|| ("?".to_string(), String::new()), |(n, t)| {
        (n.to_string(), t)
      });
    writeln!(out, "\n{}", path.display())?;
    writeln!(out, "  Chapter: {chapter}  Title: {title}")?;
    writeln!(out, "  Arc: {}  POV: {}", report.meta.arc_num, report.meta.pov)?;
    writeln!(out, "  Words: {}", report.words)?;
    if report.findings.is_empty() {
      writeln!(out, "  Findings: none")?;
      continue;
    }
    clean = false;
    writeln!(out, "  Findings: {}", report.findings.len())?;
    for finding in &report.findings {
      writeln!(out, "    {finding}")?;
    }
  }
  Ok(exit_code(clean))
}

fn qc(root: &Path, inputs: &QcInputs, json: bool) -> Result<ExitCode> {
  let report = quire_editorial::run_qc(root, inputs)?;
  let mut out = io::stdout().lock();
  if json {
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
  } else if report.ok {
    writeln!(out, "OK")?;
  } else {
    for issue in &report.issues {
      writeln!(out, "{issue}")?;
    }
  }
  Ok(exit_code(report.ok))
}

fn sigils(root: &Path, config: &ToolConfig) -> Result<ExitCode> {
  let themes = ThemeMap::load(root).wrap_err("Failed to load the theme map")?;
  if themes.is_empty() {
    bail!("No chapter themes found in {THEMES_PATH}");
  }
  let sigil_dir = root.join(ToolConfig::root_relative(&config.sigil_base));
  let written =
    quire_html::placeholder::write_placeholders(&sigil_dir, &themes)?;
  writeln!(
    io::stdout().lock(),
    "Wrote {} sigils to {}",
    written.len(),
    display_path(root, &sigil_dir)
  )?;
  Ok(ExitCode::SUCCESS)
}

fn storyos(root: &Path, config: &ToolConfig, check: bool) -> Result<ExitCode> {
  let mut out = io::stdout().lock();
  if check {
    let errors = quire_storyos::check(root, config)?;
    if errors.is_empty() {
      writeln!(out, "Validation passed.")?;
      return Ok(ExitCode::SUCCESS);
    }
    writeln!(out, "Validation failed with {} errors:", errors.len())?;
    for error in &errors {
      writeln!(out, "  ERROR: {error}")?;
    }
    return Ok(ExitCode::FAILURE);
  }

  let report = quire_storyos::build(root, config)?;
  for path in &report.written {
    writeln!(out, "Wrote {}", display_path(root, path))?;
  }
  writeln!(
    out,
    "  {} chapters, {} docs indexed, {} HTML files",
    report.chapters, report.docs, report.drafted
  )?;
  Ok(ExitCode::SUCCESS)
}

fn packet(
  root: &Path,
  role: &str,
  chapter: &Path,
  include: PacketIncludes,
) -> Result<ExitCode> {
  let packet = quire_editorial::build_packet(root, role, chapter, PacketOptions {
    include_style: include.include_style,
    include_world: include.include_world,
    include_lang:  include.include_lang,
  })?;
  write!(io::stdout().lock(), "{packet}")?;
  Ok(ExitCode::SUCCESS)
}
