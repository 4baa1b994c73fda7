use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;

const BIN: &str = "quire";

const SHELLS: [Shell; 5] = [
  Shell::Bash,
  Shell::Zsh,
  Shell::Fish,
  Shell::PowerShell,
  Shell::Elvish,
];

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the quire CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Only generate shell completions.
    #[arg(long, conflicts_with = "manpage_only")]
    completions_only: bool,

    /// Only generate manpages.
    #[arg(long, conflicts_with = "completions_only")]
    manpage_only: bool,
  },
}

fn main() -> Result<()> {
  let Commands::Dist {
    output_dir,
    completions_only,
    manpage_only,
  } = Xtask::parse().command;

  if !manpage_only {
    generate_completions(&output_dir.join("completions"))?;
  }
  if !completions_only {
    generate_manpages(&output_dir.join("man"))?;
  }
  Ok(())
}

fn generate_completions(dir: &Path) -> Result<()> {
  fs::create_dir_all(dir)
    .with_context(|| format!("Failed to create {}", dir.display()))?;
  let mut cmd = quire::cli::Cli::command();
  for shell in SHELLS {
    generate_to(shell, &mut cmd, BIN, dir)
      .with_context(|| format!("Failed to generate {shell} completions"))?;
  }
  println!("Shell completions generated in {}", dir.display());
  Ok(())
}

fn render_manpage(cmd: Command, path: &Path) -> Result<()> {
  let mut file = fs::File::create(path).with_context(|| {
    format!("Failed to create manpage file at {}", path.display())
  })?;
  Man::new(cmd)
    .render(&mut file)
    .with_context(|| format!("Failed to render {}", path.display()))
}

/// One page for `quire` and one per subcommand, `quire-<name>.1`.
fn generate_manpages(dir: &Path) -> Result<()> {
  fs::create_dir_all(dir)
    .with_context(|| format!("Failed to create {}", dir.display()))?;
  let cmd = quire::cli::Cli::command();

  for sub in cmd.get_subcommands().filter(|s| s.get_name() != "help") {
    let path = dir.join(format!("{BIN}-{}.1", sub.get_name()));
    render_manpage(sub.clone(), &path)?;
  }
  render_manpage(cmd, &dir.join(format!("{BIN}.1")))?;

  println!("Manpages generated in {}", dir.display());
  Ok(())
}
