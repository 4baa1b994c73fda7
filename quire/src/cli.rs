use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use quire_editorial::{inserts::DEFAULT_PLAN_PATH, packet};

/// Command line interface for quire
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "quire: drafts in, books out",
  propagate_version = true
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  #[command(flatten)]
  pub verbosity: Verbosity<InfoLevel>,

  /// Root directory of the book.
  #[arg(long, global = true, default_value = ".")]
  pub root: PathBuf,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Later files override earlier ones.
  #[arg(short = 'c', long = "config-file", global = true, action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// Optional canon sections of an agent packet.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PacketIncludes {
  /// Include the style guide.
  #[arg(long)]
  pub include_style: bool,

  /// Include the world rules.
  #[arg(long)]
  pub include_world: bool,

  /// Include the language canon.
  #[arg(long)]
  pub include_lang: bool,
}

/// All supported subcommands for the quire CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Write a default tool configuration file.
  Init {
    /// Path of the configuration file, relative to the book root.
    #[arg(short, long, default_value = "quire.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Render every chapter and the table of contents.
  Build {
    /// Number of threads to use for rendering.
    #[arg(short = 'p', long)]
    jobs: Option<usize>,
  },

  /// Print the body HTML of one draft.
  Render {
    /// Draft file to render.
    #[arg(long)]
    chapter: PathBuf,
  },

  /// Apply a visual-insert plan to drafts. Without `--write` this is a dry
  /// run that fails when changes are pending.
  Insert {
    /// Plan file, relative to the book root.
    #[arg(long, default_value = DEFAULT_PLAN_PATH)]
    plan: PathBuf,

    /// Rewrite drafts in place.
    #[arg(long)]
    write: bool,
  },

  /// Lint drafts for banned words and style limits.
  Lint {
    /// Draft files to lint.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
  },

  /// Check a translation against its source draft.
  Qc {
    /// Source draft.
    #[arg(long)]
    src: PathBuf,

    /// Translated draft.
    #[arg(long)]
    mt: PathBuf,

    /// Translation pipeline config, relative to the book root.
    #[arg(long, default_value = quire_editorial::qc::PIPELINE_PATH)]
    cfg: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
  },

  /// Build chapter cards from the outline.
  Cards,

  /// Build visual prompts from the outline.
  Prompts,

  /// Write placeholder chapter sigils from the theme map.
  Sigils,

  /// Build the StoryOS dashboard.
  Storyos {
    /// Only validate; fail on any error.
    #[arg(long)]
    check: bool,
  },

  /// Print an agent packet for one chapter.
  Packet {
    /// Reviewing role.
    #[arg(long, value_parser = role_names())]
    role: String,

    /// Draft file.
    #[arg(long)]
    chapter: PathBuf,

    #[command(flatten)]
    include: PacketIncludes,
  },
}

fn role_names() -> clap::builder::PossibleValuesParser {
  clap::builder::PossibleValuesParser::new(packet::role_names())
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
