use std::process::ExitCode;

use color_eyre::eyre::Result;
use quire::{cli::Cli, commands};

fn main() -> Result<ExitCode> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(cli.verbosity.log_level_filter())
    .format_timestamp(None)
    .init();

  commands::run(&cli)
}
