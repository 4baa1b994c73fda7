//! The `quire` command line. The library exposes the CLI definition for
//! `xtask` and the command handlers for tests.
pub mod cli;
pub mod commands;
