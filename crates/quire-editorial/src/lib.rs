//! Editorial tools for quire books.
//!
//! - [`inserts`] places visual markers into drafts from a YAML plan;
//! - [`lint`] flags banned words and overused devices;
//! - [`qc`] compares a draft with its translation;
//! - [`packet`] bundles context for a reviewing agent.
pub mod error;
mod files;
pub mod inserts;
pub mod lint;
pub mod packet;
pub mod qc;

pub use error::{EditorialError, PlanError, Result};
pub use inserts::{DraftChange, InsertPlan, run_plan};
pub use lint::{LintReport, lint_file};
pub use packet::{PacketOptions, build_packet};
pub use qc::{QcInputs, QcReport, run_qc};
