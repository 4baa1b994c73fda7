pub mod chapter;
pub mod index;
pub mod placeholder;
pub mod sigil;
pub mod site;
pub mod template;
pub mod toc;

pub use site::{BuildReport, build_site, collect_drafts};
