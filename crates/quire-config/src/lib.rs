pub mod book;
pub mod config;
pub mod error;
pub mod templates;
pub mod themes;

pub use book::BookConfig;
pub use config::ToolConfig;
pub use error::ConfigError;
pub use themes::{ChapterTheme, SigilEntry, SigilStyle, ThemeMap};
