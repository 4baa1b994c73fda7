//! # quire-prose
//!
//! Parser and renderer for hand-written chapter drafts.
//!
//! A draft is a markdown file headed by `# Chapter N: Title`, with an
//! optional metadata comment and any amount of editorial scaffolding in HTML
//! comments. [`parse_draft`] keeps the prose (and visual-marker comments),
//! [`prose_to_html`] turns it into the body of a chapter page.
//!
//! ```rust
//! use quire_prose::{RenderOptions, parse_draft, prose_to_html};
//!
//! let draft = parse_draft("# Chapter 3: Test\n\nHello *world*.\n").unwrap();
//! assert_eq!(draft.prose, "Hello *world*.\n");
//!
//! let html = prose_to_html(&draft.prose, &RenderOptions::default());
//! assert_eq!(html, "    <p>Hello <em>world</em>.</p>");
//! ```
//!
//! ## Markers
//!
//! Artwork is referenced with comments such as
//! `<!-- @illust thumb: sky-01 | A red sky -->`. See [`marker`] for the
//! grammar and the markup each placement produces.

pub mod draft;
pub mod escape;
pub mod inline;
pub mod marker;
pub mod render;
mod types;
pub mod utils;

pub use crate::{
  draft::{parse_draft, parse_draft_file, strip_scaffolding},
  marker::{Marker, MarkerFamily, Placement},
  render::{prose_to_html, render_prose},
  types::{ChapterDraft, DraftMeta, RenderOptions, RenderedBlock, UNKNOWN},
};
