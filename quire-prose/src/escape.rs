//! Protect-then-restore escaping.
//!
//! Generated markup (expanded markers) has to survive the HTML-escaping pass
//! that is applied to the surrounding prose. A [`Shield`] lifts each generated
//! fragment out of the text and leaves an opaque placeholder behind; after the
//! prose has been escaped and emphasis applied, [`Shield::release`] puts the
//! fragments back.
//!
//! Placeholders are delimited by NUL characters. [`Shield::sanitize`] strips
//! NUL from prose before any placeholder is issued, so a draft can never forge
//! one.
use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

use crate::utils::compile;

const SENTINEL: char = '\u{0}';

static PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| compile("PLACEHOLDER", r"\x00QUIRE(\d+)\x00"));

/// Holds markup fragments that must not be escaped.
#[derive(Debug, Default, Clone)]
pub struct Shield {
  fragments: Vec<String>,
}

impl Shield {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      fragments: Vec::new(),
    }
  }

  /// Remove placeholder delimiters from untrusted text.
  #[must_use]
  pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.contains(SENTINEL) {
      Cow::Owned(text.replace(SENTINEL, ""))
    } else {
      Cow::Borrowed(text)
    }
  }

  /// Store `markup` and return the placeholder that stands in for it.
  pub fn hold(&mut self, markup: String) -> String {
    let token = format!("{SENTINEL}QUIRE{}{SENTINEL}", self.fragments.len());
    self.fragments.push(markup);
    token
  }

  /// Replace every placeholder in `text` with the markup it stands for.
  ///
  /// Placeholders that this shield did not issue are dropped.
  #[must_use]
  pub fn release(&self, text: &str) -> String {
    if self.fragments.is_empty() {
      return text.to_string();
    }
    PLACEHOLDER
      .replace_all(text, |caps: &Captures| {
        caps[1]
          .parse::<usize>()
          .ok()
          .and_then(|i| self.fragments.get(i))
          .cloned()
          .unwrap_or_default()
      })
      .into_owned()
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.fragments.is_empty()
  }
}

/// Escape the characters that are significant in HTML text content.
///
/// Only `&`, `<` and `>` are touched, so plain prose comes out byte-for-byte
/// identical.
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
  html_escape::encode_text(text)
}

/// Escape a value for use inside a double-quoted attribute.
#[must_use]
pub fn escape_attr(text: &str) -> Cow<'_, str> {
  html_escape::encode_double_quoted_attribute(text)
}
