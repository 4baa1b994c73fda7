//! Page templates, embedded or overridden from the book's template directory.
use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use quire_config::ToolConfig;
use quire_templates as templates;
use tera::Tera;

/// Compiled page templates plus the reader script.
#[derive(Debug)]
pub struct Templates {
  tera:   Tera,
  script: String,
}

/// Read `name` from `dir` if it exists there, else use `fallback`.
fn template_content(
  dir: Option<&Path>,
  name: &str,
  fallback: &str,
) -> Result<String> {
  if let Some(dir) = dir {
    let path = dir.join(name);
    if path.is_file() {
      log::debug!("Using template override {}", path.display());
      return fs::read_to_string(&path).wrap_err_with(|| {
        format!("Failed to read template file: {}", path.display())
      });
    }
  }
  Ok(fallback.to_string())
}

impl Templates {
  /// The embedded templates.
  ///
  /// # Errors
  ///
  /// Returns an error if an embedded template fails to compile.
  pub fn embedded() -> Result<Self> {
    Self::from_dir(None)
  }

  /// Templates for the book at `root`, honouring `template_dir`.
  ///
  /// # Errors
  ///
  /// Returns an error if an override cannot be read or a template fails to
  /// compile.
  pub fn load(root: &Path, config: &ToolConfig) -> Result<Self> {
    let dir = config.template_dir.as_ref().map(|d| root.join(d));
    Self::from_dir(dir.as_deref())
  }

  fn from_dir(dir: Option<&Path>) -> Result<Self> {
    let mut tera = Tera::default();

    // Names without an .html suffix keep tera from autoescaping; values are
    // escaped before they reach the context.
    let chapter =
      template_content(dir, "chapter.html", templates::CHAPTER_TEMPLATE)?;
    tera
      .add_raw_template("chapter", &chapter)
      .wrap_err("Failed to compile chapter template")?;

    let index = template_content(dir, "index.html", templates::INDEX_TEMPLATE)?;
    tera
      .add_raw_template("index", &index)
      .wrap_err("Failed to compile index template")?;

    let script = template_content(dir, "chapter.js", templates::CHAPTER_JS)?;

    Ok(Self {
      tera,
      script: script.trim_end().to_string(),
    })
  }

  /// Render the chapter page template.
  ///
  /// # Errors
  ///
  /// Returns an error if rendering fails.
  pub fn render_chapter(&self, context: &tera::Context) -> Result<String> {
    self
      .tera
      .render("chapter", context)
      .wrap_err("Failed to render chapter template")
  }

  /// Render the table of contents template.
  ///
  /// # Errors
  ///
  /// Returns an error if rendering fails.
  pub fn render_index(&self, context: &tera::Context) -> Result<String> {
    self
      .tera
      .render("index", context)
      .wrap_err("Failed to render index template")
  }

  /// The reader script inlined into every chapter page.
  #[must_use]
  pub fn script(&self) -> &str {
    &self.script
  }
}
