use crate::error::ConfigError;

/// Default tool configuration in TOML, with a comment on every field.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# quire configuration file
#
# Paths ending in `_href` and `_base` are relative to a rendered chapter,
# which lives two directories below the book root
# (manuscript/arc-N/chapter-NN.html).

# Directory holding arc-N/*.draft.md, relative to the book root
manuscript_dir = "manuscript"

# Number of arc directories to scan
arc_count = 7

# Number of chapters the book is planned to have (used by `storyos --check`)
total_chapters = 40

# Stylesheet linked from every chapter page
style_href = "../../style/novel.css"

# Table of contents, linked from chapter navigation
index_href = "../../index.html"

# Responsive illustration variants (<id>-<width>w.avif/.webp)
illustration_base = "../../assets/illustrations"

# SVG diagrams (<id>.svg)
diagram_base = "../../assets/diagrams"

# Chapter sigils (<id>.svg)
sigil_base = "../../assets/sigils"

# Widths of the illustration variants, narrowest first
illustration_widths = [480, 768, 1200]

# Number of threads used to render chapters (defaults to number of CPU cores)
# jobs = 4

# Also write build/index.html with ../-prefixed links
legacy_index = true

# Directory with template overrides (chapter.html, index.html, chapter.js)
# template_dir = "templates"
"#;

/// Default tool configuration in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "manuscript_dir": "manuscript",
  "arc_count": 7,
  "total_chapters": 40,
  "style_href": "../../style/novel.css",
  "index_href": "../../index.html",
  "illustration_base": "../../assets/illustrations",
  "diagram_base": "../../assets/diagrams",
  "sigil_base": "../../assets/sigils",
  "illustration_widths": [480, 768, 1200],
  "legacy_index": true
}
"#;

/// Get the configuration template for `format` (`toml` or `json`).
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, ConfigError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => {
      Err(ConfigError::Template(format!(
        "Unsupported config format: {format}"
      )))
    },
  }
}
