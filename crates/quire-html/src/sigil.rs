//! Chapter sigil markup.
use std::{fs, path::Path, sync::LazyLock};

use html_escape::encode_double_quoted_attribute;
use quire_config::SigilEntry;
use quire_prose::utils::compile;
use regex::{NoExpand, Regex};

static XML_DECL_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("XML_DECL", r"<\?xml[^?]*\?>"));

static SVG_OPEN_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("SVG_OPEN", r"<svg\b"));

/// Prepare SVG source for inlining: drop the XML declaration and tag the root
/// element for the draw-on-scroll animation of `world`.
#[must_use]
pub fn inline_svg(svg: &str, alt: &str, world: &str) -> String {
  let svg = XML_DECL_RE.replace_all(svg.trim(), "");
  let inject = format!(
    "<svg class=\"sigil svg-anim svg-anim-{}\" data-anim=\"draw-on-scroll\" \
     role=\"img\" aria-label=\"{}\"",
    encode_double_quoted_attribute(world),
    encode_double_quoted_attribute(alt),
  );
  SVG_OPEN_RE
    .replacen(svg.trim(), 1, NoExpand(&inject))
    .into_owned()
}

/// External `<img>` reference to a sigil under `base`.
#[must_use]
pub fn sigil_img(base: &str, sigil: &SigilEntry) -> String {
  format!(
    "<img class=\"sigil\" src=\"{}/{}.svg\" alt=\"{}\" loading=\"lazy\" \
     decoding=\"async\">",
    base,
    encode_double_quoted_attribute(&sigil.id),
    encode_double_quoted_attribute(&sigil.alt),
  )
}

/// Sigil for a chapter header: the SVG inlined from `sigil_dir` when the file
/// exists, otherwise an `<img>` under `base`. No sigil gives an empty string.
#[must_use]
pub fn chapter_sigil(
  sigil: Option<&SigilEntry>,
  sigil_dir: &Path,
  base: &str,
  world: &str,
) -> String {
  let Some(sigil) = sigil else {
    return String::new();
  };
  let path = sigil_dir.join(format!("{}.svg", sigil.id));
  match fs::read_to_string(&path) {
    Ok(svg) => inline_svg(&svg, &sigil.alt, world),
    Err(e) => {
      log::debug!("Sigil {} not inlined: {e}", path.display());
      sigil_img(base, sigil)
    },
  }
}
