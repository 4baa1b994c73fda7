//! Placeholder chapter sigils drawn from the theme map.
//!
//! Each themed chapter gets a small line drawing picked from keywords in its
//! `svg_prompt`. The files keep the ids of the theme map, so finished art can
//! replace them one for one.
use std::{
  f64::consts::{PI, TAU},
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use html_escape::encode_double_quoted_attribute;
use quire_config::{ChapterTheme, SigilStyle, ThemeMap};

/// Drawing picked for a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motif {
  Lens,
  Grid,
  Dish,
  Ring,
  Spectacles,
  Compass,
  Ship,
  Thermometer,
  Network,
  Helix,
  Aurora,
  Eye,
  /// Broken circle, for prompts no other motif matches.
  Broken,
}

impl Motif {
  /// First motif whose keyword appears in `prompt`.
  #[must_use]
  pub fn from_prompt(prompt: &str) -> Self {
    let prompt = prompt.to_lowercase();
    let has = |word: &str| prompt.contains(word);
    if has("lens") {
      Self::Lens
    } else if has("grid") {
      Self::Grid
    } else if has("dish") {
      Self::Dish
    } else if has("12") || has("twelve") || (has("ring") && has("dot")) {
      Self::Ring
    } else if has("spectacles") {
      Self::Spectacles
    } else if has("compass") {
      Self::Compass
    } else if has("ship") {
      Self::Ship
    } else if has("thermometer") {
      Self::Thermometer
    } else if has("network") || has("node") {
      Self::Network
    } else if has("helix") || has("dna") {
      Self::Helix
    } else if has("aurora") {
      Self::Aurora
    } else if has("eye") {
      Self::Eye
    } else {
      Self::Broken
    }
  }
}

fn circle(cx: f64, cy: f64, r: f64) -> String {
  format!("<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{r:.1}\"/>")
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> String {
  format!("<line x1=\"{x1:.1}\" y1=\"{y1:.1}\" x2=\"{x2:.1}\" y2=\"{y2:.1}\"/>")
}

fn path(d: &str) -> String {
  format!("<path d=\"{d}\"/>")
}

/// `count` dots evenly spaced on a circle, starting at twelve o'clock. The dot
/// at `gap` is left out.
fn dots_ring(r: f64, count: u32, gap: Option<u32>, dot_r: f64) -> String {
  (0..count)
    .filter(|i| Some(*i) != gap)
    .map(|i| {
      let angle = f64::from(i) / f64::from(count) * TAU - PI / 2.0;
      circle(128.0 + r * angle.cos(), 128.0 + r * angle.sin(), dot_r)
    })
    .collect()
}

fn grid() -> Vec<String> {
  let mut body = Vec::new();
  for row in 0..4 {
    for col in 0..4 {
      let mut x = 56 + col * 38;
      let mut y = 56 + row * 38;
      if row == 2 && col == 2 {
        x += 8;
        y -= 6;
      }
      body.push(format!(
        "<rect x=\"{x}\" y=\"{y}\" width=\"28\" height=\"28\" rx=\"4\" \
         ry=\"4\"/>"
      ));
    }
  }
  body.push(circle(56.0, 56.0, 4.8));
  body
}

fn network() -> Vec<String> {
  let points = [
    (92.0, 92.0),
    (164.0, 92.0),
    (92.0, 164.0),
    (164.0, 164.0),
    (128.0, 128.0),
    (196.0, 140.0),
  ];
  let mut body: Vec<String> =
    points.iter().map(|&(x, y)| circle(x, y, 4.6)).collect();
  for &(x, y) in points.iter().take(4) {
    body.push(line(x, y, 128.0, 128.0));
  }
  body.push(line(164.0, 92.0, 196.0, 140.0));
  body.push(path("M 176 132 C 184 124, 196 124, 204 132"));
  body
}

/// Broken circle with a ring of nodes, one missing, and an accent stroke.
fn broken(id: &str, geometric: bool) -> Vec<String> {
  let seed = id.chars().fold(0, |acc, c| (acc + u32::from(c)) % 997);
  let mut body = vec![
    path("M 44 128 A 84 84 0 1 1 212 128"),
    path("M 44 128 A 84 84 0 0 0 194 80"),
    dots_ring(62.0, 12, Some(seed % 11 + 1), if geometric { 4.2 } else { 4.8 }),
  ];
  body.push(if geometric {
    line(92.0, 164.0, 164.0, 92.0)
  } else {
    path("M 92 168 C 112 148, 144 148, 164 128")
  });
  body
}

fn draw(motif: Motif, id: &str, geometric: bool) -> Vec<String> {
  match motif {
    Motif::Lens => {
      vec![
        circle(128.0, 128.0, 84.0),
        circle(128.0, 128.0, 62.0),
        line(188.0, 78.0, 206.0, 66.0),
        circle(96.0, 156.0, 4.6),
        circle(110.0, 170.0, 3.8),
        circle(86.0, 174.0, 3.6),
        path("M 86 128 C 104 116, 120 116, 140 128 S 172 140, 190 128"),
      ]
    },
    Motif::Grid => grid(),
    Motif::Dish => {
      vec![
        path("M 74 170 Q 128 96 182 170"),
        line(98.0, 180.0, 158.0, 180.0),
        path("M 52 108 Q 74 98 92 82"),
        path("M 44 132 Q 68 118 86 100"),
        path("M 58 152 Q 78 140 92 124"),
        circle(44.0, 132.0, 4.6),
      ]
    },
    Motif::Ring => {
      vec![
        dots_ring(78.0, 12, Some(2), 4.8),
        path("M 184 94 L 204 74"),
        path("M 204 74 L 208 96"),
      ]
    },
    Motif::Spectacles => {
      vec![
        circle(92.0, 132.0, 34.0),
        circle(164.0, 132.0, 34.0),
        line(126.0, 132.0, 130.0, 132.0),
        path("M 72 132 C 78 126, 86 126, 92 132 S 106 138, 112 132"),
        circle(164.0, 132.0, 4.8),
      ]
    },
    Motif::Compass => {
      vec![
        circle(128.0, 128.0, 86.0),
        line(128.0, 68.0, 128.0, 188.0),
        path("M 128 128 L 154 160"),
        path("M 128 128 L 102 98"),
      ]
    },
    Motif::Ship => {
      vec![
        path("M 58 176 H 198"),
        path("M 104 172 L 152 172 L 142 194 H 114 Z"),
        line(128.0, 102.0, 128.0, 172.0),
        path("M 128 112 L 154 146 L 128 146 Z"),
      ]
    },
    Motif::Thermometer => {
      vec![
        dots_ring(78.0, 12, None, 4.6),
        circle(128.0, 168.0, 10.0),
        line(128.0, 98.0, 128.0, 160.0),
        path("M 120 98 H 136"),
      ]
    },
    Motif::Network => network(),
    Motif::Helix => {
      vec![
        path("M 92 64 C 148 64, 108 128, 164 128 C 220 128, 180 192, 92 192"),
        path("M 164 64 C 108 64, 148 128, 92 128 C 36 128, 76 192, 164 192"),
        line(104.0, 92.0, 152.0, 92.0),
        line(104.0, 164.0, 152.0, 164.0),
      ]
    },
    Motif::Aurora => {
      vec![
        path("M 52 176 H 204"),
        path("M 72 80 C 92 120, 112 120, 132 80"),
        path("M 112 76 C 132 120, 152 120, 172 76"),
        path("M 92 96 C 112 132, 144 132, 164 96"),
        circle(96.0, 196.0, 4.2),
        circle(120.0, 196.0, 4.2),
      ]
    },
    Motif::Eye => {
      let mut body = vec![
        path("M 52 128 C 78 88, 178 88, 204 128 C 178 168, 78 168, 52 128 Z"),
        circle(128.0, 128.0, 18.0),
      ];
      if geometric {
        body.push(line(128.0, 92.0, 128.0, 164.0));
        body.push(path("M 128 128 L 176 108 L 176 148 Z"));
      }
      body
    },
    Motif::Broken => broken(id, geometric),
  }
}

/// Placeholder SVG for one chapter. Antarctic viewpoints get the more
/// geometric variants.
#[must_use]
pub fn placeholder_svg(theme: &ChapterTheme, style: &SigilStyle) -> String {
  let pov = theme.pov.to_lowercase();
  let geometric = pov.contains("sūrya") || pov.contains("antarctic");
  let body = draw(Motif::from_prompt(&theme.svg_prompt), &theme.id, geometric);
  let title = if theme.alt.is_empty() {
    format!("Chapter {}: {}", theme.chapter, theme.title)
  } else {
    theme.alt.clone()
  };
  format!(
    "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{}\" fill=\"none\" \
     stroke=\"currentColor\" stroke-linecap=\"round\" \
     stroke-linejoin=\"round\" stroke-width=\"{}\"><title>{}</title>{}</svg>\n",
    encode_double_quoted_attribute(&style.view_box),
    style.stroke_width,
    encode_double_quoted_attribute(&title),
    body.concat(),
  )
}

/// Write a placeholder sigil for every themed chapter with an id, plus an
/// `INDEX.md` listing them, into `sigil_dir`. Existing files are replaced.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn write_placeholders(
  sigil_dir: &Path,
  themes: &ThemeMap,
) -> Result<Vec<PathBuf>> {
  fs::create_dir_all(sigil_dir).wrap_err_with(|| {
    format!("Failed to create sigil directory {}", sigil_dir.display())
  })?;

  let mut written = Vec::new();
  let mut index = vec!["# Sigils".to_string(), String::new()];
  for theme in themes.iter() {
    if theme.id.is_empty() {
      log::warn!("Chapter {} has no sigil id, skipping", theme.chapter);
      continue;
    }
    let path = sigil_dir.join(format!("{}.svg", theme.id));
    fs::write(&path, placeholder_svg(theme, themes.style()))
      .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Wrote {}", path.display());
    index.push(format!(
      "- Chapter {:02}: `{}.svg`: {}",
      theme.chapter, theme.id, theme.title
    ));
    written.push(path);
  }

  let index_path = sigil_dir.join("INDEX.md");
  fs::write(&index_path, index.join("\n") + "\n")
    .wrap_err_with(|| format!("Failed to write {}", index_path.display()))?;
  Ok(written)
}
