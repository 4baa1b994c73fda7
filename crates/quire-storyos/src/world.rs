use std::fmt;

use serde::Serialize;

/// Which side of the story a chapter is told from, guessed from its POV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum World {
  Continental,
  Antarctic,
  Dual,
}

impl World {
  /// Case-insensitive guess: Sūrya is antarctic, Kael and Moss are
  /// continental, anyone else is dual.
  #[must_use]
  pub fn from_pov(pov: &str) -> Self {
    let pov = pov.to_lowercase();
    if pov.contains("sūrya") || pov.contains("surya") {
      Self::Antarctic
    } else if pov.contains("kael") || pov.contains("moss") {
      Self::Continental
    } else {
      Self::Dual
    }
  }

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Continental => "continental",
      Self::Antarctic => "antarctic",
      Self::Dual => "dual",
    }
  }

  /// Prose register the chapter is written in.
  #[must_use]
  pub const fn register_hint(self) -> &'static str {
    match self {
      Self::Continental => {
        "earthy, bodily, jagged sentences, glass/sea metaphors"
      },
      Self::Antarctic => {
        "clean cadence, precise diction, geometry/light metaphors"
      },
      Self::Dual => {
        "contrast: warm grit vs clean geometry; show translation loss"
      },
    }
  }

  /// Setting and camera direction for image and video prompts.
  #[must_use]
  pub const fn visual_tags(self) -> (&'static str, &'static str) {
    match self {
      Self::Antarctic => {
        (
          "Antarctic sealed habitat, clean geometry, diffuse light, \
           minimalism, mesh-era hard sci-fi",
          "slow, stable camera, centered composition, quiet precision",
        )
      },
      Self::Continental => {
        (
          "post-collapse coastal city-state, hand-made tools, weathered \
           ruins, dust motes, salt air, hard sci-fi realism",
          "cinematic 35mm look, tactile texture, shallow depth of field",
        )
      },
      Self::Dual => {
        (
          "two worlds colliding, warm grit against cold geometry, \
           translation distortion motif, hard sci-fi realism",
          "balanced composition with deliberate misalignment \
           (refraction/offset)",
        )
      },
    }
  }
}

impl fmt::Display for World {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
