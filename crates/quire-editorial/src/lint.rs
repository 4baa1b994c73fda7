//! Prose lint: banned words and clichés, plus a few per-chapter counts.
use std::{fmt, path::Path, sync::LazyLock};

use quire_prose::{
  DraftMeta,
  draft::{extract_metadata, extract_title},
  utils::compile,
};
use quire_storyos::World;
use regex::Regex;

use crate::{error::Result, files::read_file};

const EXCERPT_CHARS: usize = 160;
const MAX_WHISPERED: usize = 2;
const MAX_EXCLAMATIONS: usize = 5;

const FORBIDDEN: [(&str, &str, &str); 11] = [
  ("SUDDENLY", r"(?i)\bsuddenly\b", r#"Banned: "suddenly""#),
  ("VERY", r"(?i)\bvery\b", r#"Banned: "very""#),
  ("REALLY", r"(?i)\breally\b", r#"Banned: "really""#),
  ("BEGAN_TO", r"(?i)\bbegan to\b", r#"Banned: "began to""#),
  ("STARTED_TO", r"(?i)\bstarted to\b", r#"Banned: "started to""#),
  ("SEEMED_TO", r"(?i)\bseemed to\b", r#"Banned: "seemed to""#),
  ("APPEARED_TO", r"(?i)\bappeared to\b", r#"Banned: "appeared to""#),
  ("CHILL", r"(?i)a chill ran down", "Banned cliche: chill/spine"),
  (
    "BREATH",
    r"(?i)let out a breath",
    "Banned cliche: breath (didn't know holding)",
  ),
  ("ORBS", r"(?i)\borbs\b", r#"Banned: "orbs""#),
  ("SMIRKED", r"(?i)\bsmirked\b", r#"Banned dialogue tag: "smirked""#),
];

static FORBIDDEN_RES: LazyLock<Vec<(Regex, &'static str)>> =
  LazyLock::new(|| {
    FORBIDDEN
      .iter()
      .map(|(name, pattern, message)| (compile(name, pattern), *message))
      .collect()
  });

static WHISPERED_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("WHISPERED", r"(?i)\bwhispered\b"));

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| compile("WORD", r"\b\w+\b"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
  Forbidden,
  Style,
}

impl fmt::Display for FindingKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Forbidden => "forbidden",
      Self::Style => "style",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
  /// 1-based line, or `None` for whole-chapter findings.
  pub line:    Option<usize>,
  pub kind:    FindingKind,
  pub message: String,
  pub excerpt: String,
}

impl fmt::Display for Finding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let location = self
      .line
      .map_or_else(|| "-".to_string(), |line| format!("L{line}"));
    write!(f, "[{}] {location}: {}", self.kind, self.message)?;
    if !self.excerpt.is_empty() {
      write!(f, " :: {}", self.excerpt)?;
    }
    Ok(())
  }
}

/// Lint result of one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintReport {
  pub chapter:  Option<(u32, String)>,
  pub meta:     DraftMeta,
  pub words:    usize,
  pub findings: Vec<Finding>,
}

fn excerpt(line: &str) -> String {
  let line = line.trim();
  if line.chars().count() > EXCERPT_CHARS {
    let head: String = line.chars().take(EXCERPT_CHARS - 3).collect();
    format!("{head}...")
  } else {
    line.to_string()
  }
}

fn chapter_finding(message: String) -> Finding {
  Finding {
    line: None,
    kind: FindingKind::Style,
    message,
    excerpt: String::new(),
  }
}

/// Lint draft text. Lines containing an HTML comment are not prose and are
/// skipped.
#[must_use]
pub fn lint_text(content: &str) -> LintReport {
  let meta = extract_metadata(content);
  let mut findings = Vec::new();
  let mut whispered = 0;
  let mut exclamations = 0;
  let mut semicolons = 0;

  for (number, line) in content.lines().enumerate() {
    if line.contains("<!--") {
      continue;
    }
    whispered += WHISPERED_RE.find_iter(line).count();
    exclamations += line.matches('!').count();
    semicolons += line.matches(';').count();

    for (re, message) in FORBIDDEN_RES.iter() {
      if re.is_match(line) {
        findings.push(Finding {
          line:    Some(number + 1),
          kind:    FindingKind::Forbidden,
          message: (*message).to_string(),
          excerpt: excerpt(line),
        });
      }
    }
  }

  if whispered > MAX_WHISPERED {
    findings.push(chapter_finding(format!(
      r#"Overuse: "whispered" occurs {whispered}x (style guide: <= {MAX_WHISPERED}x/chapter)."#
    )));
  }
  if exclamations > MAX_EXCLAMATIONS {
    findings.push(chapter_finding(format!(
      "High exclamation count: {exclamations} occurrences. Consider reducing \
       narration exclamation marks."
    )));
  }
  if semicolons > 0 && World::from_pov(&meta.pov) == World::Continental {
    findings.push(chapter_finding(format!(
      "Continental POV semicolons: {semicolons} occurrences (style guide: \
       avoid semicolons in Continental chapters)."
    )));
  }

  LintReport {
    chapter: extract_title(content),
    meta,
    words: WORD_RE.find_iter(content).count(),
    findings,
  }
}

/// Lint a draft file.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be read.
pub fn lint_file(path: &Path) -> Result<LintReport> {
  Ok(lint_text(&read_file(path)?))
}
