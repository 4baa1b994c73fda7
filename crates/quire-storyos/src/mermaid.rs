//! Mermaid diagrams for the dashboard.
use std::sync::LazyLock;

use quire_prose::utils::compile;
use regex::Regex;
use serde_json::Value;

use crate::{
  sources::ButterflyGraph,
  value::{chapter_range, int_field, text_field},
};

const LABEL_CHARS: usize = 40;

static NON_WORD_RE: LazyLock<Regex> =
  LazyLock::new(|| compile("NON_WORD", r"\W+"));

/// How the book's tools feed each other.
#[must_use]
pub fn pipeline() -> String {
  [
    "graph LR",
    r#"  draft[".draft.md"] --> build["quire build"]"#,
    r#"  build --> html[".html chapters"]"#,
    r#"  build --> index["index.html"]"#,
    r#"  outline["CHAPTERS.md"] --> cards_cmd["quire cards"]"#,
    r#"  themes["chapter-svg-themes.yaml"] --> cards_cmd"#,
    r#"  cards_cmd --> cards["chapter-cards.yaml"]"#,
    r#"  storyos_yaml["storyos.yaml"] --> storyos["quire storyos"]"#,
    r#"  entities["entities.yaml"] --> storyos"#,
    "  cards --> storyos",
    r#"  storyos --> json["storyos.json"]"#,
    r#"  storyos --> md["storyos.md"]"#,
  ]
  .join("\n")
}

/// Arcs as subgraphs of their chapters, each arc linked from the last
/// chapter of the one before.
#[must_use]
pub fn arc_map(arcs: &[Value], chapters: &[Value]) -> String {
  let mut lines = vec!["graph TD".to_string()];
  let mut previous_hi = None;

  for arc in arcs {
    let id = text_field(arc, "id");
    let title = text_field(arc, "title");
    let range = chapter_range(arc);
    lines.push(format!(r#"  subgraph arc{id}["Arc {id}: {title}"]"#));
    if let Some((lo, hi)) = range {
      for chapter in chapters {
        let Some(number) = int_field(chapter, "chapter") else {
          continue;
        };
        if (lo..=hi).contains(&number) {
          let pov = match text_field(chapter, "pov") {
            pov if pov.is_empty() => "?".to_string(),
            pov => pov,
          };
          lines.push(format!(r#"    ch{number}["Ch {number}: {pov}"]"#));
        }
      }
    }
    lines.push("  end".to_string());

    if let (Some(prev), Some((lo, _))) = (previous_hi, range) {
      lines.push(format!("  ch{prev} --> ch{lo}"));
    }
    previous_hi = range.map(|(_, hi)| hi);
  }
  lines.join("\n")
}

/// Mermaid-safe id of a graph node: `1.3` becomes `n1_3`, backstory nodes
/// become `n_back_…`.
#[must_use]
pub fn node_id(raw: &str) -> String {
  if raw.starts_with("BACKSTORY") {
    format!("n_back_{}", NON_WORD_RE.replace_all(raw, "_").trim_matches('_'))
  } else {
    format!("n{}", raw.replace('.', "_"))
  }
}

fn truncate_label(label: &str) -> String {
  if label.chars().count() <= LABEL_CHARS {
    label.to_string()
  } else {
    let head: String = label.chars().take(LABEL_CHARS - 3).collect();
    format!("{head}...")
  }
}

/// Causal chains as subgraphs. Edges come after every subgraph so that
/// cross-chain edges resolve.
#[must_use]
pub fn butterfly(graph: &ButterflyGraph) -> String {
  let mut lines = vec!["graph TD".to_string()];
  for (id, chain) in &graph.chains {
    lines.push(format!(r#"  subgraph {id}["{id}: {}"]"#, chain.title));
    for node in &chain.nodes {
      let label = truncate_label(&node.label).replace('"', "'");
      lines.push(format!(
        r#"    {}["{}: {label}"]"#,
        node_id(&node.id),
        node.id
      ));
    }
    lines.push("  end".to_string());
  }
  for chain in graph.chains.values() {
    for edge in &chain.edges {
      lines.push(format!("  {} --> {}", node_id(&edge.from), node_id(&edge.to)));
    }
  }
  lines.join("\n")
}
