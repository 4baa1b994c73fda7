//! The StoryOS dashboard, rendered from the aggregate document.
use std::{collections::BTreeMap, fmt::Write};

use serde_json::Value;

use crate::value::{field, items, text, text_field};

const CATEGORY_ORDER: [&str; 8] = [
  "root", "bible", "outline", "review", "style", "schema", "agents", "assets",
];
const ENTITY_KINDS: [&str; 3] = ["characters", "places", "concepts"];

fn title_case(word: &str) -> String {
  let mut chars = word.chars();
  chars.next().map_or_else(String::new, |first| {
    first.to_uppercase().chain(chars).collect()
  })
}

fn prefix(text: &str, chars: usize) -> String {
  text.chars().take(chars).collect()
}

/// `value[key]` as text, or `?` when empty.
fn or_unknown(value: &Value, key: &str) -> String {
  match text_field(value, key) {
    t if t.is_empty() => "?".to_string(),
    t => t,
  }
}

fn thread_icon(status: &str) -> &'static str {
  match status {
    "open" => "🔵",
    "closed" => "✅",
    "dormant" => "💤",
    _ => "",
  }
}

fn header(out: &mut String, data: &Value) {
  let book = field(data, "book");
  let title = match text_field(book, "title") {
    t if t.is_empty() => "Untitled".to_string(),
    t => t,
  };
  let _ = writeln!(out, "# {title}");
  let subtitle = text_field(book, "subtitle");
  if !subtitle.is_empty() {
    let _ = writeln!(out, "*{subtitle}*");
  }
  out.push('\n');
  for (key, label) in [
    ("working_title", "Working title"),
    ("core_question", "Core question"),
  ] {
    let value = text_field(book, key);
    if !value.is_empty() {
      let _ = writeln!(out, "**{label}:** {value}");
    }
  }
  let generated = prefix(&text_field(data, "generated_at"), 19);
  let _ = writeln!(out, "\n*Generated {generated}Z*\n");
}

fn glance(out: &mut String, data: &Value) {
  let stats = field(data, "stats");
  let total = text_field(stats, "total_chapters");
  let _ = write!(
    out,
    "---\n## At a Glance\n\n- **Chapters planned:** {total}\n- **Chapters \
     drafted (HTML):** {}\n- **Continuity log coverage:** {}/{total} \
     chapters\n- **Revision queue:** {} open / {} closed\n\n",
    text_field(stats, "chapters_drafted"),
    text_field(stats, "continuity_chapters_logged"),
    text_field(stats, "revision_queue_open"),
    text_field(stats, "revision_queue_closed"),
  );

  let pins = items(data, "dashboard_pins");
  if !pins.is_empty() {
    out.push_str("## Dashboard Pins\n\n");
    for pin in pins {
      let _ = writeln!(out, "- {}", text(pin));
    }
    out.push('\n');
  }
}

fn docs_index(out: &mut String, data: &Value) {
  out.push_str("---\n## Docs Index\n\n");
  let mut by_category: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
  for doc in items(data, "docs_index") {
    by_category
      .entry(text_field(doc, "category"))
      .or_default()
      .push(doc);
  }

  for category in CATEGORY_ORDER {
    let Some(docs) = by_category.get_mut(category) else {
      continue;
    };
    docs.sort_by_key(|doc| text_field(doc, "path"));
    let _ = write!(
      out,
      "### {}\n\n| File | Synopsis | Last Modified |\n|------|----------|---------------|\n",
      title_case(category)
    );
    for doc in docs.iter() {
      let _ = writeln!(
        out,
        "| `{}` | {} | {} |",
        text_field(doc, "path"),
        prefix(&text_field(doc, "synopsis"), 80),
        prefix(&text_field(doc, "mtime_iso"), 10),
      );
    }
    out.push('\n');
  }
}

fn arcs_and_chapters(out: &mut String, data: &Value) {
  out.push_str("---\n## Arcs\n\n");
  for arc in items(data, "arcs") {
    let range = items(arc, "chapter_range");
    let (lo, hi) = match range {
      [lo, hi] => (text(lo), text(hi)),
      _ => ("?".to_string(), "?".to_string()),
    };
    let _ = writeln!(
      out,
      "**Arc {}: {}** (Ch {lo}--{hi}) -- {}",
      text_field(arc, "id"),
      text_field(arc, "title"),
      text_field(arc, "purpose"),
    );
  }
  out.push('\n');

  out.push_str(
    "## Chapter Table\n\n| Ch | Title | POV | World | Location | Timeline | \
     Hook |\n|----|-------|-----|-------|----------|----------|------|\n",
  );
  for chapter in items(data, "chapters") {
    let _ = writeln!(
      out,
      "| {} | {} | {} | {} | {} | {} | {} |",
      text_field(chapter, "chapter"),
      text_field(chapter, "title"),
      text_field(chapter, "pov"),
      text_field(chapter, "world"),
      text_field(chapter, "location"),
      text_field(chapter, "timeline"),
      prefix(&text_field(chapter, "hook"), 60),
    );
  }
  out.push('\n');
}

fn entities(out: &mut String, data: &Value) {
  out.push_str("---\n## Entities\n\n");
  let entities = field(data, "entities");
  for kind in ENTITY_KINDS {
    let list = items(entities, kind);
    if list.is_empty() {
      continue;
    }
    let _ = writeln!(out, "### {}\n", title_case(kind));
    for entity in list {
      let name = match text_field(entity, "name") {
        n if n.is_empty() => text_field(entity, "id"),
        n => n,
      };
      let notes = items(entity, "notes")
        .iter()
        .map(text)
        .collect::<Vec<_>>()
        .join("; ");
      let _ = writeln!(
        out,
        "- **{name}** ({}) {notes}",
        text_field(entity, "culture")
      );
    }
    out.push('\n');
  }

  let tokens = items(data, "do_not_translate_tokens");
  if !tokens.is_empty() {
    let joined = tokens
      .iter()
      .map(|t| format!("`{}`", text(t)))
      .collect::<Vec<_>>()
      .join(", ");
    let _ = writeln!(out, "### Do Not Translate\n\n{joined}\n");
  }
}

fn threads_and_promises(out: &mut String, data: &Value) {
  out.push_str("---\n## Threads\n\n");
  for thread in items(data, "threads") {
    let status = text_field(thread, "status");
    let _ = writeln!(
      out,
      "- {} **{}** ({status}) Ch {}--{}",
      thread_icon(&status),
      text_field(thread, "title"),
      or_unknown(thread, "introduced_in_chapter"),
      or_unknown(thread, "last_touched_chapter"),
    );
    let next = text_field(thread, "next_action");
    if !next.is_empty() {
      let _ = writeln!(out, "  - Next: {next}");
    }
  }
  out.push('\n');

  out.push_str(
    "## Promises\n\n| Status | Question | Introduced | Payoff Target \
     |\n|--------|----------|------------|---------------|\n",
  );
  for promise in items(data, "promises") {
    let icon = if text_field(promise, "status") == "closed" {
      "✅"
    } else {
      "🔵"
    };
    let _ = writeln!(
      out,
      "| {icon} | {} | Ch {} | Ch {} |",
      text_field(promise, "question"),
      or_unknown(promise, "introduced_in_chapter"),
      or_unknown(promise, "payoff_target_chapter"),
    );
  }
  out.push('\n');
}

fn diagrams(out: &mut String, data: &Value) {
  out.push_str("---\n## Diagrams\n\n");
  let mermaid = field(data, "mermaid");
  for (key, heading) in [
    ("pipeline", "Pipeline"),
    ("arc_map", "Arc Map"),
    ("butterfly", "Butterfly Graph"),
  ] {
    let _ = write!(
      out,
      "### {heading}\n\n```mermaid\n{}\n```\n\n",
      text_field(mermaid, key)
    );
  }
}

/// Render the aggregate document as a markdown dashboard.
#[must_use]
pub fn render_markdown(data: &Value) -> String {
  let mut out = String::new();
  header(&mut out, data);
  glance(&mut out, data);
  docs_index(&mut out, data);
  arcs_and_chapters(&mut out, data);
  entities(&mut out, data);
  threads_and_promises(&mut out, data);
  diagrams(&mut out, data);
  // Sections end in a blank line; the document ends in one newline.
  out.truncate(out.trim_end_matches('\n').len());
  out.push('\n');
  out
}
