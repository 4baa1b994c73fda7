#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use quire_prose::{RenderOptions, parse_draft, prose_to_html};

const DRAFT: &str = r#"# Chapter 7: The Crossing

<!-- Arc: 3 | POV: Kael | Location: The Shelf | Timeline: Day 12 -->
<!-- Word count target: 4,500 -->

<!--
BEATS
1. The ice speaks.
2. Kael answers.
-->

The wind came off the shelf in long, flat sheets, and the lens on Kael's
wrist fogged and cleared and fogged again.

<!-- @illust full: shelf-01 | The **shelf** at *dawn* -->

He counted the markers. Seven. There had been eight yesterday, and the one
that was missing was the one with the red flag <!-- @illust thumb: flag-02 | A red flag on ice -->.

> Ice does not lie.
> It only waits.

---

Later, the signal. It came in under the static, patient as a tide, and he
followed the <!-- @diagram link: signal-path | *path* it traced --> back
toward the station.

* * *

"Again," she said. "Once more, slowly."
"#;

fn long_prose() -> String {
  let draft = parse_draft(DRAFT).expect("bench draft parses");
  std::iter::repeat_n(draft.prose, 40)
    .collect::<Vec<_>>()
    .join("\n\n---\n\n")
}

fn bench_parse(c: &mut Criterion) {
  c.bench_function("parse_draft", |b| {
    b.iter(|| parse_draft(black_box(DRAFT)));
  });
}

fn bench_render(c: &mut Criterion) {
  let mut group = c.benchmark_group("prose_to_html");
  let options = RenderOptions::default();

  let short = parse_draft(DRAFT).expect("bench draft parses").prose;
  let long = long_prose();

  group.bench_with_input(BenchmarkId::new("chapter", "short"), &short, |b, prose| {
    b.iter(|| prose_to_html(black_box(prose), black_box(&options)));
  });

  group.bench_with_input(BenchmarkId::new("chapter", "long"), &long, |b, prose| {
    b.iter(|| prose_to_html(black_box(prose), black_box(&options)));
  });

  group.finish();
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
