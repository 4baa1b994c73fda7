use regex::Regex;

/// Create a regex that never matches anything.
///
/// Used as the fallback when one of the static patterns fails to compile, so
/// a bad pattern degrades to "no match" instead of taking the build down.
#[must_use]
#[allow(
  clippy::expect_used,
  reason = "The fallback pattern is a constant and always compiles"
)]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").expect("Failed to compile never-matching regex")
}

/// Compile a static pattern, logging and falling back to
/// [`never_matching_regex`] on failure.
#[must_use]
pub fn compile(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!("Failed to compile {name} regex: {e}");
    never_matching_regex()
  })
}
