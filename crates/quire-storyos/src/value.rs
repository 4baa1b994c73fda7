//! Lookups on the loosely typed YAML sources.
use serde_json::Value;

static NULL: Value = Value::Null;

/// `value[key]`, or `null` when `value` is not an object or lacks the key.
#[must_use]
pub fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
  value.get(key).unwrap_or(&NULL)
}

/// Display form of a scalar; `null` is empty, containers are compact JSON.
#[must_use]
pub fn text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// `value[key]` as display text.
#[must_use]
pub fn text_field(value: &Value, key: &str) -> String {
  text(field(value, key))
}

/// Elements of `value[key]` when it is an array.
#[must_use]
pub fn items<'a>(value: &'a Value, key: &str) -> &'a [Value] {
  field(value, key).as_array().map_or(&[][..], Vec::as_slice)
}

/// `value[key]` as an integer.
#[must_use]
pub fn int_field(value: &Value, key: &str) -> Option<i64> {
  let field = field(value, key);
  field
    .as_i64()
    .or_else(|| field.as_str().and_then(|s| s.trim().parse().ok()))
}

/// `chapter_range: [lo, hi]` of an arc.
#[must_use]
pub fn chapter_range(arc: &Value) -> Option<(i64, i64)> {
  match items(arc, "chapter_range") {
    [lo, hi] => Some((lo.as_i64()?, hi.as_i64()?)),
    _ => None,
  }
}
