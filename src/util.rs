//! Small utility helpers used across modules.

use serde::{de::Error as _, Deserialize, Deserializer};

/// Trim and lowercase: the comparison form for typed answers.
pub fn fold_answer(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Case-insensitive exact match of a typed answer against the expected text.
/// Only the learner's side is trimmed.
pub fn typed_answer_matches(answer: &str, expected: &str) -> bool {
  fold_answer(answer) == expected.to_lowercase()
}

/// Lowercase and drop the `¿ ? ,` marks that speech transcripts never carry.
pub fn normalize_spoken(s: &str) -> String {
  s.to_lowercase()
    .chars()
    .filter(|c| !matches!(c, '¿' | '?' | ','))
    .collect()
}

/// Split an authored comma list ("a, b ,c") into trimmed items.
pub fn split_list(raw: &str) -> Vec<String> {
  raw.split(',').map(|w| w.trim().to_string()).collect()
}

/// Log-safe truncation for learner-provided text.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} chars total)", head, s.chars().count())
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrText {
  Int(u64),
  Float(f64),
  Text(String),
}

/// Accept `40`, `40.5` or `"40"` for a float field. Form-authored lessons store numbers as text.
pub fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
  match NumOrText::deserialize(d)? {
    NumOrText::Int(n) => Ok(n as f64),
    NumOrText::Float(f) => Ok(f),
    NumOrText::Text(s) => s.trim().parse().map_err(D::Error::custom),
  }
}

/// Accept `3` or `"3"` for an index field.
pub fn lenient_usize<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
  match NumOrText::deserialize(d)? {
    NumOrText::Int(n) => usize::try_from(n).map_err(D::Error::custom),
    NumOrText::Float(f) if f.fract() == 0.0 && f >= 0.0 => Ok(f as usize),
    NumOrText::Float(f) => Err(D::Error::custom(format!("expected an index, got {f}"))),
    NumOrText::Text(s) => s.trim().parse().map_err(D::Error::custom),
  }
}

/// Block ids were timestamps in older documents; keep them as text.
pub fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  match NumOrText::deserialize(d)? {
    NumOrText::Int(n) => Ok(n.to_string()),
    NumOrText::Float(f) => Ok(f.to_string()),
    NumOrText::Text(s) => Ok(s),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn typed_answers_ignore_case_and_outer_space() {
    assert!(typed_answer_matches("  HOLA ", "hola"));
    assert!(typed_answer_matches("Buenos días", "buenos DÍAS"));
    assert!(!typed_answer_matches("hola!", "hola"));
  }

  #[test]
  fn spoken_normalization_strips_question_marks_and_commas() {
    assert_eq!(normalize_spoken("¿Qué hora es?"), "qué hora es");
    assert_eq!(normalize_spoken("Sí, claro"), "sí claro");
  }

  #[test]
  fn split_list_trims_items() {
    assert_eq!(split_list("gato, perro ,pez"), vec!["gato", "perro", "pez"]);
  }

  #[test]
  fn trunc_for_log_counts_chars() {
    assert_eq!(trunc_for_log("ñandú", 10), "ñandú");
    assert!(trunc_for_log("ñandúñandú", 3).starts_with("ñan…"));
  }

  #[derive(Deserialize)]
  struct Spot {
    #[serde(deserialize_with = "lenient_f64")]
    x: f64,
    #[serde(deserialize_with = "lenient_usize")]
    n: usize,
    #[serde(deserialize_with = "lenient_id")]
    id: String,
  }

  #[test]
  fn lenient_fields_accept_numbers_and_text() {
    let a: Spot = serde_json::from_str(r#"{"x": "40.5", "n": "3", "id": 1712345678901}"#).unwrap();
    assert_eq!(a.x, 40.5);
    assert_eq!(a.n, 3);
    assert_eq!(a.id, "1712345678901");
    let b: Spot = serde_json::from_str(r#"{"x": 12, "n": 2, "id": "b1"}"#).unwrap();
    assert_eq!(b.x, 12.0);
    assert_eq!(b.n, 2);
    assert_eq!(b.id, "b1");
    assert!(serde_json::from_str::<Spot>(r#"{"x": "abc", "n": 1, "id": "z"}"#).is_err());
  }
}
