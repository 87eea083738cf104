//! Delimited-text serializer.
//!
//! Records are joined with `\n` and the output carries no trailing newline.

use std::borrow::Cow;

use crate::{DELIMITER, QUOTE};

/// Quote `value` if the parser would otherwise split, unescape or trim it.
pub(crate) fn escape_field(value: &str) -> Cow<'_, str> {
  let needs_quotes = value
    .chars()
    .any(|c| c == DELIMITER || c == QUOTE || c == '\n' || c == '\r')
    || value.trim() != value;

  if !needs_quotes {
    return Cow::Borrowed(value);
  }

  let mut out = String::with_capacity(value.len() + 2);
  out.push(QUOTE);
  for c in value.chars() {
    if c == QUOTE {
      out.push(QUOTE);
    }
    out.push(c);
  }
  out.push(QUOTE);
  Cow::Owned(out)
}

pub(crate) fn serialize_record<S: AsRef<str>>(fields: &[S]) -> String {
  let mut line = String::new();
  for (i, field) in fields.iter().enumerate() {
    if i > 0 {
      line.push(DELIMITER);
    }
    line.push_str(&escape_field(field.as_ref()));
  }
  line
}

pub(crate) fn serialize_table<H, R>(headers: &[H], rows: &[R]) -> String
where
  H: AsRef<str>,
  R: AsRef<[String]>,
{
  let mut out = serialize_record(headers);
  for row in rows {
    out.push('\n');
    out.push_str(&serialize_record(row.as_ref()));
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_value_is_borrowed() {
    assert!(matches!(escape_field("Bangkok"), Cow::Borrowed("Bangkok")));
  }

  #[test]
  fn special_characters_are_quoted() {
    assert_eq!(escape_field("a,b"), "\"a,b\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    assert_eq!(escape_field(" padded"), "\" padded\"");
  }

  #[test]
  fn table_has_no_trailing_newline() {
    let rows = vec![vec!["1".to_string(), "x,y".to_string()]];
    assert_eq!(serialize_table(&["id", "name"], &rows), "id,name\n1,\"x,y\"");
  }

  #[test]
  fn empty_table_is_header_only() {
    let rows: Vec<Vec<String>> = Vec::new();
    assert_eq!(serialize_table(&["id"], &rows), "id");
  }
}
