//! Delimited-record codec for Sanya tables.
//!
//! Converts between comma-delimited text and rows of string fields. Pure
//! synchronous; no file-system or async dependencies.
//!
//! Quoting rules:
//!
//! - a field wrapped in `"` may contain the delimiter or embedded newlines;
//! - `""` inside a quoted field is one literal `"`;
//! - unquoted whitespace around a field is trimmed;
//! - lines holding only whitespace are skipped.
//!
//! # Quick start
//!
//! ```
//! let text = sanya_csv::serialize_table(
//!   &["id", "name"],
//!   &[vec!["1".to_string(), "Build a hospital, then a school".to_string()]],
//! );
//! let rows = sanya_csv::parse_rows(&text).unwrap();
//! assert_eq!(rows[0][1], "Build a hospital, then a school");
//! ```

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};

/// Field separator.
pub const DELIMITER: char = ',';
/// Quote character.
pub const QUOTE: char = '"';

/// Parse every record of `input`, including the header.
pub fn parse_records(input: &str) -> Result<Vec<Vec<String>>> {
  parse::parse_records(input)
}

/// Parse `input` and drop the first (header) record.
pub fn parse_rows(input: &str) -> Result<Vec<Vec<String>>> {
  let mut records = parse::parse_records(input)?;
  if records.is_empty() {
    return Ok(records);
  }
  records.remove(0);
  Ok(records)
}

/// Serialize one record as a single logical line (no newline appended).
pub fn serialize_record<S: AsRef<str>>(fields: &[S]) -> String {
  serialize::serialize_record(fields)
}

/// Serialize a header plus rows; records are `\n`-separated with no trailing
/// newline.
pub fn serialize_table<H, R>(headers: &[H], rows: &[R]) -> String
where
  H: AsRef<str>,
  R: AsRef<[String]>,
{
  serialize::serialize_table(headers, rows)
}

// ─── Round-trip tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod roundtrip_tests {
  use super::*;

  #[test]
  fn awkward_fields_survive() {
    let row = vec![
      "7".to_string(),
      "comma, inside".to_string(),
      "quote \" inside".to_string(),
      "multi\nline\nvalue".to_string(),
      "  leading and trailing  ".to_string(),
      String::new(),
      "กำลังดำเนินการ".to_string(),
    ];
    let headers = ["a", "b", "c", "d", "e", "f", "g"];

    let text = serialize_table(&headers, std::slice::from_ref(&row));
    let rows = parse_rows(&text).unwrap();

    assert_eq!(rows, vec![row]);
  }

  #[test]
  fn header_only_file_has_no_rows() {
    assert!(parse_rows("id,name").unwrap().is_empty());
    assert!(parse_rows("").unwrap().is_empty());
  }

  #[test]
  fn appended_record_parses_after_table() {
    let mut text = serialize_table(&["id", "name"], &[vec!["1".to_string(), "a".to_string()]]);
    text.push('\n');
    text.push_str(&serialize_record(&["2", "b, c"]));

    let rows = parse_rows(&text).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], vec!["2".to_string(), "b, c".to_string()]);
  }
}
