//! Delimited-text parser.
//!
//! Works over the whole input rather than line by line, so quoted fields may
//! span record separators.
//!
//! Pipeline:
//!   raw &str
//!     └─ char scan (quote state machine) → FieldBuf
//!          └─ FieldBuf::finish()          → trimmed field String
//!               └─ end of record          → Vec<String> (blank lines dropped)

use crate::{
  DELIMITER, QUOTE,
  error::{Error, Result},
};

// ─── Field accumulator ───────────────────────────────────────────────────────

/// Raw text of one field plus the byte span covered by quoted content.
///
/// Unquoted whitespace at either edge is trimmed when the field is finished;
/// anything between the first opening and the last closing quote is kept
/// verbatim.
#[derive(Default)]
struct FieldBuf {
  text:   String,
  quoted: Option<(usize, usize)>,
}

impl FieldBuf {
  fn push(&mut self, c: char) { self.text.push(c); }

  fn open_quote(&mut self) {
    let at = self.text.len();
    match &mut self.quoted {
      Some((_, end)) => *end = at,
      None => self.quoted = Some((at, at)),
    }
  }

  fn close_quote(&mut self) {
    if let Some((_, end)) = &mut self.quoted {
      *end = self.text.len();
    }
  }

  fn is_blank(&self) -> bool {
    self.quoted.is_none() && self.text.trim().is_empty()
  }

  fn finish(self) -> String {
    match self.quoted {
      None => self.text.trim().to_owned(),
      Some((start, end)) => {
        let head = self.text[..start].trim_start();
        let tail = self.text[end..].trim_end();
        format!("{head}{}{tail}", &self.text[start..end])
      }
    }
  }
}

// ─── Record scanner ──────────────────────────────────────────────────────────

/// Parse `input` into records of fields, keeping the first (header) record.
pub(crate) fn parse_records(input: &str) -> Result<Vec<Vec<String>>> {
  let mut records: Vec<Vec<String>> = Vec::new();
  let mut fields: Vec<String> = Vec::new();
  let mut field = FieldBuf::default();

  let mut in_quotes    = false;
  let mut line         = 1usize;
  let mut record_start = 1usize;

  let mut chars = input.chars().peekable();
  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        QUOTE if chars.peek() == Some(&QUOTE) => {
          chars.next();
          field.push(QUOTE);
        }
        QUOTE => {
          in_quotes = false;
          field.close_quote();
        }
        '\n' => {
          line += 1;
          field.push(c);
        }
        _ => field.push(c),
      }
      continue;
    }

    match c {
      QUOTE => {
        in_quotes = true;
        field.open_quote();
      }
      DELIMITER => fields.push(std::mem::take(&mut field).finish()),
      '\n' => {
        end_record(&mut records, &mut fields, std::mem::take(&mut field));
        line += 1;
        record_start = line;
      }
      _ => field.push(c),
    }
  }

  if in_quotes {
    return Err(Error::UnterminatedQuote { line: record_start });
  }
  end_record(&mut records, &mut fields, field);

  Ok(records)
}

fn end_record(
  records: &mut Vec<Vec<String>>,
  fields:  &mut Vec<String>,
  last:    FieldBuf,
) {
  // A line holding nothing but whitespace is not a record.
  if fields.is_empty() && last.is_blank() {
    return;
  }
  fields.push(last.finish());
  records.push(std::mem::take(fields));
}
