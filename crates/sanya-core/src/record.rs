//! How an entity maps onto one table: the [`Record`] trait.
//!
//! Every entity declares its [`TableDef`] (file name and header row), a pure
//! `to_row`/`from_row` pair and, optionally, its own [`IdPolicy`]. The
//! generic persistence behaviour in [`crate::store::Repository`] is written
//! once against this trait.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One persisted record as ordered field strings.
pub type Row = Vec<String>;

// ─── Table binding ───────────────────────────────────────────────────────────

/// Where a table lives and what its header row looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
  /// Human-readable entity name used in errors and logs.
  pub entity:  &'static str,
  /// File name relative to the store's data directory.
  pub file:    &'static str,
  /// Header row; also the field order of `to_row`.
  pub headers: &'static [&'static str],
}

impl TableDef {
  pub fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| *h == name)
  }
}

// ─── Identity policy ─────────────────────────────────────────────────────────

/// How new ids are chosen for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
  /// `max(existing numeral ids) + 1`, starting at `1`.
  Sequential,
  /// Like `Sequential`, but only ids inside `floor..=ceiling` count and the
  /// first id handed out is `floor + 1`.
  FixedWidth { floor: u64, ceiling: u64 },
}

/// Compute the next id for a table given the ids already present.
///
/// Ids that are not plain decimal numerals are ignored.
pub fn next_id<'a>(
  policy: IdPolicy,
  entity: &'static str,
  existing: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
  let numerals = existing.into_iter().filter_map(parse_numeral);

  let next = match policy {
    IdPolicy::Sequential => numerals.max().unwrap_or(0) + 1,
    IdPolicy::FixedWidth { floor, ceiling } => {
      let max = numerals
        .filter(|n| (floor..=ceiling).contains(n))
        .fold(floor, u64::max);
      if max >= ceiling {
        return Err(Error::IdSpaceExhausted(entity));
      }
      max + 1
    }
  };

  Ok(next.to_string())
}

fn parse_numeral(id: &str) -> Option<u64> {
  if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  id.parse().ok()
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// An entity that can be stored as a row of one table.
pub trait Record: Clone + Send + Sync + Sized + 'static {
  const TABLE: TableDef;

  /// The record's id; empty until the first save.
  fn id(&self) -> &str;

  fn set_id(&mut self, id: String);

  /// Serialise into fields ordered like [`TableDef::headers`].
  fn to_row(&self) -> Row;

  /// Inverse of [`Record::to_row`].
  fn from_row(row: &[String]) -> Result<Self>;

  fn id_policy() -> IdPolicy { IdPolicy::Sequential }

  /// Persisted text of the column called `name`.
  fn field(&self, name: &str) -> Option<String> {
    let idx = Self::TABLE.column(name)?;
    self.to_row().into_iter().nth(idx)
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  pub fn apply(self, ord: Ordering) -> Ordering {
    match self {
      Self::Asc => ord,
      Self::Desc => ord.reverse(),
    }
  }
}

/// Sort `records` by the persisted text of the column `field`.
///
/// The sort is stable: equal keys keep their input order.
pub fn sort_by_field<T: Record>(
  records: &mut [T],
  field: &str,
  order: SortOrder,
) -> Result<()> {
  let idx = T::TABLE.column(field).ok_or_else(|| Error::UnknownField {
    table: T::TABLE.entity,
    field: field.to_owned(),
  })?;

  let mut keyed: Vec<(String, T)> = records
    .iter()
    .map(|r| (r.to_row().swap_remove(idx), r.clone()))
    .collect();
  keyed.sort_by(|(a, _), (b, _)| order.apply(a.cmp(b)));

  for (slot, (_, record)) in records.iter_mut().zip(keyed) {
    *slot = record;
  }
  Ok(())
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// Check that `row` has at least `min` fields.
pub(crate) fn expect_len(
  table: &TableDef,
  row: &[String],
  min: usize,
) -> Result<()> {
  if row.len() < min {
    return Err(Error::MalformedRow {
      table:  table.entity,
      reason: format!("expected {min} fields, found {}", row.len()),
    });
  }
  Ok(())
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// The current time truncated to the millisecond precision that is persisted.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

/// A modification stamp strictly later than `previous`.
pub fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
  let now = now();
  if now > previous { now } else { previous + Duration::milliseconds(1) }
}

pub fn encode_ts(ts: DateTime<Utc>) -> String {
  ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn decode_ts(
  table: &TableDef,
  column: &str,
  s: &str,
) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::MalformedRow {
      table:  table.entity,
      reason: format!("{column}: {e}"),
    })
}
