//! Promises and their append-only update history.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{Record, Row, TableDef, advance, decode_ts, encode_ts, expect_len, now},
};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a promise stands. Persisted and serialised as the Thai label; the
/// English aliases are accepted on input.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum PromiseStatus {
  #[serde(rename = "เงียบหาย", alias = "silent")]
  Silent,
  #[default]
  #[serde(rename = "ยังไม่เริ่ม", alias = "not-started")]
  NotStarted,
  #[serde(rename = "กำลังดำเนินการ", alias = "in-progress")]
  InProgress,
  #[serde(rename = "สำเร็จ", alias = "fulfilled")]
  Fulfilled,
  #[serde(rename = "ล้มเหลว", alias = "broken")]
  Broken,
}

impl PromiseStatus {
  pub const ALL: [Self; 5] = [
    Self::Silent,
    Self::NotStarted,
    Self::InProgress,
    Self::Fulfilled,
    Self::Broken,
  ];

  /// The label stored in the `status` / `new_status` columns.
  pub fn label(self) -> &'static str {
    match self {
      Self::Silent => "เงียบหาย",
      Self::NotStarted => "ยังไม่เริ่ม",
      Self::InProgress => "กำลังดำเนินการ",
      Self::Fulfilled => "สำเร็จ",
      Self::Broken => "ล้มเหลว",
    }
  }

  pub fn alias(self) -> &'static str {
    match self {
      Self::Silent => "silent",
      Self::NotStarted => "not-started",
      Self::InProgress => "in-progress",
      Self::Fulfilled => "fulfilled",
      Self::Broken => "broken",
    }
  }
}

impl fmt::Display for PromiseStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for PromiseStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|st| st.label() == s || st.alias() == s)
      .ok_or_else(|| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Promise ─────────────────────────────────────────────────────────────────

/// A public promise attributed to a politician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promise {
  pub id:            String,
  pub politician_id: String,
  pub name:          String,
  pub details:       String,
  /// Free text as entered, usually `YYYY-MM-DD`.
  pub promise_date:  String,
  pub status:        PromiseStatus,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Promise {
  /// A fresh, unsaved promise with `created_at == updated_at`.
  pub fn new(input: NewPromise) -> Self {
    let at = now();
    Self {
      id:            String::new(),
      politician_id: input.politician_id,
      name:          input.name,
      details:       input.details,
      promise_date:  input.promise_date,
      status:        input.status.unwrap_or_default(),
      created_at:    at,
      updated_at:    at,
    }
  }

  /// Advance `updated_at` strictly past its previous value.
  pub fn touch(&mut self) { self.updated_at = advance(self.updated_at); }
}

impl Record for Promise {
  const TABLE: TableDef = TableDef {
    entity:  "promise",
    file:    "promises.csv",
    headers: &[
      "id",
      "politician_id",
      "name",
      "details",
      "promise_date",
      "status",
      "createdAt",
      "updatedAt",
    ],
  };

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn to_row(&self) -> Row {
    vec![
      self.id.clone(),
      self.politician_id.clone(),
      self.name.clone(),
      self.details.clone(),
      self.promise_date.clone(),
      self.status.label().to_owned(),
      encode_ts(self.created_at),
      encode_ts(self.updated_at),
    ]
  }

  fn from_row(row: &[String]) -> Result<Self> {
    let t = &Self::TABLE;
    expect_len(t, row, 8)?;
    Ok(Self {
      id:            row[0].clone(),
      politician_id: row[1].clone(),
      name:          row[2].clone(),
      details:       row[3].clone(),
      promise_date:  row[4].clone(),
      status:        row[5].parse()?,
      created_at:    decode_ts(t, "createdAt", &row[6])?,
      updated_at:    decode_ts(t, "updatedAt", &row[7])?,
    })
  }
}

/// Input to [`crate::tracker::Tracker::create_promise`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPromise {
  #[serde(default)]
  pub politician_id: String,
  #[serde(default)]
  pub name:          String,
  #[serde(default)]
  pub details:       String,
  #[serde(default)]
  pub promise_date:  String,
  pub status:        Option<PromiseStatus>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromisePatch {
  pub politician_id: Option<String>,
  pub name:          Option<String>,
  pub details:       Option<String>,
  pub promise_date:  Option<String>,
  pub status:        Option<PromiseStatus>,
}

impl PromisePatch {
  /// Apply the patch and advance `updated_at`.
  pub fn apply(self, p: &mut Promise) {
    if let Some(v) = self.politician_id {
      p.politician_id = v;
    }
    if let Some(v) = self.name {
      p.name = v;
    }
    if let Some(v) = self.details {
      p.details = v;
    }
    if let Some(v) = self.promise_date {
      p.promise_date = v;
    }
    if let Some(v) = self.status {
      p.status = v;
    }
    p.touch();
  }
}

// ─── PromiseUpdate ───────────────────────────────────────────────────────────

/// One entry in a promise's history. Creating one also moves the promise to
/// `new_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromiseUpdate {
  pub id:          String,
  pub promise_id:  String,
  pub update_date: DateTime<Utc>,
  pub details:     String,
  pub new_status:  PromiseStatus,
}

/// Field count of the legacy layout without an `id` column.
const LEGACY_UPDATE_FIELDS: usize = 4;

impl Record for PromiseUpdate {
  const TABLE: TableDef = TableDef {
    entity:  "promise update",
    file:    "promise_updates.csv",
    headers: &["id", "promise_id", "update_date", "details", "new_status"],
  };

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn to_row(&self) -> Row {
    vec![
      self.id.clone(),
      self.promise_id.clone(),
      encode_ts(self.update_date),
      self.details.clone(),
      self.new_status.label().to_owned(),
    ]
  }

  /// Accepts both `id,promise_id,update_date,details,new_status` and the
  /// legacy `promise_id,update_date,details,new_status`. Legacy rows come
  /// back with an empty id, which the next save of the table fills in.
  fn from_row(row: &[String]) -> Result<Self> {
    let t = &Self::TABLE;
    let (id, rest) = if row.len() == LEGACY_UPDATE_FIELDS {
      (String::new(), row)
    } else {
      expect_len(t, row, 5)?;
      (row[0].clone(), &row[1..])
    };
    Ok(Self {
      id,
      promise_id:  rest[0].clone(),
      update_date: decode_ts(t, "update_date", &rest[1])?,
      details:     rest[2].clone(),
      new_status:  rest[3].parse()?,
    })
  }
}

/// Input to [`crate::tracker::Tracker::create_promise_update`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPromiseUpdate {
  #[serde(default)]
  pub promise_id: String,
  #[serde(default)]
  pub details:    String,
  #[serde(default)]
  pub new_status: Option<PromiseStatus>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Promise {
    Promise::new(NewPromise {
      politician_id: "10000001".into(),
      name:          "Build hospital".into(),
      details:       "200 beds,\n\"modern\" equipment".into(),
      promise_date:  "2024-01-01".into(),
      status:        None,
    })
  }

  #[test]
  fn new_promise_defaults() {
    let p = sample();
    assert!(p.id.is_empty());
    assert_eq!(p.status, PromiseStatus::NotStarted);
    assert_eq!(p.created_at, p.updated_at);
  }

  #[test]
  fn promise_row_round_trip() {
    let mut p = sample();
    p.id = "1".into();
    assert_eq!(Promise::from_row(&p.to_row()).unwrap(), p);
  }

  #[test]
  fn touch_advances_updated_at() {
    let mut p = sample();
    let before = p.updated_at;
    p.touch();
    assert!(p.updated_at > before);
    assert_eq!(p.created_at, before);
  }

  #[test]
  fn status_labels_and_aliases_parse() {
    for st in PromiseStatus::ALL {
      assert_eq!(st.label().parse::<PromiseStatus>().unwrap(), st);
      assert_eq!(st.alias().parse::<PromiseStatus>().unwrap(), st);
    }
    assert!(matches!(
      "done".parse::<PromiseStatus>(),
      Err(Error::UnknownStatus(_))
    ));
  }

  #[test]
  fn status_serialises_as_label() {
    let json = serde_json::to_string(&PromiseStatus::InProgress).unwrap();
    assert_eq!(json, "\"กำลังดำเนินการ\"");
    let parsed: PromiseStatus = serde_json::from_str("\"broken\"").unwrap();
    assert_eq!(parsed, PromiseStatus::Broken);
  }

  #[test]
  fn update_accepts_legacy_layout() {
    let legacy: Vec<String> = [
      "4",
      "2024-02-01T10:00:00.000Z",
      "groundbreaking",
      "กำลังดำเนินการ",
    ]
    .map(String::from)
    .to_vec();
    let u = PromiseUpdate::from_row(&legacy).unwrap();
    assert!(u.id.is_empty());
    assert_eq!(u.promise_id, "4");
    assert_eq!(u.new_status, PromiseStatus::InProgress);

    let mut current = legacy.clone();
    current.insert(0, "9".into());
    let u = PromiseUpdate::from_row(&current).unwrap();
    assert_eq!(u.id, "9");
    assert_eq!(u.details, "groundbreaking");
  }

  #[test]
  fn update_row_round_trip() {
    let u = PromiseUpdate {
      id:          "2".into(),
      promise_id:  "1".into(),
      update_date: now(),
      details:     "phase 1, done".into(),
      new_status:  PromiseStatus::Fulfilled,
    };
    assert_eq!(PromiseUpdate::from_row(&u.to_row()).unwrap(), u);
  }

  #[test]
  fn patch_touches_even_without_changes() {
    let mut p = sample();
    let before = p.updated_at;
    PromisePatch::default().apply(&mut p);
    assert!(p.updated_at > before);
  }
}
