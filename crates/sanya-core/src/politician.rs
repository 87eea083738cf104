//! Politicians and the campaigns they ran.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{IdPolicy, Record, Row, TableDef, expect_len},
};

// ─── Politician ──────────────────────────────────────────────────────────────

/// A politician. Ids are always 8-digit numerals starting at `10000001`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Politician {
  pub id:           String,
  pub name:         String,
  pub party_name:   String,
  pub portrait_url: String,
}

impl Record for Politician {
  const TABLE: TableDef = TableDef {
    entity:  "politician",
    file:    "politicians.csv",
    headers: &["id", "name", "party_name", "portrait_url"],
  };

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn to_row(&self) -> Row {
    vec![
      self.id.clone(),
      self.name.clone(),
      self.party_name.clone(),
      self.portrait_url.clone(),
    ]
  }

  fn from_row(row: &[String]) -> Result<Self> {
    expect_len(&Self::TABLE, row, 4)?;
    Ok(Self {
      id:           row[0].clone(),
      name:         row[1].clone(),
      party_name:   row[2].clone(),
      portrait_url: row[3].clone(),
    })
  }

  fn id_policy() -> IdPolicy {
    IdPolicy::FixedWidth { floor: 10_000_000, ceiling: 99_999_999 }
  }
}

/// Input to [`crate::tracker::Tracker::create_politician`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolitician {
  #[serde(default)]
  pub name:         String,
  #[serde(default)]
  pub party_name:   String,
  pub portrait_url: Option<String>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliticianPatch {
  pub name:         Option<String>,
  pub party_name:   Option<String>,
  pub portrait_url: Option<String>,
}

impl PoliticianPatch {
  pub fn apply(self, p: &mut Politician) {
    if let Some(v) = self.name {
      p.name = v;
    }
    if let Some(v) = self.party_name {
      p.party_name = v;
    }
    if let Some(v) = self.portrait_url {
      p.portrait_url = v;
    }
  }
}

// ─── Campaign ────────────────────────────────────────────────────────────────

/// One election campaign. A politician's "latest" campaign is the one with
/// the greatest `year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
  pub id:            String,
  pub politician_id: String,
  pub year:          i32,
  pub area_name:     String,
}

impl Record for Campaign {
  const TABLE: TableDef = TableDef {
    entity:  "campaign",
    file:    "campaigns.csv",
    headers: &["id", "politician_id", "year", "area_name"],
  };

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn to_row(&self) -> Row {
    vec![
      self.id.clone(),
      self.politician_id.clone(),
      self.year.to_string(),
      self.area_name.clone(),
    ]
  }

  fn from_row(row: &[String]) -> Result<Self> {
    expect_len(&Self::TABLE, row, 4)?;
    let year = row[2].parse().map_err(|_| Error::MalformedRow {
      table:  Self::TABLE.entity,
      reason: format!("year: {:?} is not an integer", row[2]),
    })?;
    Ok(Self {
      id: row[0].clone(),
      politician_id: row[1].clone(),
      year,
      area_name: row[3].clone(),
    })
  }
}

/// Input to [`crate::tracker::Tracker::create_campaign`]. The politician id
/// comes from the URL, not the body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
  #[serde(default)]
  pub year:      Option<i32>,
  #[serde(default)]
  pub area_name: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn politician_row_round_trip() {
    let p = Politician {
      id:           "10000001".into(),
      name:         "Somchai, \"the builder\"".into(),
      party_name:   "พรรคตัวอย่าง".into(),
      portrait_url: "https://example.org/a.png".into(),
    };
    assert_eq!(Politician::from_row(&p.to_row()).unwrap(), p);
  }

  #[test]
  fn campaign_year_must_be_numeric() {
    let row: Vec<String> =
      ["1", "10000001", "twenty", "Bangkok"].map(String::from).to_vec();
    assert!(matches!(
      Campaign::from_row(&row),
      Err(Error::MalformedRow { table: "campaign", .. })
    ));
  }

  #[test]
  fn short_row_is_rejected() {
    let row: Vec<String> = vec!["1".into(), "x".into()];
    assert!(Politician::from_row(&row).is_err());
  }

  #[test]
  fn field_reads_persisted_column() {
    let c = Campaign {
      id:            "3".into(),
      politician_id: "10000001".into(),
      year:          2023,
      area_name:     "Chiang Mai 1".into(),
    };
    assert_eq!(c.field("year").as_deref(), Some("2023"));
    assert_eq!(c.field("nope"), None);
  }

  #[test]
  fn patch_only_touches_given_fields() {
    let mut p = Politician {
      id:           "10000001".into(),
      name:         "Old".into(),
      party_name:   "Party".into(),
      portrait_url: String::new(),
    };
    PoliticianPatch { name: Some("New".into()), ..Default::default() }.apply(&mut p);
    assert_eq!(p.name, "New");
    assert_eq!(p.party_name, "Party");
  }
}
