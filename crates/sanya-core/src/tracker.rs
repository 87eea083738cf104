//! Queries and write flows over politicians, campaigns, promises and
//! promise updates, gathered on [`Tracker`].
//!
//! Joins are done in memory by scanning whole tables; unresolved references
//! degrade to placeholder values rather than failing.

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  error::require,
  politician::{Campaign, NewCampaign, NewPolitician, Politician, PoliticianPatch},
  promise::{
    NewPromise, NewPromiseUpdate, Promise, PromisePatch, PromiseStatus,
    PromiseUpdate,
  },
  record::{SortOrder, now, sort_by_field},
  store::{Repository, TableStore},
};

/// Name and party shown for a promise whose politician no longer exists.
pub const UNKNOWN_POLITICIAN: &str = "Unknown";

/// Area shown for a politician with no campaigns ("unspecified").
pub const UNSPECIFIED_AREA: &str = "ไม่ระบุ";

// ─── Read models ─────────────────────────────────────────────────────────────

/// A politician plus the area of their latest campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoliticianWithArea {
  #[serde(flatten)]
  pub politician: Politician,
  pub area:       String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoliticianWithPromises {
  pub politician: PoliticianWithArea,
  pub promises:   Vec<Promise>,
}

/// A promise joined to its politician's name and party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromiseWithPolitician {
  #[serde(flatten)]
  pub promise:         Promise,
  pub politician_name: String,
  pub party_name:      String,
}

// ─── Query type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromiseSortField {
  #[default]
  CreatedAt,
  UpdatedAt,
  PromiseDate,
}

impl PromiseSortField {
  /// The persisted column this field sorts on.
  pub fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "createdAt",
      Self::UpdatedAt => "updatedAt",
      Self::PromiseDate => "promise_date",
    }
  }
}

/// Parameters for [`Tracker::list_promises`].
#[derive(Debug, Clone, Default)]
pub struct PromiseFilter {
  pub sort_by:       PromiseSortField,
  pub order:         SortOrder,
  pub politician_id: Option<String>,
  pub status:        Option<PromiseStatus>,
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

pub struct Tracker<S> {
  politicians: Repository<Politician, S>,
  campaigns:   Repository<Campaign, S>,
  promises:    Repository<Promise, S>,
  updates:     Repository<PromiseUpdate, S>,
}

impl<S: TableStore> Tracker<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      politicians: Repository::new(Arc::clone(&store)),
      campaigns:   Repository::new(Arc::clone(&store)),
      promises:    Repository::new(Arc::clone(&store)),
      updates:     Repository::new(store),
    }
  }

  // ── Politicians ───────────────────────────────────────────────────────

  /// Every politician with the area of their latest campaign.
  pub async fn politicians_with_area(&self) -> Result<Vec<PoliticianWithArea>> {
    let politicians = self.politicians.find_all().await?;
    let campaigns = self.campaigns.find_all().await?;
    Ok(
      politicians
        .into_iter()
        .map(|p| {
          let area = latest_of(&campaigns, &p.id).map(|c| c.area_name.clone());
          with_area(p, area)
        })
        .collect(),
    )
  }

  pub async fn politician_with_area(&self, id: &str) -> Result<PoliticianWithArea> {
    let politician = self.politician(id).await?;
    let area = self.latest_campaign_for(id).await?.map(|c| c.area_name);
    Ok(with_area(politician, area))
  }

  pub async fn politician_with_promises(
    &self,
    id: &str,
  ) -> Result<PoliticianWithPromises> {
    let politician = self.politician_with_area(id).await?;
    let promises = self
      .promises
      .find_all()
      .await?
      .into_iter()
      .filter(|p| p.politician_id == id)
      .collect();
    Ok(PoliticianWithPromises { politician, promises })
  }

  pub async fn create_politician(&self, input: NewPolitician) -> Result<Politician> {
    require(&[("name", &input.name), ("partyName", &input.party_name)])?;
    let politician = self
      .politicians
      .save(Politician {
        id:           String::new(),
        name:         input.name,
        party_name:   input.party_name,
        portrait_url: input.portrait_url.unwrap_or_default(),
      })
      .await?;
    tracing::info!(id = %politician.id, "politician created");
    Ok(politician)
  }

  pub async fn update_politician(
    &self,
    id: &str,
    patch: PoliticianPatch,
  ) -> Result<Politician> {
    let mut politician = self.politician(id).await?;
    patch.apply(&mut politician);
    self.politicians.save(politician).await
  }

  /// Campaigns and promises of the politician are left in place.
  pub async fn delete_politician(&self, id: &str) -> Result<bool> {
    let removed = self.politicians.delete(id).await?;
    if removed {
      tracing::info!(%id, "politician deleted");
    }
    Ok(removed)
  }

  async fn politician(&self, id: &str) -> Result<Politician> {
    self
      .politicians
      .find_by_id(id)
      .await?
      .ok_or_else(|| Error::not_found("politician", id))
  }

  // ── Campaigns ─────────────────────────────────────────────────────────

  /// The campaign with the greatest year, or `None` if there are none.
  pub async fn latest_campaign_for(
    &self,
    politician_id: &str,
  ) -> Result<Option<Campaign>> {
    let campaigns = self.campaigns.find_all().await?;
    Ok(latest_of(&campaigns, politician_id).cloned())
  }

  /// All campaigns of a politician, newest first.
  pub async fn campaigns_for(&self, politician_id: &str) -> Result<Vec<Campaign>> {
    let mut campaigns: Vec<Campaign> = self
      .campaigns
      .find_all()
      .await?
      .into_iter()
      .filter(|c| c.politician_id == politician_id)
      .collect();
    campaigns.sort_by(|a, b| b.year.cmp(&a.year));
    Ok(campaigns)
  }

  pub async fn create_campaign(
    &self,
    politician_id: &str,
    input: NewCampaign,
  ) -> Result<Campaign> {
    let year = input.year.map(|y| y.to_string()).unwrap_or_default();
    require(&[("year", year.as_str()), ("areaName", input.area_name.as_str())])?;
    self.politician(politician_id).await?;
    self
      .campaigns
      .save(Campaign {
        id:            String::new(),
        politician_id: politician_id.to_owned(),
        year:          input.year.unwrap_or_default(),
        area_name:     input.area_name,
      })
      .await
  }

  // ── Promises ──────────────────────────────────────────────────────────

  /// Every promise joined to its politician, in table order.
  pub async fn promises_with_politician(&self) -> Result<Vec<PromiseWithPolitician>> {
    let promises = self.promises.find_all().await?;
    self.join_politicians(promises).await
  }

  pub async fn promise_with_politician(
    &self,
    id: &str,
  ) -> Result<Option<PromiseWithPolitician>> {
    let Some(promise) = self.promises.find_by_id(id).await? else {
      return Ok(None);
    };
    let politician = self.politicians.find_by_id(&promise.politician_id).await?;
    Ok(Some(join(promise, politician.as_ref())))
  }

  /// Filtered, sorted promise list (default: newest `createdAt` first).
  pub async fn list_promises(
    &self,
    filter: &PromiseFilter,
  ) -> Result<Vec<PromiseWithPolitician>> {
    let mut promises: Vec<Promise> = self
      .promises
      .find_all()
      .await?
      .into_iter()
      .filter(|p| {
        filter.politician_id.as_deref().is_none_or(|id| p.politician_id == id)
          && filter.status.is_none_or(|st| p.status == st)
      })
      .collect();
    sort_by_field(&mut promises, filter.sort_by.column(), filter.order)?;
    self.join_politicians(promises).await
  }

  pub async fn create_promise(&self, input: NewPromise) -> Result<PromiseWithPolitician> {
    require(&[
      ("politicianId", &input.politician_id),
      ("name", &input.name),
      ("details", &input.details),
      ("promiseDate", &input.promise_date),
    ])?;
    let promise = self.promises.save(Promise::new(input)).await?;
    tracing::info!(id = %promise.id, politician_id = %promise.politician_id, "promise created");
    let politician = self.politicians.find_by_id(&promise.politician_id).await?;
    Ok(join(promise, politician.as_ref()))
  }

  /// Apply `patch` and advance `updatedAt`.
  pub async fn update_promise(
    &self,
    id: &str,
    patch: PromisePatch,
  ) -> Result<PromiseWithPolitician> {
    let mut promise = self
      .promises
      .find_by_id(id)
      .await?
      .ok_or_else(|| Error::not_found("promise", id))?;
    patch.apply(&mut promise);
    let promise = self.promises.save(promise).await?;
    let politician = self.politicians.find_by_id(&promise.politician_id).await?;
    Ok(join(promise, politician.as_ref()))
  }

  pub async fn delete_promise(&self, id: &str) -> Result<bool> {
    self.promises.delete(id).await
  }

  async fn join_politicians(
    &self,
    promises: Vec<Promise>,
  ) -> Result<Vec<PromiseWithPolitician>> {
    let politicians: HashMap<String, Politician> = self
      .politicians
      .find_all()
      .await?
      .into_iter()
      .map(|p| (p.id.clone(), p))
      .collect();
    Ok(
      promises
        .into_iter()
        .map(|promise| {
          let politician = politicians.get(&promise.politician_id);
          join(promise, politician)
        })
        .collect(),
    )
  }

  // ── Promise updates ───────────────────────────────────────────────────

  /// Updates recorded for one promise, in table order.
  pub async fn promise_updates_for(&self, promise_id: &str) -> Result<Vec<PromiseUpdate>> {
    Ok(
      self
        .updates
        .find_all()
        .await?
        .into_iter()
        .filter(|u| u.promise_id == promise_id)
        .collect(),
    )
  }

  /// Every update, newest first.
  pub async fn all_promise_updates(&self) -> Result<Vec<PromiseUpdate>> {
    let mut updates = self.updates.find_all().await?;
    sort_by_field(&mut updates, "update_date", SortOrder::Desc)?;
    Ok(updates)
  }

  /// Record an update and move the promise to `new_status`.
  ///
  /// The update row is written first and the promise second, as two separate
  /// table rewrites. If the second write fails the history entry stays and
  /// the promise keeps its old status; the error is logged and returned.
  pub async fn create_promise_update(
    &self,
    input: NewPromiseUpdate,
  ) -> Result<PromiseUpdate> {
    require(&[
      ("promiseId", input.promise_id.as_str()),
      ("details", input.details.as_str()),
      ("newStatus", input.new_status.map_or("", PromiseStatus::label)),
    ])?;

    let mut promise = self
      .promises
      .find_by_id(&input.promise_id)
      .await?
      .ok_or_else(|| Error::not_found("promise", &input.promise_id))?;

    let update = self
      .updates
      .save(PromiseUpdate {
        id:          String::new(),
        promise_id:  input.promise_id,
        update_date: now(),
        details:     input.details,
        new_status:  input.new_status.unwrap_or_default(),
      })
      .await?;

    promise.status = update.new_status;
    promise.touch();
    if let Err(e) = self.promises.save(promise).await {
      tracing::error!(
        update_id = %update.id,
        promise_id = %update.promise_id,
        error = %e,
        "promise update recorded but promise status not saved",
      );
      return Err(e);
    }

    tracing::info!(
      update_id = %update.id,
      promise_id = %update.promise_id,
      status = %update.new_status,
      "promise status updated",
    );
    Ok(update)
  }
}

fn latest_of<'a>(campaigns: &'a [Campaign], politician_id: &str) -> Option<&'a Campaign> {
  campaigns
    .iter()
    .filter(|c| c.politician_id == politician_id)
    .reduce(|best, c| if c.year > best.year { c } else { best })
}

fn with_area(politician: Politician, area: Option<String>) -> PoliticianWithArea {
  PoliticianWithArea {
    politician,
    area: area.unwrap_or_else(|| UNSPECIFIED_AREA.to_owned()),
  }
}

fn join(promise: Promise, politician: Option<&Politician>) -> PromiseWithPolitician {
  let (politician_name, party_name) = match politician {
    Some(p) => (p.name.clone(), p.party_name.clone()),
    None => (UNKNOWN_POLITICIAN.to_owned(), UNKNOWN_POLITICIAN.to_owned()),
  };
  PromiseWithPolitician { promise, politician_name, party_name }
}
