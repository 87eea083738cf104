//! The `TableStore` port and the generic [`Repository`] built on it.
//!
//! The trait is implemented by storage backends (e.g. `sanya-store-csv`).
//! Everything above it (repositories, [`crate::tracker::Tracker`],
//! [`crate::accounts::Accounts`]) is written against this abstraction and
//! receives the store handle at construction.
//!
//! Every mutation is a full read-modify-write of one table. There is no
//! locking: two concurrent writers to the same table race and the later
//! write wins.

use std::{future::Future, marker::PhantomData, sync::Arc};

use crate::{
  Error, Result,
  record::{Record, Row, TableDef, next_id},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Whole-table persistence for rows of string fields.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TableStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read every data row of `table`, header excluded. A missing table is
  /// empty; any other failure is an error.
  fn try_read(
    &self,
    table: &'static TableDef,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + '_;

  /// Lenient variant of [`TableStore::try_read`]: failures read as an empty
  /// table and are logged.
  fn read(
    &self,
    table: &'static TableDef,
  ) -> impl Future<Output = Vec<Row>> + Send + '_ {
    async move {
      match self.try_read(table).await {
        Ok(rows) => rows,
        Err(e) => {
          tracing::warn!(table = table.file, error = %e, "unreadable table treated as empty");
          Vec::new()
        }
      }
    }
  }

  /// Replace the whole table with `rows` under the table's header.
  fn write(
    &self,
    table: &'static TableDef,
    rows: Vec<Row>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Add one row without reading or rewriting the existing content.
  fn append(
    &self,
    table: &'static TableDef,
    row: Row,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// Create/find/update/delete for one entity type over a [`TableStore`].
pub struct Repository<T, S> {
  store:  Arc<S>,
  _table: PhantomData<fn() -> T>,
}

impl<T, S> Clone for Repository<T, S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), _table: PhantomData }
  }
}

impl<T, S> Repository<T, S>
where
  T: Record,
  S: TableStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store, _table: PhantomData } }

  /// Every record in the table; empty if the table cannot be read. Rows
  /// that do not decode are skipped and logged.
  pub async fn find_all(&self) -> Result<Vec<T>> {
    let rows = self.store.read(&T::TABLE).await;
    Ok(decode_lenient(&rows))
  }

  pub async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
    if id.is_empty() {
      return Ok(None);
    }
    Ok(self.find_all().await?.into_iter().find(|r| r.id() == id))
  }

  /// Insert or replace `record`, assigning an id first if it has none.
  /// Returns the record as saved.
  pub async fn save(&self, mut record: T) -> Result<T> {
    let mut records = self.load_for_write().await?;
    backfill_ids(&mut records)?;

    if record.id().is_empty() {
      let id = next_id(
        T::id_policy(),
        T::TABLE.entity,
        records.iter().map(Record::id),
      )?;
      record.set_id(id);
    }

    match records.iter_mut().find(|r| r.id() == record.id()) {
      Some(slot) => *slot = record.clone(),
      None => records.push(record.clone()),
    }

    self.write_all(&records).await?;
    Ok(record)
  }

  /// Remove the record with `id`. Returns `false`, leaving the table
  /// untouched, if no such record exists.
  pub async fn delete(&self, id: &str) -> Result<bool> {
    if id.is_empty() {
      return Ok(false);
    }
    let mut records = self.load_for_write().await?;
    let before = records.len();
    records.retain(|r| r.id() != id);
    if records.len() == before {
      return Ok(false);
    }
    self.write_all(&records).await?;
    Ok(true)
  }

  /// Fast-path insert for a record that already carries its id. No
  /// duplicate check is made.
  pub async fn append(&self, record: &T) -> Result<()> {
    if record.id().is_empty() {
      return Err(Error::MissingId(T::TABLE.entity));
    }
    self
      .store
      .append(&T::TABLE, record.to_row())
      .await
      .map_err(Error::store)
  }

  async fn load_for_write(&self) -> Result<Vec<T>> {
    let rows = self.store.try_read(&T::TABLE).await.map_err(Error::store)?;
    decode_all(&rows)
  }

  async fn write_all(&self, records: &[T]) -> Result<()> {
    let rows = records.iter().map(Record::to_row).collect();
    self.store.write(&T::TABLE, rows).await.map_err(Error::store)
  }
}

fn decode_all<T: Record>(rows: &[Row]) -> Result<Vec<T>> {
  rows.iter().map(|row| T::from_row(row)).collect()
}

fn decode_lenient<T: Record>(rows: &[Row]) -> Vec<T> {
  rows
    .iter()
    .enumerate()
    .filter_map(|(i, row)| match T::from_row(row) {
      Ok(record) => Some(record),
      Err(e) => {
        tracing::warn!(table = T::TABLE.file, row = i + 1, error = %e, "undecodable row skipped");
        None
      }
    })
    .collect()
}

/// Give legacy records that were stored without an id their own id.
fn backfill_ids<T: Record>(records: &mut [T]) -> Result<()> {
  for i in 0..records.len() {
    if records[i].id().is_empty() {
      let id = next_id(
        T::id_policy(),
        T::TABLE.entity,
        records.iter().map(Record::id),
      )?;
      tracing::debug!(table = T::TABLE.file, %id, "assigned id to legacy row");
      records[i].set_id(id);
    }
  }
  Ok(())
}
