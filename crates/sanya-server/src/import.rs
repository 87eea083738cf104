//! Bulk import of table files through the append fast path.
//!
//! The source file uses the same layout as the data directory (header row
//! first). Every row must already carry an id; rows whose id is present in
//! the target table are skipped.

use std::{collections::HashSet, path::Path, sync::Arc};

use anyhow::{Context as _, bail};
use sanya_core::{
  politician::{Campaign, Politician},
  promise::{Promise, PromiseUpdate},
  record::{Record, Row},
  store::{Repository, TableStore},
  user::User,
};

/// A table that can be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Table {
  Politicians,
  Campaigns,
  Promises,
  PromiseUpdates,
  Users,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
  pub imported: usize,
  pub skipped:  usize,
}

/// Append every row of the file at `path` to `table`.
pub async fn import_file<S>(store: Arc<S>, table: Table, path: &Path) -> anyhow::Result<ImportReport>
where
  S: TableStore,
{
  let text = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read {}", path.display()))?;
  let rows = sanya_csv::parse_rows(&text)
    .with_context(|| format!("failed to parse {}", path.display()))?;

  match table {
    Table::Politicians => import_rows::<Politician, S>(store, rows).await,
    Table::Campaigns => import_rows::<Campaign, S>(store, rows).await,
    Table::Promises => import_rows::<Promise, S>(store, rows).await,
    Table::PromiseUpdates => import_rows::<PromiseUpdate, S>(store, rows).await,
    Table::Users => import_rows::<User, S>(store, rows).await,
  }
}

async fn import_rows<T, S>(store: Arc<S>, rows: Vec<Row>) -> anyhow::Result<ImportReport>
where
  T: Record,
  S: TableStore,
{
  let records = rows
    .iter()
    .enumerate()
    .map(|(i, row)| {
      // +2: one for the header, one for 1-based numbering.
      T::from_row(row).with_context(|| format!("record {} is invalid", i + 2))
    })
    .collect::<anyhow::Result<Vec<T>>>()?;

  if let Some(pos) = records.iter().position(|r| r.id().is_empty()) {
    bail!("record {} has no id; import needs pre-assigned ids", pos + 2);
  }

  let repo = Repository::<T, S>::new(store);
  let mut seen: HashSet<String> =
    repo.find_all().await?.iter().map(|r| r.id().to_owned()).collect();

  let mut report = ImportReport::default();
  for record in &records {
    if !seen.insert(record.id().to_owned()) {
      tracing::warn!(table = T::TABLE.file, id = record.id(), "duplicate id skipped");
      report.skipped += 1;
      continue;
    }
    repo.append(record).await?;
    report.imported += 1;
  }

  tracing::info!(
    table = T::TABLE.file,
    imported = report.imported,
    skipped = report.skipped,
    "import finished",
  );
  Ok(report)
}
