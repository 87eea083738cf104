//! The flat-file implementation of [`TableStore`], [`CsvStore`].

use std::{
  io::{self, ErrorKind, Write as _},
  path::{Path, PathBuf},
};

use sanya_core::{
  record::{Row, TableDef},
  store::TableStore,
};
use tokio::{fs, io::AsyncWriteExt as _};

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Tables stored as `<root>/<table file>`.
///
/// Cloning is cheap; the store holds nothing but its root path.
#[derive(Debug, Clone)]
pub struct CsvStore {
  root: PathBuf,
}

impl CsvStore {
  /// A store rooted at `root`. Nothing is touched until the first write.
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Like [`CsvStore::new`], but create the data directory up front.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let store = Self::new(root);
    store.ensure_root().await?;
    Ok(store)
  }

  pub fn root(&self) -> &Path { &self.root }

  pub fn path_of(&self, table: &TableDef) -> PathBuf { self.root.join(table.file) }

  async fn ensure_root(&self) -> Result<()> {
    fs::create_dir_all(&self.root)
      .await
      .map_err(|e| Error::io(&self.root, e))
  }

  /// Size of the table file in bytes, `0` if it does not exist.
  async fn file_len(path: &Path) -> Result<u64> {
    match fs::metadata(path).await {
      Ok(meta) => Ok(meta.len()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
      Err(e) => Err(Error::io(path, e)),
    }
  }
}

// ─── TableStore impl ─────────────────────────────────────────────────────────

impl TableStore for CsvStore {
  type Error = Error;

  async fn try_read(&self, table: &'static TableDef) -> Result<Vec<Row>> {
    let path = self.path_of(table);
    let text = match fs::read_to_string(&path).await {
      Ok(text) => text,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(Error::io(path, e)),
    };
    sanya_csv::parse_rows(&text).map_err(|source| Error::Csv { file: table.file, source })
  }

  /// Serialise to a fresh temp file in the data directory, then rename it
  /// over the table. Each call owns its temp file.
  async fn write(&self, table: &'static TableDef, rows: Vec<Row>) -> Result<()> {
    self.ensure_root().await?;
    let root = self.root.clone();
    let path = self.path_of(table);
    let text = sanya_csv::serialize_table(table.headers, &rows);

    tokio::task::spawn_blocking(move || replace_file(&root, &path, table.file, &text))
      .await
      .map_err(|e| Error::io(self.path_of(table), io::Error::other(e)))??;

    tracing::debug!(table = table.file, rows = rows.len(), "table written");
    Ok(())
  }

  async fn append(&self, table: &'static TableDef, row: Row) -> Result<()> {
    self.ensure_root().await?;
    let path = self.path_of(table);

    let mut chunk = String::new();
    if Self::file_len(&path).await? == 0 {
      chunk.push_str(&sanya_csv::serialize_record(table.headers));
    }
    chunk.push('\n');
    chunk.push_str(&sanya_csv::serialize_record(&row));

    let mut file = fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .await
      .map_err(|e| Error::io(&path, e))?;
    file.write_all(chunk.as_bytes()).await.map_err(|e| Error::io(&path, e))?;
    file.flush().await.map_err(|e| Error::io(&path, e))?;

    tracing::debug!(table = table.file, "row appended");
    Ok(())
  }
}

fn replace_file(root: &Path, path: &Path, file: &str, text: &str) -> Result<()> {
  let mut tmp = tempfile::Builder::new()
    .prefix(&format!(".{file}."))
    .suffix(".tmp")
    .tempfile_in(root)
    .map_err(|e| Error::io(root, e))?;
  tmp.write_all(text.as_bytes()).map_err(|e| Error::io(tmp.path(), e))?;
  tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
  tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
  Ok(())
}
