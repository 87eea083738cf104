//! In-memory [`TableStore`] fake for unit tests.

use std::{
  collections::HashMap,
  io,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use crate::{
  record::{Row, TableDef},
  store::TableStore,
};

#[derive(Default)]
pub(crate) struct MemoryStore {
  tables:     Mutex<HashMap<&'static str, Vec<Row>>>,
  writes:     AtomicUsize,
  fail_reads: AtomicBool,
}

impl MemoryStore {
  pub fn seed(&self, table: &TableDef, rows: Vec<Row>) {
    self.tables.lock().unwrap().insert(table.file, rows);
  }

  pub fn snapshot(&self, table: &TableDef) -> Vec<Row> {
    self.tables.lock().unwrap().get(table.file).cloned().unwrap_or_default()
  }

  pub fn write_count(&self) -> usize { self.writes.load(Ordering::SeqCst) }

  pub fn fail_reads(&self, fail: bool) { self.fail_reads.store(fail, Ordering::SeqCst); }
}

impl TableStore for MemoryStore {
  type Error = io::Error;

  async fn try_read(&self, table: &'static TableDef) -> Result<Vec<Row>, io::Error> {
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(io::Error::other("injected read failure"));
    }
    Ok(self.snapshot(table))
  }

  async fn write(&self, table: &'static TableDef, rows: Vec<Row>) -> Result<(), io::Error> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    self.tables.lock().unwrap().insert(table.file, rows);
    Ok(())
  }

  async fn append(&self, table: &'static TableDef, row: Row) -> Result<(), io::Error> {
    self.tables.lock().unwrap().entry(table.file).or_default().push(row);
    Ok(())
  }
}
