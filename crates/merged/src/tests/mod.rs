
use record::{Record, RefRecord};
use std::io;
use std::sync::Arc;
use table::{MemTable, RecordIterator, Result, Table};

use crate::MergedTable;

pub(crate) fn oid(b: u8) -> Vec<u8> {
    vec![b; 20]
}

/// A table covering `[min, max]` whose refs `(name, oid byte)` are written at
/// update index `max`.
pub(crate) fn ref_table(min: u64, max: u64, refs: &[(&str, u8)]) -> Arc<dyn Table> {
    let mut t = MemTable::new(min, max).unwrap();
    for &(name, b) in refs {
        t.add_ref(RefRecord::new(name, max, oid(b))).unwrap();
    }
    Arc::new(t)
}

pub(crate) fn stack(tables: Vec<Arc<dyn Table>>) -> MergedTable {
    MergedTable::new(tables).unwrap()
}

/// Drains a ref iterator into `(name, value byte)` pairs; deletions map to `None`.
pub(crate) fn drain(it: &mut dyn RecordIterator) -> Vec<(String, Option<u8>)> {
    let mut out = Vec::new();
    while let Some(r) = it.next_ref().unwrap() {
        out.push((r.ref_name, r.value.map(|v| v[0])));
    }
    out
}

/// Wraps a table so that its iterators fail after `ok` successful pulls.
pub(crate) struct FlakyTable {
    pub inner: MemTable,
    pub ok: usize,
    pub fail_seek: bool,
}

struct FlakyIter<'a> {
    inner: Box<dyn RecordIterator + 'a>,
    ok: usize,
}

impl RecordIterator for FlakyIter<'_> {
    fn next_record(&mut self, rec: &mut Record) -> Result<bool> {
        if self.ok == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "checksum mismatch").into());
        }
        self.ok -= 1;
        self.inner.next_record(rec)
    }
}

impl Table for FlakyTable {
    fn min_update_index(&self) -> u64 {
        self.inner.min_update_index()
    }

    fn max_update_index(&self) -> u64 {
        self.inner.max_update_index()
    }

    fn seek(&self, rec: &Record) -> Result<Box<dyn RecordIterator + '_>> {
        if self.fail_seek {
            return Err(io::Error::new(io::ErrorKind::NotFound, "table file vanished").into());
        }
        Ok(Box::new(FlakyIter {
            inner: self.inner.seek(rec)?,
            ok: self.ok,
        }))
    }

    fn refs_for(&self, oid: &[u8]) -> Result<Box<dyn RecordIterator + '_>> {
        Ok(Box::new(FlakyIter {
            inner: self.inner.refs_for(oid)?,
            ok: self.ok,
        }))
    }
}
