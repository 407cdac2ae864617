//! Reverse lookup filter: keep only the refs that point at one object id.
//!
//! A table without an object index answers `refs_for` by scanning every ref
//! through this filter. The merged stack uses it with an authoritative table
//! attached: a per-table match may be shadowed by a newer table, so each
//! candidate is re-read through the merged view before it is accepted.

use record::{Record, RecordError, RecordType};
use tracing::trace;

use crate::{RecordIterator, Result, Table};

pub struct FilteringRefIterator<'a> {
    oid: Vec<u8>,
    /// Authoritative table for the double check, if any.
    table: Option<&'a dyn Table>,
    inner: Box<dyn RecordIterator + 'a>,
}

impl<'a> FilteringRefIterator<'a> {
    /// Filters `inner` for refs pointing at `oid`, trusting its records.
    pub fn new(inner: Box<dyn RecordIterator + 'a>, oid: &[u8]) -> Self {
        Self {
            oid: oid.to_vec(),
            table: None,
            inner,
        }
    }

    /// Filters `inner`, re-resolving every candidate through `table` first.
    pub fn double_checked(
        inner: Box<dyn RecordIterator + 'a>,
        oid: &[u8],
        table: &'a dyn Table,
    ) -> Self {
        Self {
            oid: oid.to_vec(),
            table: Some(table),
            inner,
        }
    }

    /// Replaces `rec` with the record `table` currently holds for its name.
    ///
    /// Returns `false` if the name no longer resolves to a record.
    fn resolve(table: &dyn Table, rec: &mut Record) -> Result<bool> {
        let key = rec.key();
        let mut it = table.seek(rec)?;
        let mut current = Record::new(RecordType::Ref, "");
        if !it.next_record(&mut current)? || current.key() != key {
            return Ok(false);
        }
        rec.copy_from(&current)?;
        Ok(true)
    }
}

impl RecordIterator for FilteringRefIterator<'_> {
    fn next_record(&mut self, rec: &mut Record) -> Result<bool> {
        if rec.record_type() != RecordType::Ref {
            return Err(RecordError::TypeMismatch {
                expected: RecordType::Ref,
                actual: rec.record_type(),
            }
            .into());
        }

        loop {
            if !self.inner.next_record(rec)? {
                return Ok(false);
            }

            if let Some(table) = self.table {
                if !Self::resolve(table, rec)? {
                    continue;
                }
            }

            if rec.as_ref_record().is_some_and(|r| r.points_to(&self.oid)) {
                return Ok(true);
            }
            trace!(key = ?String::from_utf8_lossy(&rec.key()), "skipping ref not pointing at oid");
        }
    }
}
