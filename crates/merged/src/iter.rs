//! Merged iterator over a stack of table iterators.
//!
//! Produces records in strictly ascending key order. When several sources
//! hold the same key, only the record from the highest stack index (the
//! newest table) is emitted; the others are shadowed and dropped.
//!
//! Every active sub-iterator has exactly one pending record in the queue.
//! A sub-iterator that runs dry is replaced by [`SubIter::Exhausted`] in its
//! slot, so stack indices stay stable for the queue's tie-break.

use record::{Record, RecordType};
use table::{RecordIterator, Result};
use tracing::trace;

use crate::pq::{MergedIterPQueue, PqEntry};

/// One slot of the merged stack.
enum SubIter<'a> {
    Active(Box<dyn RecordIterator + 'a>),
    Exhausted,
}

pub struct MergedIter<'a> {
    typ: RecordType,
    stack: Vec<SubIter<'a>>,
    pq: MergedIterPQueue,
}

impl<'a> MergedIter<'a> {
    /// Builds a merged iterator over `iters`, ordered oldest to newest, and
    /// primes the queue with the first record of each.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while pulling the initial records.
    pub fn new(typ: RecordType, iters: Vec<Box<dyn RecordIterator + 'a>>) -> Result<Self> {
        let mut it = Self {
            typ,
            stack: iters.into_iter().map(SubIter::Active).collect(),
            pq: MergedIterPQueue::default(),
        };
        for index in 0..it.stack.len() {
            it.advance_sub_iter(index)?;
        }
        Ok(it)
    }

    /// Pulls the next record of source `index` into the queue, or marks the
    /// source exhausted.
    fn advance_sub_iter(&mut self, index: usize) -> Result<()> {
        let SubIter::Active(sub) = &mut self.stack[index] else {
            return Ok(());
        };

        let mut rec = Record::new(self.typ, "");
        if !sub.next_record(&mut rec)? {
            self.stack[index] = SubIter::Exhausted;
            return Ok(());
        }

        self.pq.add(PqEntry::new(rec, index));
        Ok(())
    }
}

impl RecordIterator for MergedIter<'_> {
    fn next_record(&mut self, rec: &mut Record) -> Result<bool> {
        let Some(entry) = self.pq.remove() else {
            return Ok(false);
        };
        self.advance_sub_iter(entry.index)?;

        while let Some(top) = self.pq.top() {
            if top.key > entry.key {
                break;
            }
            let Some(shadowed) = self.pq.remove() else {
                break;
            };
            trace!(
                key = %String::from_utf8_lossy(&entry.key),
                winner = entry.index,
                shadowed = shadowed.index,
                "dropping shadowed record"
            );
            self.advance_sub_iter(shadowed.index)?;
        }

        if cfg!(debug_assertions) {
            self.pq.check();
        }

        rec.copy_from(&entry.rec)?;
        Ok(true)
    }
}
