//! # Merged - a stack of reftables read as one table
//!
//! New data lands as a new table on top of the stack instead of being merged
//! into existing tables right away. [`MergedTable`] reconciles the stack at
//! read time: a seek fans out to every table and the per-table iterators are
//! merged by [`MergedIter`], newest table winning on equal keys.
//!
//! ```text
//!  seek(rec) / refs_for(oid)
//!        |
//!        v
//! ┌──────────────────────────────────────┐
//! │ MergedTable                          │
//! │   table[n-1]  (newest)  ─┐           │
//! │   ...                    ├─> MergedIter (priority queue)
//! │   table[0]    (oldest)  ─┘           │
//! └──────────────────────────────────────┘
//!        |
//!        v  refs_for only
//!  FilteringRefIterator (re-reads each candidate through the stack)
//! ```
//!
//! ## Stack invariant
//!
//! Tables are ordered oldest to newest and their update-index ranges must be
//! strictly increasing: `table[i - 1].max_update_index() <
//! table[i].min_update_index()`. This is what makes "higher stack index wins"
//! the same as "more recent write wins". A stack violating it is rejected by
//! [`MergedTable::new`].

mod iter;
mod pq;

pub use iter::MergedIter;

use record::{Record, RecordType};
use std::sync::Arc;
use table::{FilteringRefIterator, RecordIterator, ReftableError, Result, Table};
use tracing::{debug, warn};

/// A read-only view of a stack of tables.
///
/// Immutable after construction; to add a table, build a new `MergedTable`
/// over the extended list.
pub struct MergedTable {
    /// Ordered oldest to newest.
    stack: Vec<Arc<dyn Table>>,
    min: u64,
    max: u64,
}

impl std::fmt::Debug for MergedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergedTable")
            .field("tables", &self.stack.len())
            .field("min_update_index", &self.min)
            .field("max_update_index", &self.max)
            .finish()
    }
}

impl MergedTable {
    /// Creates a merged view of `stack`, ordered oldest to newest.
    ///
    /// # Errors
    ///
    /// Returns [`ReftableError::UpdateIndexOverlap`] naming the first pair of
    /// adjacent tables whose update-index ranges are not strictly increasing.
    pub fn new(stack: Vec<Arc<dyn Table>>) -> Result<Self> {
        for (i, pair) in stack.windows(2).enumerate() {
            let (prev, cur) = (&pair[0], &pair[1]);
            if prev.max_update_index() >= cur.min_update_index() {
                let err = ReftableError::UpdateIndexOverlap {
                    index: i + 1,
                    min: cur.min_update_index(),
                    prev: i,
                    prev_max: prev.max_update_index(),
                };
                warn!(error = %err, "rejecting table stack");
                return Err(err);
            }
        }

        let min = stack.first().map_or(0, |t| t.min_update_index());
        let max = stack.last().map_or(0, |t| t.max_update_index());
        debug!(tables = stack.len(), min, max, "opened merged table");

        Ok(Self { stack, min, max })
    }

    /// Number of stacked tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The stacked tables, oldest first.
    #[must_use]
    pub fn tables(&self) -> &[Arc<dyn Table>] {
        &self.stack
    }
}

impl Table for MergedTable {
    /// The oldest table's minimum update index (`0` for an empty stack).
    fn min_update_index(&self) -> u64 {
        self.min
    }

    /// The newest table's maximum update index (`0` for an empty stack).
    fn max_update_index(&self) -> u64 {
        self.max
    }

    fn seek(&self, rec: &Record) -> Result<Box<dyn RecordIterator + '_>> {
        let iters = self
            .stack
            .iter()
            .map(|t| t.seek(rec))
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(MergedIter::new(rec.record_type(), iters)?))
    }

    /// Refs pointing at `oid` in the merged view.
    ///
    /// Each table answers from its own contents, so a ref it reports may be
    /// shadowed by a newer table with a different value. Every candidate is
    /// therefore re-read through this stack before it is returned.
    fn refs_for(&self, oid: &[u8]) -> Result<Box<dyn RecordIterator + '_>> {
        let iters = self
            .stack
            .iter()
            .map(|t| t.refs_for(oid))
            .collect::<Result<Vec<_>>>()?;
        let merged = MergedIter::new(RecordType::Ref, iters)?;
        Ok(Box::new(FilteringRefIterator::double_checked(
            Box::new(merged),
            oid,
            self,
        )))
    }
}

#[cfg(test)]
mod tests;
