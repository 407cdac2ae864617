use record::{Record, RecordError, RecordType, RefRecord};

use crate::Result;

/// Pull-based cursor over the records of one table (or a merge of several).
///
/// Each call fills a caller-owned destination of the iterator's record kind.
/// `Ok(false)` signals exhaustion; once an error is returned the iterator is
/// considered failed and should not be polled again.
pub trait RecordIterator {
    /// Reads the next record into `rec`.
    ///
    /// # Errors
    ///
    /// Propagates I/O or decoding failures of the underlying table, and
    /// [`RecordError::TypeMismatch`] if `rec` is of another kind.
    fn next_record(&mut self, rec: &mut Record) -> Result<bool>;

    /// Reads the next ref, or `None` when exhausted.
    fn next_ref(&mut self) -> Result<Option<RefRecord>> {
        let mut rec = Record::new(RecordType::Ref, "");
        if !self.next_record(&mut rec)? {
            return Ok(None);
        }
        let actual = rec.record_type();
        rec.into_ref_record().map(Some).ok_or_else(|| {
            RecordError::TypeMismatch {
                expected: RecordType::Ref,
                actual,
            }
            .into()
        })
    }

    /// Drains the iterator into a `Vec` of `typ` records.
    ///
    /// Mostly useful for tests and diagnostics.
    fn collect_records(&mut self, typ: RecordType) -> Result<Vec<Record>> {
        let mut out = Vec::new();
        let mut rec = Record::new(typ, "");
        while self.next_record(&mut rec)? {
            out.push(rec.clone());
        }
        Ok(out)
    }
}

/// An iterator with nothing in it.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyIterator;

impl RecordIterator for EmptyIterator {
    fn next_record(&mut self, _rec: &mut Record) -> Result<bool> {
        Ok(false)
    }
}
