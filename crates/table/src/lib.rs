//! # Table - reftable contracts and the in-memory table
//!
//! The merged read path only talks to tables through two small traits:
//!
//! - [`Table`]: one immutable, sorted table covering an inclusive range of
//!   update indices. It can seek to a key (restricted to one record kind) and
//!   answer "which refs point at this object id" on its own.
//! - [`RecordIterator`]: a pull-based cursor filling caller-owned records.
//!
//! The crate also carries the pieces every table implementation shares:
//!
//! | Module       | Purpose                                                |
//! |--------------|--------------------------------------------------------|
//! | [`error`]    | [`ReftableError`] and the crate `Result` alias           |
//! | [`iter`]     | [`RecordIterator`], [`EmptyIterator`]                   |
//! | [`filter`]   | [`FilteringRefIterator`] for reverse (oid -> ref) lookups |
//! | [`memtable`] | [`MemTable`], an in-memory sorted table with an object index |
//! | [`refname`]  | Ref name validation and directory/file conflict checks |
//! | [`basics`]   | Small helpers ([`uniq`])                               |
//!
//! ## Example
//!
//! ```rust
//! use record::RefRecord;
//! use table::{MemTable, RecordIterator, Table};
//!
//! let mut t = MemTable::new(1, 1).unwrap();
//! t.add_ref(RefRecord::new("refs/heads/main", 1, vec![7; 20])).unwrap();
//!
//! let mut it = t.refs_for(&[7; 20]).unwrap();
//! assert_eq!(it.next_ref().unwrap().unwrap().ref_name, "refs/heads/main");
//! ```

pub mod basics;
pub mod error;
pub mod filter;
pub mod iter;
pub mod memtable;
pub mod refname;

use record::{Record, RecordType, RefRecord};

pub use basics::uniq;
pub use error::{ReftableError, Result};
pub use filter::FilteringRefIterator;
pub use iter::{EmptyIterator, RecordIterator};
pub use memtable::{MemTable, WriteOptions};
pub use refname::{validate_ref_name, validate_ref_record_addition};

/// Object id size for SHA-1 repositories.
pub const SHA1_SIZE: usize = 20;
/// Object id size for SHA-256 repositories.
pub const SHA256_SIZE: usize = 32;

/// One immutable, sorted table of records.
///
/// A table covers the update indices `min_update_index()..=max_update_index()`.
/// Implementations must allow several iterators to be open at once through a
/// shared reference.
pub trait Table: Send + Sync {
    fn min_update_index(&self) -> u64;

    fn max_update_index(&self) -> u64;

    /// Returns an iterator positioned before the first record whose key is
    /// `>= rec.key()`, yielding only records of `rec`'s kind.
    fn seek(&self, rec: &Record) -> Result<Box<dyn RecordIterator + '_>>;

    /// Returns an iterator over the refs whose value or target value is `oid`.
    fn refs_for(&self, oid: &[u8]) -> Result<Box<dyn RecordIterator + '_>>;

    /// Seeks to the ref `name` (or the first ref after it).
    fn seek_ref(&self, name: &str) -> Result<Box<dyn RecordIterator + '_>> {
        self.seek(&Record::new(RecordType::Ref, name))
    }

    /// Seeks to the newest log entry of `name` (or the first entry after it).
    fn seek_log(&self, name: &str) -> Result<Box<dyn RecordIterator + '_>> {
        self.seek(&Record::new(RecordType::Log, name))
    }

    /// Point lookup of the ref `name`.
    ///
    /// Returns `Ok(None)` if the name is absent or its newest record is a
    /// deletion.
    fn read_ref(&self, name: &str) -> Result<Option<RefRecord>> {
        let mut it = self.seek_ref(name)?;
        Ok(it
            .next_ref()?
            .filter(|r| r.ref_name == name && !r.is_deletion()))
    }
}

#[cfg(test)]
mod tests;
