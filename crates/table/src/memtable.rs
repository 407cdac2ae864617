//! In-memory reftable.
//!
//! Holds refs and logs in sorted maps keyed by record key, so seeks are plain
//! range scans. With `index_objects` set, the table also keeps an object index
//! (oid -> names of the refs pointing at it) and answers `refs_for` from it
//! instead of scanning every ref.
//!
//! A table is filled through `&mut self` and becomes immutable once it is
//! shared (`Arc<MemTable>`) and stacked.

use record::{LogRecord, Record, RecordType, RefRecord};
use std::collections::btree_map::{self, BTreeMap};
use std::collections::btree_set::{self, BTreeSet};
use std::collections::HashMap;

use crate::{
    EmptyIterator, FilteringRefIterator, RecordIterator, ReftableError, Result, Table, SHA1_SIZE,
};

/// Options applied while records are added to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Size in bytes of every object id in the table.
    pub hash_size: usize,
    /// Maintain an oid -> ref index for `refs_for`.
    pub index_objects: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            hash_size: SHA1_SIZE,
            index_objects: true,
        }
    }
}

#[derive(Debug)]
pub struct MemTable {
    min_update_index: u64,
    max_update_index: u64,
    opts: WriteOptions,
    refs: BTreeMap<Vec<u8>, Record>,
    logs: BTreeMap<Vec<u8>, Record>,
    obj_index: HashMap<Vec<u8>, BTreeSet<Vec<u8>>>,
}

impl MemTable {
    /// Creates an empty table covering update indices `min..=max` with
    /// default options.
    ///
    /// # Errors
    ///
    /// Returns [`ReftableError::InvalidRange`] if `min > max`.
    pub fn new(min_update_index: u64, max_update_index: u64) -> Result<Self> {
        Self::with_options(min_update_index, max_update_index, WriteOptions::default())
    }

    pub fn with_options(
        min_update_index: u64,
        max_update_index: u64,
        opts: WriteOptions,
    ) -> Result<Self> {
        if min_update_index > max_update_index {
            return Err(ReftableError::InvalidRange {
                min: min_update_index,
                max: max_update_index,
            });
        }
        Ok(Self {
            min_update_index,
            max_update_index,
            opts,
            refs: BTreeMap::new(),
            logs: BTreeMap::new(),
            obj_index: HashMap::new(),
        })
    }

    /// Adds a ref record.
    ///
    /// # Errors
    ///
    /// - [`ReftableError::UpdateIndexOutOfRange`] if the record's update index
    ///   is outside the table's range.
    /// - [`ReftableError::HashSize`] if an object id has the wrong length.
    /// - [`ReftableError::DuplicateKey`] if the name is already present.
    pub fn add_ref(&mut self, rec: RefRecord) -> Result<()> {
        self.check_update_index(rec.update_index)?;
        self.check_hash(rec.value.as_deref())?;
        self.check_hash(rec.target_value.as_deref())?;

        let key = rec.key();
        if self.refs.contains_key(&key) {
            return Err(ReftableError::DuplicateKey(rec.ref_name));
        }

        if self.opts.index_objects {
            for oid in [&rec.value, &rec.target_value].into_iter().flatten() {
                self.obj_index
                    .entry(oid.clone())
                    .or_default()
                    .insert(key.clone());
            }
        }

        self.refs.insert(key, Record::Ref(rec));
        Ok(())
    }

    /// Adds a reflog entry. Entries are unique per `(ref_name, update_index)`.
    pub fn add_log(&mut self, rec: LogRecord) -> Result<()> {
        self.check_update_index(rec.update_index)?;
        self.check_hash(rec.old_hash.as_deref())?;
        self.check_hash(rec.new_hash.as_deref())?;

        let key = rec.key();
        if self.logs.contains_key(&key) {
            return Err(ReftableError::DuplicateKey(format!(
                "{}@{}",
                rec.ref_name, rec.update_index
            )));
        }
        self.logs.insert(key, Record::Log(rec));
        Ok(())
    }

    /// Total number of records (refs and logs).
    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len() + self.logs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty() && self.logs.is_empty()
    }

    fn check_update_index(&self, update_index: u64) -> Result<()> {
        if update_index < self.min_update_index || update_index > self.max_update_index {
            return Err(ReftableError::UpdateIndexOutOfRange {
                update_index,
                min: self.min_update_index,
                max: self.max_update_index,
            });
        }
        Ok(())
    }

    fn check_hash(&self, oid: Option<&[u8]>) -> Result<()> {
        match oid {
            Some(oid) if oid.len() != self.opts.hash_size => Err(ReftableError::HashSize {
                expected: self.opts.hash_size,
                actual: oid.len(),
            }),
            _ => Ok(()),
        }
    }
}

impl Table for MemTable {
    fn min_update_index(&self) -> u64 {
        self.min_update_index
    }

    fn max_update_index(&self) -> u64 {
        self.max_update_index
    }

    fn seek(&self, rec: &Record) -> Result<Box<dyn RecordIterator + '_>> {
        let map = match rec.record_type() {
            RecordType::Ref => &self.refs,
            RecordType::Log => &self.logs,
        };
        Ok(Box::new(MemTableIter {
            inner: map.range(rec.key()..),
        }))
    }

    fn refs_for(&self, oid: &[u8]) -> Result<Box<dyn RecordIterator + '_>> {
        if !self.opts.index_objects {
            let all = Box::new(MemTableIter {
                inner: self.refs.range(Vec::<u8>::new()..),
            });
            return Ok(Box::new(FilteringRefIterator::new(all, oid)));
        }

        let it: Box<dyn RecordIterator + '_> = match self.obj_index.get(oid) {
            Some(keys) => Box::new(ObjIndexIter {
                keys: keys.iter(),
                refs: &self.refs,
            }),
            None => Box::new(EmptyIterator),
        };
        Ok(it)
    }
}

/// Walks one of the table's sorted maps.
struct MemTableIter<'a> {
    inner: btree_map::Range<'a, Vec<u8>, Record>,
}

impl RecordIterator for MemTableIter<'_> {
    fn next_record(&mut self, rec: &mut Record) -> Result<bool> {
        match self.inner.next() {
            Some((_, r)) => {
                rec.copy_from(r)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Walks the ref names recorded for one oid, in key order.
struct ObjIndexIter<'a> {
    keys: btree_set::Iter<'a, Vec<u8>>,
    refs: &'a BTreeMap<Vec<u8>, Record>,
}

impl RecordIterator for ObjIndexIter<'_> {
    fn next_record(&mut self, rec: &mut Record) -> Result<bool> {
        for key in self.keys.by_ref() {
            if let Some(r) = self.refs.get(key) {
                rec.copy_from(r)?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}
