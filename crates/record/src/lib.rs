//! # Record - reftable record model
//!
//! Records are the unit the merged read path moves around. Every record kind
//! exposes the same small capability set:
//!
//! - a sortable **key** (plain byte order defines the table order),
//! - a **type tag** ([`RecordType`]) so a seek can be restricted to one kind,
//! - **copy_from**, which overwrites a destination record with a same-kind
//!   source. Iterators fill caller-owned destinations through it.
//!
//! ## Keys
//!
//! ```text
//! ref:  ref_name
//! log:  ref_name | 0x00 | (u64::MAX - update_index) as u64 BE
//! ```
//!
//! The inverted update index makes the newest log entry of a ref sort first.

use byteorder::{BigEndian, ByteOrder};
use std::fmt;
use thiserror::Error;

/// Kind of a record. A seek is restricted to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Reference name to object id.
    Ref,
    /// Reflog entry.
    Log,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Ref => f.write_str("ref"),
            RecordType::Log => f.write_str("log"),
        }
    }
}

/// Errors raised by record operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// `copy_from` (or an iterator) was handed a record of another kind.
    #[error("record type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: RecordType,
        actual: RecordType,
    },
}

/// A reference: name plus what it points at.
///
/// A plain ref carries `value`. A symbolic ref carries `target` and, when it
/// could be resolved at write time, the peeled `target_value`. A record with
/// none of the three is a deletion and shadows older entries for the name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefRecord {
    pub ref_name: String,
    pub update_index: u64,
    /// Object id the ref points to directly.
    pub value: Option<Vec<u8>>,
    /// Object id a symbolic ref resolves to.
    pub target_value: Option<Vec<u8>>,
    /// Name of the ref a symbolic ref points to.
    pub target: Option<String>,
}

impl RefRecord {
    /// Creates a ref pointing directly at `value`.
    pub fn new(ref_name: impl Into<String>, update_index: u64, value: Vec<u8>) -> Self {
        Self {
            ref_name: ref_name.into(),
            update_index,
            value: Some(value),
            target_value: None,
            target: None,
        }
    }

    /// Creates a symbolic ref to `target`, optionally peeled to `target_value`.
    pub fn symbolic(
        ref_name: impl Into<String>,
        update_index: u64,
        target: impl Into<String>,
        target_value: Option<Vec<u8>>,
    ) -> Self {
        Self {
            ref_name: ref_name.into(),
            update_index,
            value: None,
            target_value,
            target: Some(target.into()),
        }
    }

    /// Creates a deletion (tombstone) for `ref_name`.
    pub fn deletion(ref_name: impl Into<String>, update_index: u64) -> Self {
        Self {
            ref_name: ref_name.into(),
            update_index,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn key(&self) -> Vec<u8> {
        self.ref_name.as_bytes().to_vec()
    }

    /// Returns `true` if this record only marks `ref_name` as deleted.
    #[must_use]
    pub fn is_deletion(&self) -> bool {
        self.value.is_none() && self.target_value.is_none() && self.target.is_none()
    }

    /// Returns `true` if either the direct or the peeled value equals `oid`.
    #[must_use]
    pub fn points_to(&self, oid: &[u8]) -> bool {
        self.value.as_deref() == Some(oid) || self.target_value.as_deref() == Some(oid)
    }
}

/// A reflog entry for one ref at one update index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    pub ref_name: String,
    pub update_index: u64,
    pub old_hash: Option<Vec<u8>>,
    pub new_hash: Option<Vec<u8>>,
    pub name: String,
    pub email: String,
    /// Seconds since the epoch.
    pub time: u64,
    /// Offset from UTC in minutes.
    pub tz_offset: i16,
    pub message: String,
}

impl LogRecord {
    #[must_use]
    pub fn key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.ref_name.len() + 9);
        key.extend_from_slice(self.ref_name.as_bytes());
        key.push(0);
        let mut ts = [0u8; 8];
        BigEndian::write_u64(&mut ts, u64::MAX - self.update_index);
        key.extend_from_slice(&ts);
        key
    }
}

/// Any record that can live in a reftable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Ref(RefRecord),
    Log(LogRecord),
}

impl Record {
    /// Creates an empty record of kind `typ`.
    ///
    /// A non-empty `key` turns the record into a seek target: seeking with it
    /// positions before the first record of that name. For logs this is the
    /// newest entry, so the update index is set to `u64::MAX`.
    pub fn new(typ: RecordType, key: &str) -> Self {
        match typ {
            RecordType::Ref => Record::Ref(RefRecord {
                ref_name: key.to_string(),
                ..RefRecord::default()
            }),
            RecordType::Log => Record::Log(LogRecord {
                ref_name: key.to_string(),
                update_index: u64::MAX,
                ..LogRecord::default()
            }),
        }
    }

    #[must_use]
    pub fn key(&self) -> Vec<u8> {
        match self {
            Record::Ref(r) => r.key(),
            Record::Log(l) => l.key(),
        }
    }

    #[must_use]
    pub fn record_type(&self) -> RecordType {
        match self {
            Record::Ref(_) => RecordType::Ref,
            Record::Log(_) => RecordType::Log,
        }
    }

    /// Overwrites every field of `self` with `src`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::TypeMismatch`] if `src` is another kind; `self`
    /// is left unchanged in that case.
    pub fn copy_from(&mut self, src: &Record) -> Result<(), RecordError> {
        match (self, src) {
            (Record::Ref(dst), Record::Ref(s)) => dst.clone_from(s),
            (Record::Log(dst), Record::Log(s)) => dst.clone_from(s),
            (dst, src) => {
                return Err(RecordError::TypeMismatch {
                    expected: dst.record_type(),
                    actual: src.record_type(),
                })
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn as_ref_record(&self) -> Option<&RefRecord> {
        match self {
            Record::Ref(r) => Some(r),
            Record::Log(_) => None,
        }
    }

    #[must_use]
    pub fn as_log_record(&self) -> Option<&LogRecord> {
        match self {
            Record::Log(l) => Some(l),
            Record::Ref(_) => None,
        }
    }

    /// Consumes the record, returning the ref payload if it is one.
    #[must_use]
    pub fn into_ref_record(self) -> Option<RefRecord> {
        match self {
            Record::Ref(r) => Some(r),
            Record::Log(_) => None,
        }
    }
}

impl From<RefRecord> for Record {
    fn from(r: RefRecord) -> Self {
        Record::Ref(r)
    }
}

impl From<LogRecord> for Record {
    fn from(l: LogRecord) -> Self {
        Record::Log(l)
    }
}
