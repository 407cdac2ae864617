use record::RecordError;
use std::io;
use thiserror::Error;

/// Errors surfaced by tables, iterators and the merged stack.
#[derive(Debug, Error)]
pub enum ReftableError {
    /// An underlying I/O error from a table implementation.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A record of the wrong kind was passed where another was required.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Adjacent stacked tables have overlapping or decreasing update indices.
    #[error("table {index} has min {min}, table {prev} has max {prev_max}; indices must be increasing")]
    UpdateIndexOverlap {
        index: usize,
        min: u64,
        prev: usize,
        prev_max: u64,
    },

    /// A table was declared with `min > max`.
    #[error("invalid update index range: min {min} > max {max}")]
    InvalidRange { min: u64, max: u64 },

    /// A record's update index falls outside its table's range.
    #[error("update index {update_index} outside table range [{min}, {max}]")]
    UpdateIndexOutOfRange { update_index: u64, min: u64, max: u64 },

    /// The same key was added to a table twice.
    #[error("duplicate key {0:?}")]
    DuplicateKey(String),

    /// An object id does not have the table's hash size.
    #[error("object id has {actual} bytes, expected {expected}")]
    HashSize { expected: usize, actual: usize },

    /// A ref name is malformed (empty, a control character, an empty component, `.` or `..`).
    #[error("invalid ref name {0:?}")]
    RefName(String),

    /// Adding `name` would create a directory/file conflict with `existing`.
    #[error("ref name {name:?} conflicts with {existing:?}")]
    NameConflict { name: String, existing: String },
}

pub type Result<T> = std::result::Result<T, ReftableError>;
