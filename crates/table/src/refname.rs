//! Ref name validation.
//!
//! Besides syntax, a new ref must not collide with the directory structure
//! of existing refs: `refs/heads/a` cannot coexist with `refs/heads/a/b`.
//! Additions are checked against a table (usually the merged stack) overlaid
//! with the rest of the same modification.

use record::RefRecord;
use tracing::debug;

use crate::{uniq, ReftableError, Result, Table};

/// Checks that `name` is non-empty, free of control characters, and that
/// none of its `/`-separated components is empty, `.` or `..`.
///
/// Control characters include NUL, which separates the name from the update
/// index in reflog keys.
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.chars().any(char::is_control)
        || name
            .split('/')
            .any(|comp| comp.is_empty() || comp == "." || comp == "..")
    {
        return Err(ReftableError::RefName(name.to_string()));
    }
    Ok(())
}

/// Validates adding `recs` on top of `table`.
///
/// Deletion records in `recs` remove names; every other record adds one.
///
/// # Errors
///
/// - [`ReftableError::RefName`] for a malformed added name.
/// - [`ReftableError::NameConflict`] if an added name is a parent directory
///   of an existing ref, or one of its parent directories is a ref.
pub fn validate_ref_record_addition(table: &dyn Table, recs: &[RefRecord]) -> Result<()> {
    let (del, add): (Vec<&RefRecord>, Vec<&RefRecord>) = recs.iter().partition(|r| r.is_deletion());
    let names = |v: Vec<&RefRecord>| uniq(v.into_iter().map(|r| r.ref_name.clone()).collect());

    Modification {
        table,
        add: names(add),
        del: names(del),
    }
    .validate()
}

/// A pending change: names added and deleted on top of `table`.
///
/// `add` and `del` are sorted so lookups can binary search.
struct Modification<'a> {
    table: &'a dyn Table,
    add: Vec<String>,
    del: Vec<String>,
}

impl Modification<'_> {
    fn validate(&self) -> Result<()> {
        for name in &self.add {
            validate_ref_name(name)?;

            let dir = format!("{name}/");
            if let Some(existing) = self.first_ref_with_prefix(&dir)? {
                return Err(self.conflict(name, existing));
            }

            let mut parent = name.as_str();
            while let Some(pos) = parent.rfind('/') {
                parent = &parent[..pos];
                if self.has_ref(parent)? {
                    return Err(self.conflict(name, parent.to_string()));
                }
            }
        }
        Ok(())
    }

    fn has_ref(&self, name: &str) -> Result<bool> {
        if self.add.binary_search_by(|n| n.as_str().cmp(name)).is_ok() {
            return Ok(true);
        }
        if self.del.binary_search_by(|n| n.as_str().cmp(name)).is_ok() {
            return Ok(false);
        }
        Ok(self.table.read_ref(name)?.is_some())
    }

    /// Returns the first live ref whose name starts with `prefix`.
    fn first_ref_with_prefix(&self, prefix: &str) -> Result<Option<String>> {
        let idx = self.add.partition_point(|n| n.as_str() < prefix);
        if let Some(added) = self.add.get(idx).filter(|n| n.starts_with(prefix)) {
            return Ok(Some(added.clone()));
        }

        let mut it = self.table.seek_ref(prefix)?;
        while let Some(r) = it.next_ref()? {
            if !r.ref_name.starts_with(prefix) {
                break;
            }
            if r.is_deletion() || self.del.binary_search(&r.ref_name).is_ok() {
                continue;
            }
            return Ok(Some(r.ref_name));
        }
        Ok(None)
    }

    fn conflict(&self, name: &str, existing: String) -> ReftableError {
        debug!(name, existing = %existing, "ref name conflict");
        ReftableError::NameConflict {
            name: name.to_string(),
            existing,
        }
    }
}
