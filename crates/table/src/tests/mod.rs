
use record::RefRecord;

use crate::MemTable;

pub(crate) fn oid(b: u8) -> Vec<u8> {
    vec![b; 20]
}

/// Builds a table covering `[min, max]` holding refs `(name, oid byte)`,
/// each written at update index `max`.
pub(crate) fn ref_table(min: u64, max: u64, refs: &[(&str, u8)]) -> MemTable {
    let mut t = MemTable::new(min, max).unwrap();
    for &(name, b) in refs {
        t.add_ref(RefRecord::new(name, max, oid(b))).unwrap();
    }
    t
}
