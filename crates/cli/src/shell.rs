//! Shell state: the committed stack plus an optional pending table.

use anyhow::{bail, Context, Result};
use config::Config;
use merged::MergedTable;
use record::{LogRecord, Record, RecordType, RefRecord};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use table::{validate_ref_record_addition, MemTable, RecordIterator, Table, WriteOptions};
use tracing::info;

const COMMITTER: &str = "reftable-cli";
const COMMITTER_EMAIL: &str = "reftable-cli@localhost";

pub struct Shell {
    opts: WriteOptions,
    stack: MergedTable,
    pending: Option<MemTable>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("stack", &self.stack)
            .field("pending", &self.pending.as_ref().map(MemTable::len))
            .finish()
    }
}

impl Shell {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            opts: WriteOptions {
                hash_size: cfg.hash_size,
                index_objects: cfg.index_objects,
            },
            stack: MergedTable::new(Vec::new())?,
            pending: None,
        })
    }

    pub fn stack(&self) -> &MergedTable {
        &self.stack
    }

    /// Starts a pending table covering `min..=max`.
    pub fn begin(&mut self, min: u64, max: u64) -> Result<()> {
        if self.pending.is_some() {
            bail!("a table is already open; COMMIT it first");
        }
        self.pending = Some(MemTable::with_options(min, max, self.opts)?);
        Ok(())
    }

    /// Sets `name` to `oid_hex` in the pending table.
    pub fn set(&mut self, name: &str, oid_hex: &str) -> Result<()> {
        let oid = parse_oid(oid_hex)?;
        let old = self.current_value(name)?;
        let table = self.pending_mut()?;
        let idx = table.max_update_index();
        table.add_ref(RefRecord::new(name, idx, oid.clone()))?;
        table.add_log(log_entry(name, idx, old, Some(oid), "set"))?;
        Ok(())
    }

    /// Points `name` at `target`, peeled to the target's current value.
    pub fn symref(&mut self, name: &str, target: &str) -> Result<()> {
        let peeled = self.current_value(target)?;
        let table = self.pending_mut()?;
        let idx = table.max_update_index();
        table.add_ref(RefRecord::symbolic(name, idx, target, peeled))?;
        Ok(())
    }

    /// Records a deletion of `name` in the pending table.
    pub fn del(&mut self, name: &str) -> Result<()> {
        let old = self.current_value(name)?;
        let table = self.pending_mut()?;
        let idx = table.max_update_index();
        table.add_ref(RefRecord::deletion(name, idx))?;
        table.add_log(log_entry(name, idx, old, None, "delete"))?;
        Ok(())
    }

    /// Validates the pending table's refs against the stack and pushes it on
    /// top. The pending table is discarded either way.
    pub fn commit(&mut self) -> Result<()> {
        let Some(table) = self.pending.take() else {
            bail!("no open table; BEGIN one first");
        };

        let recs: Vec<RefRecord> = table
            .seek_ref("")?
            .collect_records(RecordType::Ref)?
            .into_iter()
            .filter_map(|r| r.into_ref_record())
            .collect();
        validate_ref_record_addition(&self.stack, &recs)?;

        let mut tables = self.stack.tables().to_vec();
        tables.push(Arc::new(table));
        self.stack = MergedTable::new(tables)?;
        info!(
            tables = self.stack.len(),
            refs = recs.len(),
            max_update_index = self.stack.max_update_index(),
            "committed table"
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Option<RefRecord>> {
        Ok(self.stack.read_ref(name)?)
    }

    /// Live refs from `start` onwards.
    pub fn seek(&self, start: &str) -> Result<Vec<RefRecord>> {
        let mut it = self.stack.seek_ref(start)?;
        let mut out = Vec::new();
        while let Some(r) = it.next_ref()? {
            if !r.is_deletion() {
                out.push(r);
            }
        }
        Ok(out)
    }

    pub fn refs(&self, oid_hex: &str) -> Result<Vec<RefRecord>> {
        let oid = parse_oid(oid_hex)?;
        let mut it = self.stack.refs_for(&oid)?;
        let mut out = Vec::new();
        while let Some(r) = it.next_ref()? {
            out.push(r);
        }
        Ok(out)
    }

    /// Reflog of `name`, newest first.
    pub fn log(&self, name: &str) -> Result<Vec<LogRecord>> {
        let mut it = self.stack.seek_log(name)?;
        let mut rec = Record::new(RecordType::Log, name);
        let mut out = Vec::new();
        while it.next_record(&mut rec)? {
            match rec.as_log_record() {
                Some(l) if l.ref_name == name => out.push(l.clone()),
                _ => break,
            }
        }
        Ok(out)
    }

    fn pending_mut(&mut self) -> Result<&mut MemTable> {
        self.pending
            .as_mut()
            .context("no open table; BEGIN one first")
    }

    /// The oid `name` resolves to, looking at the pending table first.
    ///
    /// A deletion in the pending table hides whatever the stack holds.
    fn current_value(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let pending = match &self.pending {
            Some(t) => t
                .seek_ref(name)?
                .next_ref()?
                .filter(|r| r.ref_name == name),
            None => None,
        };
        let rec = match pending {
            Some(r) => Some(r),
            None => self.stack.read_ref(name)?,
        };
        Ok(rec.and_then(|r| r.value.or(r.target_value)))
    }
}

fn parse_oid(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).with_context(|| format!("invalid object id {s:?}"))
}

fn log_entry(
    name: &str,
    update_index: u64,
    old_hash: Option<Vec<u8>>,
    new_hash: Option<Vec<u8>>,
    message: &str,
) -> LogRecord {
    let time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    LogRecord {
        ref_name: name.to_string(),
        update_index,
        old_hash,
        new_hash,
        name: COMMITTER.to_string(),
        email: COMMITTER_EMAIL.to_string(),
        time,
        tz_offset: 0,
        message: message.to_string(),
    }
}

/// Formats a ref for display: `name -> oid` or `name -> ref: target (oid)`.
pub fn format_ref(r: &RefRecord) -> String {
    match (&r.target, &r.value, &r.target_value) {
        (Some(target), _, Some(peeled)) => {
            format!("{} -> ref: {} ({})", r.ref_name, target, hex::encode(peeled))
        }
        (Some(target), _, None) => format!("{} -> ref: {}", r.ref_name, target),
        (None, Some(v), _) => format!("{} -> {}", r.ref_name, hex::encode(v)),
        (None, None, _) => format!("{} -> (deleted)", r.ref_name),
    }
}
