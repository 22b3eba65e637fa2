//! Mount registry
//!
//! A bounded table of mount entries. Each entry pairs a driver with either a
//! path prefix or the "descriptor range only" marker, which keeps it out of
//! path resolution entirely.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use pico_api::{Error, Result};

use crate::ops::VfsOps;
use crate::path;

/// How an entry is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountPrefix {
    /// Path-matched; may be empty for the fallback mount
    Path(String),
    /// Reachable only through its reserved descriptors
    FdRangeOnly,
}

/// A registered driver
pub struct MountEntry {
    ops: Arc<dyn VfsOps>,
    prefix: MountPrefix,
    index: usize,
    open_streams: AtomicUsize,
}

impl MountEntry {
    pub fn ops(&self) -> &Arc<dyn VfsOps> {
        &self.ops
    }

    pub fn prefix(&self) -> &MountPrefix {
        &self.prefix
    }

    /// Prefix string, if the entry takes part in path resolution
    pub fn path_prefix(&self) -> Option<&str> {
        match &self.prefix {
            MountPrefix::Path(prefix) => Some(prefix),
            MountPrefix::FdRangeOnly => None,
        }
    }

    /// Registry slot
    pub fn index(&self) -> usize {
        self.index
    }

    /// Directory streams opened through this entry and not yet closed
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::Acquire)
    }

    pub(crate) fn stream_opened(&self) {
        self.open_streams.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn stream_closed(&self) {
        self.open_streams.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Slot array of mount entries
pub struct MountTable {
    slots: Vec<Option<Arc<MountEntry>>>,
    capacity: usize,
}

impl MountTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Claim the first free slot, growing the table up to its capacity
    pub fn insert(&mut self, prefix: MountPrefix, ops: Arc<dyn VfsOps>) -> Result<usize> {
        let index = match self.slots.iter().position(Option::is_none) {
            Some(index) => index,
            None if self.slots.len() < self.capacity => {
                self.slots.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
                self.slots.push(None);
                self.slots.len() - 1
            }
            None => return Err(Error::OutOfSlots),
        };

        self.slots[index] = Some(Arc::new(MountEntry {
            ops,
            prefix,
            index,
            open_streams: AtomicUsize::new(0),
        }));
        Ok(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Arc<MountEntry>> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&Arc<MountEntry>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Longest-prefix match of `path` against the path-matched entries.
    ///
    /// The comparison is strictly greater-than, so among equal prefixes the
    /// lowest slot wins, and the empty prefix only wins when nothing else
    /// matched.
    pub fn resolve(&self, path: &str) -> Option<&Arc<MountEntry>> {
        let mut best: Option<&Arc<MountEntry>> = None;
        let mut best_len = 0;

        for entry in self.iter() {
            let Some(prefix) = entry.path_prefix() else {
                continue;
            };
            if !path::prefix_matches(prefix, path) {
                continue;
            }
            if best.is_none() || prefix.len() > best_len {
                best = Some(entry);
                best_len = prefix.len();
            }
        }
        best
    }

    /// Whether `entry` still occupies its slot
    pub fn is_current(&self, entry: &Arc<MountEntry>) -> bool {
        self.get(entry.index())
            .is_some_and(|current| Arc::ptr_eq(current, entry))
    }

    /// Live entries in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MountEntry>> + '_ {
        self.slots.iter().flatten()
    }

    /// Number of slots the table has grown to
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
