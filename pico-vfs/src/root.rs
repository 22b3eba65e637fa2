//! Synthetic root filesystem
//!
//! Registered at the empty prefix when a [`crate::Vfs`] is created. Its only
//! directory is `"/"`, which lists one directory entry per mount with a
//! non-empty path prefix, in slot order.

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Weak;

use pico_api::{Error, Result};
use spin::RwLock;

use crate::ops::{DirState, VfsOps};
use crate::registry::MountTable;
use crate::types::{DirEntry, FileMode, FileType, LocalFd, OpenFlags, Stat};

pub(crate) struct RootFs {
    mounts: Weak<RwLock<MountTable>>,
}

/// Iteration state: next registry slot to look at
struct RootDirIter {
    next_slot: usize,
}

impl RootFs {
    pub(crate) fn new(mounts: Weak<RwLock<MountTable>>) -> Self {
        Self { mounts }
    }

    fn iter_mut(dir: &mut DirState) -> Result<&mut RootDirIter> {
        dir.downcast_mut::<RootDirIter>().ok_or(Error::BadDescriptor)
    }

    /// Next mount entry at or after `iter.next_slot`
    fn next_entry(&self, iter: &mut RootDirIter) -> Result<Option<DirEntry>> {
        let mounts = self.mounts.upgrade().ok_or(Error::NotFound)?;
        let table = mounts.read();

        while iter.next_slot < table.slot_count() {
            let slot = iter.next_slot;
            iter.next_slot += 1;

            let Some(prefix) = table.get(slot).and_then(|entry| entry.path_prefix()) else {
                continue;
            };
            if prefix.is_empty() {
                continue;
            }
            return Ok(Some(DirEntry::new(slot as u64, &prefix[1..], FileType::Directory)));
        }
        Ok(None)
    }
}

impl VfsOps for RootFs {
    fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> Result<LocalFd> {
        let _ = (path, flags, mode);
        Err(Error::NotFound)
    }

    fn stat(&self, path: &str) -> Result<Stat> {
        if path != "/" {
            return Err(Error::NotFound);
        }
        Ok(Stat {
            mode: FileMode::new(FileMode::S_IFDIR | 0o555),
            nlink: 2,
            ..Stat::default()
        })
    }

    fn opendir(&self, path: &str) -> Result<DirState> {
        if path != "/" {
            return Err(Error::NotFound);
        }
        Ok(Box::new(RootDirIter { next_slot: 0 }))
    }

    fn readdir(&self, dir: &mut DirState) -> Result<Option<DirEntry>> {
        let iter = Self::iter_mut(dir)?;
        self.next_entry(iter)
    }

    fn readdir_r(&self, dir: &mut DirState, entry: &mut DirEntry) -> Result<bool> {
        match self.readdir(dir)? {
            Some(next) => {
                *entry = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn telldir(&self, dir: &DirState) -> Result<i64> {
        let iter = dir.downcast_ref::<RootDirIter>().ok_or(Error::BadDescriptor)?;
        Ok(iter.next_slot as i64)
    }

    fn seekdir(&self, dir: &mut DirState, loc: i64) -> Result<()> {
        let iter = Self::iter_mut(dir)?;
        iter.next_slot = usize::try_from(loc).map_err(|_| Error::InvalidArgument)?;
        Ok(())
    }

    fn closedir(&self, dir: DirState) -> Result<()> {
        drop(dir);
        Ok(())
    }
}
