//! Directory stream handles

extern crate alloc;

use alloc::sync::Arc;

use pico_api::{Error, Result};

use crate::ops::{DirState, VfsOps};
use crate::registry::MountEntry;

/// An open directory stream.
///
/// Holds the mount entry that opened it, so every later call goes straight
/// to that driver without resolving the path again. The entry counts the
/// stream as open until the handle is closed or dropped; dropping an unclosed
/// handle still hands the iteration state back to the driver's `closedir`.
#[must_use = "a directory stream should be closed with `Vfs::closedir`"]
pub struct DirHandle {
    entry: Arc<MountEntry>,
    state: Option<DirState>,
}

impl DirHandle {
    /// Wrap `state` for `entry`; the caller has already counted the stream
    pub(crate) fn new(entry: Arc<MountEntry>, state: DirState) -> Self {
        Self {
            entry,
            state: Some(state),
        }
    }

    /// Registry slot of the owning mount
    pub fn mount_index(&self) -> usize {
        self.entry.index()
    }

    pub(crate) fn parts(&self) -> Result<(&Arc<dyn VfsOps>, &DirState)> {
        let state = self.state.as_ref().ok_or(Error::BadDescriptor)?;
        Ok((self.entry.ops(), state))
    }

    pub(crate) fn parts_mut(&mut self) -> Result<(&Arc<dyn VfsOps>, &mut DirState)> {
        let state = self.state.as_mut().ok_or(Error::BadDescriptor)?;
        Ok((self.entry.ops(), state))
    }

    /// Hand the state to the driver's `closedir`
    pub(crate) fn close(mut self) -> Result<()> {
        let state = self.state.take().ok_or(Error::BadDescriptor)?;
        self.entry.ops().closedir(state)
    }
}

impl Drop for DirHandle {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            vfs_debug!("directory stream on slot {} dropped without closedir", self.entry.index());
            let _ = self.entry.ops().closedir(state);
        }
        self.entry.stream_closed();
    }
}

impl core::fmt::Debug for DirHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DirHandle")
            .field("mount", &self.entry.index())
            .finish_non_exhaustive()
    }
}
