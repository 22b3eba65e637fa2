//! Process-wide VFS instance

use core::sync::atomic::{AtomicBool, Ordering};

use pico_api::{Error, Result};
use spin::Once;

use crate::config::VfsConfig;
use crate::vfs::Vfs;

static VFS: Once<Vfs> = Once::new();
static CLAIMED: AtomicBool = AtomicBool::new(false);

/// Create the global VFS.
///
/// Only the first successful call creates it; later calls fail with
/// [`Error::Busy`]. A call that fails on an invalid config leaves the
/// instance unclaimed.
pub fn init(config: VfsConfig) -> Result<&'static Vfs> {
    if CLAIMED.swap(true, Ordering::AcqRel) {
        return Err(Error::Busy);
    }
    match Vfs::new(config) {
        Ok(vfs) => Ok(VFS.call_once(|| vfs)),
        Err(err) => {
            CLAIMED.store(false, Ordering::Release);
            Err(err)
        }
    }
}

/// The global VFS, once [`init`] has run
pub fn vfs() -> Option<&'static Vfs> {
    VFS.get()
}
