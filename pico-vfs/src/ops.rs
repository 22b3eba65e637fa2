//! Filesystem driver interface
//!
//! A driver implements [`VfsOps`] once and is registered with a mount prefix,
//! a descriptor range, or both. `&self` is the driver context: every call the
//! VFS forwards lands on the same `Arc<dyn VfsOps>` the driver registered.
//!
//! Paths handed to the path group are mount-relative and always absolute
//! (`"/"` for the mount root). Descriptors handed to the descriptor group are
//! the driver's own local handles, never global descriptors.
//!
//! Every method defaults to [`Error::NotSupported`], so a driver provides
//! exactly the operations it has.

extern crate alloc;

use alloc::boxed::Box;
use core::any::Any;

use pico_api::{Error, Result};

use crate::types::{AccessMode, DirEntry, LocalFd, OpenFlags, SeekWhence, Stat, Utimbuf};

/// Driver-owned iteration state of an open directory stream
pub type DirState = Box<dyn Any + Send>;

/// Operations a filesystem driver may provide
pub trait VfsOps: Send + Sync {
    // ------------------------------------------------------------------
    // Path-based operations
    // ------------------------------------------------------------------

    /// Open a file and return a driver-local descriptor
    fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> Result<LocalFd> {
        let _ = (path, flags, mode);
        Err(Error::NotSupported)
    }

    /// Get file attributes
    fn stat(&self, path: &str) -> Result<Stat> {
        let _ = path;
        Err(Error::NotSupported)
    }

    /// Create a hard link; both paths are on this mount
    fn link(&self, old_path: &str, new_path: &str) -> Result<()> {
        let _ = (old_path, new_path);
        Err(Error::NotSupported)
    }

    fn unlink(&self, path: &str) -> Result<()> {
        let _ = path;
        Err(Error::NotSupported)
    }

    /// Rename within this mount
    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let _ = (src, dst);
        Err(Error::NotSupported)
    }

    /// Start iterating a directory
    fn opendir(&self, path: &str) -> Result<DirState> {
        let _ = path;
        Err(Error::NotSupported)
    }

    fn mkdir(&self, path: &str, mode: u32) -> Result<()> {
        let _ = (path, mode);
        Err(Error::NotSupported)
    }

    fn rmdir(&self, path: &str) -> Result<()> {
        let _ = path;
        Err(Error::NotSupported)
    }

    fn access(&self, path: &str, mode: AccessMode) -> Result<()> {
        let _ = (path, mode);
        Err(Error::NotSupported)
    }

    fn truncate(&self, path: &str, length: u64) -> Result<()> {
        let _ = (path, length);
        Err(Error::NotSupported)
    }

    /// Set access and modification times; `None` means "now"
    fn utime(&self, path: &str, times: Option<&Utimbuf>) -> Result<()> {
        let _ = (path, times);
        Err(Error::NotSupported)
    }

    // ------------------------------------------------------------------
    // Descriptor-based operations
    // ------------------------------------------------------------------

    fn close(&self, fd: LocalFd) -> Result<()> {
        let _ = fd;
        Err(Error::NotSupported)
    }

    fn read(&self, fd: LocalFd, buf: &mut [u8]) -> Result<usize> {
        let _ = (fd, buf);
        Err(Error::NotSupported)
    }

    fn write(&self, fd: LocalFd, buf: &[u8]) -> Result<usize> {
        let _ = (fd, buf);
        Err(Error::NotSupported)
    }

    fn fstat(&self, fd: LocalFd) -> Result<Stat> {
        let _ = fd;
        Err(Error::NotSupported)
    }

    /// Reposition the file offset and return the new one
    fn lseek(&self, fd: LocalFd, offset: i64, whence: SeekWhence) -> Result<i64> {
        let _ = (fd, offset, whence);
        Err(Error::NotSupported)
    }

    /// Read at an absolute offset without moving the file offset
    fn pread(&self, fd: LocalFd, buf: &mut [u8], offset: u64) -> Result<usize> {
        let _ = (fd, buf, offset);
        Err(Error::NotSupported)
    }

    /// Write at an absolute offset without moving the file offset
    fn pwrite(&self, fd: LocalFd, buf: &[u8], offset: u64) -> Result<usize> {
        let _ = (fd, buf, offset);
        Err(Error::NotSupported)
    }

    fn fcntl(&self, fd: LocalFd, cmd: i32, arg: i32) -> Result<i32> {
        let _ = (fd, cmd, arg);
        Err(Error::NotSupported)
    }

    fn ioctl(&self, fd: LocalFd, cmd: i32, arg: usize) -> Result<i32> {
        let _ = (fd, cmd, arg);
        Err(Error::NotSupported)
    }

    fn fsync(&self, fd: LocalFd) -> Result<()> {
        let _ = fd;
        Err(Error::NotSupported)
    }

    // ------------------------------------------------------------------
    // Directory stream operations
    // ------------------------------------------------------------------

    /// Next entry, or `None` at the end of the stream
    fn readdir(&self, dir: &mut DirState) -> Result<Option<DirEntry>> {
        let _ = dir;
        Err(Error::NotSupported)
    }

    /// Reentrant readdir: fill `entry`, return `false` at the end of the stream
    fn readdir_r(&self, dir: &mut DirState, entry: &mut DirEntry) -> Result<bool> {
        let _ = (dir, entry);
        Err(Error::NotSupported)
    }

    fn telldir(&self, dir: &DirState) -> Result<i64> {
        let _ = dir;
        Err(Error::NotSupported)
    }

    fn seekdir(&self, dir: &mut DirState, loc: i64) -> Result<()> {
        let _ = (dir, loc);
        Err(Error::NotSupported)
    }

    /// Release the iteration state
    fn closedir(&self, dir: DirState) -> Result<()> {
        let _ = dir;
        Err(Error::NotSupported)
    }
}
