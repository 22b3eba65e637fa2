//! Virtual filesystem switch
//!
//! [`Vfs`] owns the mount registry and the global descriptor table and
//! routes every call to the driver that owns the path, descriptor or
//! directory stream:
//!
//! - path calls resolve the longest matching mount prefix and pass the
//!   mount-relative path on
//! - descriptor calls read one descriptor table slot and pass the driver's
//!   local descriptor on
//! - directory calls go to the mount held by the [`DirHandle`]
//!
//! No table lock is held across a driver call. A descriptor call reads its
//! slot without locking, then takes the registry read lock just long enough
//! to clone the driver's `Arc`; it only waits while a registration or
//! unregistration holds the write lock.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;

use pico_api::{Error, Result};
use spin::RwLock;

use crate::config::VfsConfig;
use crate::dir::DirHandle;
use crate::fd_table::{FdBinding, FdSlot, FdTable};
use crate::ops::VfsOps;
use crate::path;
use crate::registry::{MountEntry, MountPrefix, MountTable};
use crate::root::RootFs;
use crate::types::{AccessMode, DirEntry, Fd, OpenFlags, SeekWhence, Stat, Utimbuf};

/// Process-wide VFS context
pub struct Vfs {
    config: VfsConfig,
    mounts: Arc<RwLock<MountTable>>,
    fds: FdTable,
    root_index: usize,
}

impl Vfs {
    /// Create a VFS with the synthetic root filesystem mounted at the
    /// empty prefix
    pub fn new(config: VfsConfig) -> Result<Self> {
        config.validate()?;

        let mounts = Arc::new(RwLock::new(MountTable::new(config.max_mounts)));
        let root = RootFs::new(Arc::downgrade(&mounts));
        let root_index = mounts
            .write()
            .insert(MountPrefix::Path(String::new()), Arc::new(root))?;
        let fds = FdTable::new(config.max_fds)?;

        vfs_info!(
            "vfs ready: {} descriptors, {} mount slots",
            config.max_fds,
            config.max_mounts
        );
        Ok(Self {
            config,
            mounts,
            fds,
            root_index,
        })
    }

    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    /// Registry slot of the synthetic root filesystem
    pub fn root_index(&self) -> usize {
        self.root_index
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Mount `ops` at `prefix` and return its registry slot
    pub fn register(&self, prefix: &str, ops: Arc<dyn VfsOps>) -> Result<usize> {
        path::validate_prefix(prefix)?;
        let index = self
            .mounts
            .write()
            .insert(MountPrefix::Path(String::from(prefix)), ops)?;
        vfs_info!("mounted '{}' at slot {}", prefix, index);
        Ok(index)
    }

    /// Register `ops` without a path and reserve descriptors `[min, max]`
    /// for it permanently.
    ///
    /// If any descriptor in the range is taken, the new entry is removed
    /// again and the call fails with [`Error::InvalidArgument`].
    pub fn register_fd_range(&self, ops: Arc<dyn VfsOps>, min: Fd, max: Fd) -> Result<usize> {
        if min < 0 || max < min || max as usize >= self.fds.capacity() {
            return Err(Error::InvalidArgument);
        }

        let mut mounts = self.mounts.write();
        let index = mounts.insert(MountPrefix::FdRangeOnly, ops)?;
        if let Err(err) = self.fds.reserve_range(index, min, max) {
            mounts.remove(index);
            vfs_warn!("descriptor range [{}, {}] is taken, rolled back slot {}", min, max, index);
            return Err(err);
        }
        vfs_info!("descriptors [{}, {}] reserved for slot {}", min, max, index);
        Ok(index)
    }

    /// Reserve descriptors `[min, max]` for an already registered entry
    pub fn register_fd_range_for_index(&self, index: usize, min: Fd, max: Fd) -> Result<()> {
        let mounts = self.mounts.read();
        if mounts.get(index).is_none() {
            return Err(Error::InvalidArgument);
        }
        self.fds.reserve_range(index, min, max)?;
        vfs_info!("descriptors [{}, {}] reserved for slot {}", min, max, index);
        Ok(())
    }

    /// Remove a mount entry and its reserved descriptors.
    ///
    /// Fails with [`Error::Busy`] while an ephemeral descriptor or a
    /// directory stream still refers to it.
    pub fn unregister(&self, index: usize) -> Result<()> {
        if index == self.root_index {
            return Err(Error::InvalidArgument);
        }

        let mut mounts = self.mounts.write();
        let entry = mounts.get(index).ok_or(Error::InvalidArgument)?;
        if entry.open_streams() > 0 || self.fds.count_open(index) > 0 {
            vfs_debug!("slot {} still in use", index);
            return Err(Error::Busy);
        }
        self.fds.release_mount(index);
        mounts.remove(index);
        vfs_info!("unregistered slot {}", index);
        Ok(())
    }

    /// Driver registered at `index`
    pub fn ops_for_index(&self, index: usize) -> Option<Arc<dyn VfsOps>> {
        self.mounts.read().get(index).map(|entry| entry.ops().clone())
    }

    /// Current contents of a descriptor slot, `None` if `fd` is out of range
    pub fn descriptor(&self, fd: Fd) -> Option<FdSlot> {
        self.fds.slot(fd)
    }

    // ========================================================================
    // Path-based calls
    // ========================================================================

    /// Open a file and bind it to a fresh global descriptor
    pub fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> Result<Fd> {
        let entry = self.resolve(path)?;
        let local = entry.ops().open(Self::relative(&entry, path), flags, mode)?;

        // Bind under the registry read lock so the entry cannot be
        // unregistered between the check and the allocation
        let mounts = self.mounts.read();
        let bound = if mounts.is_current(&entry) {
            self.fds.allocate(entry.index(), local)
        } else {
            Err(Error::NotFound)
        };
        drop(mounts);

        match bound {
            Ok(fd) => {
                vfs_debug!("open '{}' -> fd {} (slot {}, local {})", path, fd, entry.index(), local);
                Ok(fd)
            }
            Err(err) => {
                if err == Error::TooManyOpenFiles {
                    vfs_warn!("descriptor table full, closing local fd {}", local);
                }
                let _ = entry.ops().close(local);
                Err(err)
            }
        }
    }

    pub fn stat(&self, path: &str) -> Result<Stat> {
        let entry = self.resolve(path)?;
        entry.ops().stat(Self::relative(&entry, path))
    }

    /// Create a hard link; both paths must be on the same mount
    pub fn link(&self, old_path: &str, new_path: &str) -> Result<()> {
        let (src, dst) = self.resolve_pair(old_path, new_path)?;
        src.ops().link(Self::relative(&src, old_path), Self::relative(&dst, new_path))
    }

    pub fn unlink(&self, path: &str) -> Result<()> {
        let entry = self.resolve(path)?;
        entry.ops().unlink(Self::relative(&entry, path))
    }

    /// Rename; both paths must be on the same mount
    pub fn rename(&self, src_path: &str, dst_path: &str) -> Result<()> {
        let (src, dst) = self.resolve_pair(src_path, dst_path)?;
        src.ops().rename(Self::relative(&src, src_path), Self::relative(&dst, dst_path))
    }

    pub fn mkdir(&self, path: &str, mode: u32) -> Result<()> {
        let entry = self.resolve(path)?;
        entry.ops().mkdir(Self::relative(&entry, path), mode)
    }

    pub fn rmdir(&self, path: &str) -> Result<()> {
        let entry = self.resolve(path)?;
        entry.ops().rmdir(Self::relative(&entry, path))
    }

    pub fn access(&self, path: &str, mode: AccessMode) -> Result<()> {
        let entry = self.resolve(path)?;
        entry.ops().access(Self::relative(&entry, path), mode)
    }

    pub fn truncate(&self, path: &str, length: u64) -> Result<()> {
        let entry = self.resolve(path)?;
        entry.ops().truncate(Self::relative(&entry, path), length)
    }

    pub fn utime(&self, path: &str, times: Option<&Utimbuf>) -> Result<()> {
        let entry = self.resolve(path)?;
        entry.ops().utime(Self::relative(&entry, path), times)
    }

    // ========================================================================
    // Descriptor-based calls
    // ========================================================================

    /// Close a descriptor.
    ///
    /// An ephemeral slot is released once the driver has been asked to close
    /// its handle, whatever the driver answers. A driver without `close`
    /// keeps the slot. Permanent slots are never released.
    pub fn close(&self, fd: Fd) -> Result<()> {
        let (ops, binding) = self.resolve_fd(fd)?;
        let result = ops.close(binding.local);
        if result == Err(Error::NotSupported) {
            return result;
        }
        if self.fds.release(fd, binding) {
            vfs_debug!("fd {} released", fd);
        }
        result
    }

    pub fn read(&self, fd: Fd, buf: &mut [u8]) -> Result<usize> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.read(binding.local, buf)
    }

    pub fn write(&self, fd: Fd, buf: &[u8]) -> Result<usize> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.write(binding.local, buf)
    }

    pub fn lseek(&self, fd: Fd, offset: i64, whence: SeekWhence) -> Result<i64> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.lseek(binding.local, offset, whence)
    }

    pub fn fcntl(&self, fd: Fd, cmd: i32, arg: i32) -> Result<i32> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.fcntl(binding.local, cmd, arg)
    }

    pub fn fstat(&self, fd: Fd) -> Result<Stat> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.fstat(binding.local)
    }

    pub fn fsync(&self, fd: Fd) -> Result<()> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.fsync(binding.local)
    }

    pub fn ioctl(&self, fd: Fd, cmd: i32, arg: usize) -> Result<i32> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.ioctl(binding.local, cmd, arg)
    }

    pub fn pread(&self, fd: Fd, buf: &mut [u8], offset: u64) -> Result<usize> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.pread(binding.local, buf, offset)
    }

    pub fn pwrite(&self, fd: Fd, buf: &[u8], offset: u64) -> Result<usize> {
        let (ops, binding) = self.resolve_fd(fd)?;
        ops.pwrite(binding.local, buf, offset)
    }

    // ========================================================================
    // Directory streams
    // ========================================================================

    /// Open a directory stream bound to the owning mount
    pub fn opendir(&self, path: &str) -> Result<DirHandle> {
        let entry = self.resolve(path)?;
        let state = entry.ops().opendir(Self::relative(&entry, path))?;

        let mounts = self.mounts.read();
        if !mounts.is_current(&entry) {
            drop(mounts);
            let _ = entry.ops().closedir(state);
            return Err(Error::NotFound);
        }
        entry.stream_opened();
        drop(mounts);

        Ok(DirHandle::new(entry, state))
    }

    pub fn readdir(&self, dir: &mut DirHandle) -> Result<Option<DirEntry>> {
        let (ops, state) = dir.parts_mut()?;
        ops.readdir(state)
    }

    /// Reentrant readdir: fill `entry`, return `false` at the end
    pub fn readdir_r(&self, dir: &mut DirHandle, entry: &mut DirEntry) -> Result<bool> {
        let (ops, state) = dir.parts_mut()?;
        ops.readdir_r(state, entry)
    }

    pub fn telldir(&self, dir: &DirHandle) -> Result<i64> {
        let (ops, state) = dir.parts()?;
        ops.telldir(state)
    }

    pub fn seekdir(&self, dir: &mut DirHandle, loc: i64) -> Result<()> {
        let (ops, state) = dir.parts_mut()?;
        ops.seekdir(state, loc)
    }

    /// Close a directory stream. The handle is consumed even if the driver
    /// reports an error; dropping it has the same effect.
    pub fn closedir(&self, dir: DirHandle) -> Result<()> {
        dir.close()
    }

    // ========================================================================
    // Resolution helpers
    // ========================================================================

    fn resolve(&self, path: &str) -> Result<Arc<MountEntry>> {
        let entry = self.mounts.read().resolve(path).cloned();
        entry.ok_or_else(|| {
            vfs_debug!("no mount for '{}'", path);
            Error::NotFound
        })
    }

    fn resolve_pair(&self, a: &str, b: &str) -> Result<(Arc<MountEntry>, Arc<MountEntry>)> {
        let first = self.resolve(a)?;
        let second = self.resolve(b)?;
        if !Arc::ptr_eq(&first, &second) {
            return Err(Error::CrossDevice);
        }
        Ok((first, second))
    }

    fn relative<'a>(entry: &MountEntry, path: &'a str) -> &'a str {
        path::translate(path, entry.path_prefix().unwrap_or_default())
    }

    fn resolve_fd(&self, fd: Fd) -> Result<(Arc<dyn VfsOps>, FdBinding)> {
        let binding = self.fds.get(fd)?;
        let ops = self
            .mounts
            .read()
            .get(binding.mount)
            .map(|entry| entry.ops().clone())
            .ok_or(Error::BadDescriptor)?;
        Ok((ops, binding))
    }
}
