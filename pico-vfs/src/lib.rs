//! Pico Shim VFS
//!
//! Lets independent filesystem drivers share one descriptor namespace:
//!
//! - **Registry**: mount entries keyed by path prefix or descriptor range
//! - **Descriptor table**: global descriptors mapped to driver-local ones
//! - **Directory streams**: self-routing handles and a root filesystem that
//!   lists the mounts
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use pico_api::Result;
//! use pico_vfs::{LocalFd, OpenFlags, Vfs, VfsConfig, VfsOps};
//!
//! struct Console;
//!
//! impl VfsOps for Console {
//!     fn open(&self, _path: &str, _flags: OpenFlags, _mode: u32) -> Result<LocalFd> {
//!         Ok(0)
//!     }
//!
//!     fn write(&self, _fd: LocalFd, buf: &[u8]) -> Result<usize> {
//!         Ok(buf.len())
//!     }
//!
//!     fn close(&self, _fd: LocalFd) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let vfs = Vfs::new(VfsConfig::default()).unwrap();
//! vfs.register("/dev", Arc::new(Console)).unwrap();
//!
//! let fd = vfs.open("/dev/console", OpenFlags::WRONLY, 0).unwrap();
//! assert_eq!(vfs.write(fd, b"hello").unwrap(), 5);
//! vfs.close(fd).unwrap();
//! ```

#![no_std]

extern crate alloc;

#[macro_use]
mod logging;

pub mod config;
pub mod dir;
pub mod fd_table;
pub mod global;
pub mod ops;
pub mod path;
pub mod registry;
mod root;
pub mod types;
pub mod vfs;

pub use config::{VfsConfig, MAX_FDS, MAX_MOUNTS, PATH_MAX, PATH_PREFIX_MAX};
pub use dir::DirHandle;
pub use fd_table::{FdBinding, FdSlot};
pub use global::{init, vfs};
pub use ops::{DirState, VfsOps};
pub use path::{concat_path, join_path};
pub use registry::MountPrefix;
pub use types::{
    AccessMode, DirEntry, Fd, FileMode, FileType, LocalFd, OpenFlags, SeekWhence, Stat, Utimbuf,
};
pub use vfs::Vfs;
