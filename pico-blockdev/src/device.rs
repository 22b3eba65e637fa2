//! Block device driver interface

use pico_api::{Error, Result};

/// Logical sector size used by the partition scanner
pub const SECTOR_SIZE: usize = 512;

/// Block device ioctl commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoctlCommand {
    /// Get device size in sectors
    GetSize,
    /// Get sector size in bytes
    GetSectorSize,
    /// Get readonly flag
    GetReadOnly,
    /// Flush buffers
    Sync,
    /// Driver-specific command, forwarded untouched
    Other(u8),
}

impl IoctlCommand {
    pub const BLKGETSIZE: u8 = 0;
    pub const BLKSSZGET: u8 = 1;
    pub const BLKROGET: u8 = 2;
    pub const BLKFLSBUF: u8 = 3;

    pub fn from_raw(cmd: u8) -> Self {
        match cmd {
            Self::BLKGETSIZE => Self::GetSize,
            Self::BLKSSZGET => Self::GetSectorSize,
            Self::BLKROGET => Self::GetReadOnly,
            Self::BLKFLSBUF => Self::Sync,
            other => Self::Other(other),
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            Self::GetSize => Self::BLKGETSIZE,
            Self::GetSectorSize => Self::BLKSSZGET,
            Self::GetReadOnly => Self::BLKROGET,
            Self::Sync => Self::BLKFLSBUF,
            Self::Other(cmd) => *cmd,
        }
    }
}

/// Operations a block device driver provides.
///
/// Every operation is optional; the defaults report [`Error::NotSupported`].
/// `&self` is the driver's private state.
pub trait BlockDevice: Send + Sync {
    /// Bring the device up
    fn init(&self) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Read `count` sectors starting at `start_sector` into `buf`
    fn read_sector(&self, buf: &mut [u8], start_sector: u32, count: u32) -> Result<()> {
        let _ = (buf, start_sector, count);
        Err(Error::NotSupported)
    }

    /// Write `count` sectors starting at `start_sector` from `buf`
    fn write_sector(&self, buf: &[u8], start_sector: u32, count: u32) -> Result<()> {
        let _ = (buf, start_sector, count);
        Err(Error::NotSupported)
    }

    /// Device control; queries return their value, `Sync` returns 0
    fn ioctl(&self, cmd: IoctlCommand) -> Result<u32> {
        let _ = cmd;
        Err(Error::NotSupported)
    }
}
