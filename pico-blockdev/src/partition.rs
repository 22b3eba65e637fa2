//! Partition devices
//!
//! A partition is a window onto its parent device: sector numbers are
//! relative to the partition start, and the size ioctl reports the
//! partition's own sector count. Everything else goes to the parent.

use pico_api::{Error, Result};

/// Geometry of a partition relative to its parent device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// First sector within the parent
    pub start_sector: u32,
    /// Number of sectors
    pub num_sectors: u32,
}

impl Partition {
    pub fn new(start_sector: u32, num_sectors: u32) -> Self {
        Self {
            start_sector,
            num_sectors,
        }
    }

    /// Translate a partition-relative sector into a parent sector
    pub fn translate(&self, sector: u32) -> Result<u32> {
        self.start_sector
            .checked_add(sector)
            .ok_or(Error::InvalidArgument)
    }

    /// Get partition end sector within the parent (exclusive)
    pub fn end_sector(&self) -> u32 {
        self.start_sector.saturating_add(self.num_sectors)
    }
}
