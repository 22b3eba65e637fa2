//! VFS configuration

use pico_api::{Error, Result};
use static_assertions::const_assert;

/// Default number of global descriptors
pub const MAX_FDS: usize = 16;

/// Default number of mount entries, the root entry included
pub const MAX_MOUNTS: usize = 8;

/// Longest accepted mount prefix, in bytes
pub const PATH_PREFIX_MAX: usize = 16;

/// Buffer size bounding paths built by [`crate::path::join_path`]
pub const PATH_MAX: usize = 256;

// Mount indices are packed into 16 bits of an fd table slot
const_assert!(MAX_MOUNTS <= u16::MAX as usize);
const_assert!(MAX_FDS <= i32::MAX as usize);

/// Table capacities for a [`crate::Vfs`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfsConfig {
    /// Size of the global descriptor table
    pub max_fds: usize,
    /// Size of the mount registry
    pub max_mounts: usize,
}

impl VfsConfig {
    pub const fn new() -> Self {
        Self {
            max_fds: MAX_FDS,
            max_mounts: MAX_MOUNTS,
        }
    }

    pub const fn with_max_fds(mut self, max_fds: usize) -> Self {
        self.max_fds = max_fds;
        self
    }

    pub const fn with_max_mounts(mut self, max_mounts: usize) -> Self {
        self.max_mounts = max_mounts;
        self
    }

    /// Check the capacities are usable
    pub fn validate(&self) -> Result<()> {
        if self.max_fds == 0 || self.max_fds > i32::MAX as usize {
            return Err(Error::InvalidArgument);
        }
        if self.max_mounts == 0 || self.max_mounts > u16::MAX as usize {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VfsConfig::default();
        assert_eq!(config.max_fds, MAX_FDS);
        assert_eq!(config.max_mounts, MAX_MOUNTS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_tables() {
        assert_eq!(VfsConfig::new().with_max_fds(0).validate(), Err(Error::InvalidArgument));
        assert_eq!(VfsConfig::new().with_max_mounts(0).validate(), Err(Error::InvalidArgument));
        assert!(VfsConfig::new().with_max_mounts(2).with_max_fds(4).validate().is_ok());
    }
}
