//! Pico Shim Block Devices
//!
//! Composition layer for storage drivers:
//!
//! - **Device**: the [`BlockDevice`] driver trait and ioctl commands
//! - **Tree**: an arena of whole-disk and partition devices
//! - **Partition**: sector-offset translation onto a parent device
//! - **MBR**: classic partition table parsing and discovery at registration
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use pico_blockdev::{BlockDevice, BlockDeviceTree, IoctlCommand};
//! use pico_api::Result;
//!
//! struct Flash;
//!
//! impl BlockDevice for Flash {
//!     fn ioctl(&self, cmd: IoctlCommand) -> Result<u32> {
//!         match cmd {
//!             IoctlCommand::GetSize => Ok(4096),
//!             _ => Ok(0),
//!         }
//!     }
//! }
//!
//! let mut tree = BlockDeviceTree::new();
//! let disk = tree.register(Arc::new(Flash));
//! assert_eq!(tree.ioctl(disk, IoctlCommand::GetSize).unwrap(), 4096);
//! ```

#![no_std]

#[macro_use]
mod logging;

pub mod device;
pub mod mbr;
pub mod partition;
mod scan;
pub mod tree;

pub use device::{BlockDevice, IoctlCommand, SECTOR_SIZE};
pub use mbr::{MasterBootRecord, MbrPartitionEntry, PartitionType};
pub use partition::Partition;
pub use tree::{BlockDeviceTree, DeviceId, DeviceInfo, RegistrationHook};
