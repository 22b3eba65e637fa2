//! Pico Shim API
//!
//! Shared foundation for the shim crates:
//!
//! - **Error**: the common [`Error`] type, its errno mapping and [`Result`]
//! - **Sync**: locking primitives used by the tables and offered to drivers
//!
//! # Usage
//!
//! ```rust
//! use pico_api::{Error, Result};
//! use pico_api::sync::VfsLock;
//!
//! static DRIVER_LOCK: VfsLock = VfsLock::new();
//!
//! fn flush() -> Result<()> {
//!     let guard = DRIVER_LOCK.acquire();
//!     // ... touch driver state ...
//!     VfsLock::release(guard);
//!     Ok(())
//! }
//!
//! assert!(flush().is_ok());
//! assert_eq!(Error::BadDescriptor.errno(), 9);
//! ```

#![no_std]

pub mod error;
pub mod sync;

pub use crate::error::{Error, Result, check_status, errno};
