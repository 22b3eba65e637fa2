//! Error handling module shared by the VFS and block device layers

use core::fmt;

/// Platform errno values (newlib numbering)
pub mod errno {
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EBADF: i32 = 9;
    pub const ENOMEM: i32 = 12;
    pub const EBUSY: i32 = 16;
    pub const EXDEV: i32 = 18;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
    pub const EMFILE: i32 = 24;
    pub const ENOSYS: i32 = 88;
    pub const ENAMETOOLONG: i32 = 91;
}

/// Common error type used throughout the shim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Malformed prefix, range or argument
    InvalidArgument,
    /// Mount registry has no free slot left
    OutOfSlots,
    /// Allocation failed
    OutOfMemory,
    /// Descriptor table is full
    TooManyOpenFiles,
    /// Invalid or unoccupied descriptor or directory stream
    BadDescriptor,
    /// No mount matches the path, or the driver has no such entry
    NotFound,
    /// Driver does not provide the operation
    NotSupported,
    /// Resource still in use, or already initialised
    Busy,
    /// Paths resolve to two different mounts
    CrossDevice,
    /// Resulting path exceeds the allowed length
    NameTooLong,
    /// Block device handle no longer refers to a live device
    NoDevice,
    /// I/O error reported by a driver
    Io,
    /// Driver-specific errno
    Errno(i32),
}

impl Error {
    /// Platform errno for this error
    pub fn errno(&self) -> i32 {
        match self {
            Error::InvalidArgument => errno::EINVAL,
            Error::OutOfSlots | Error::OutOfMemory => errno::ENOMEM,
            Error::TooManyOpenFiles => errno::EMFILE,
            Error::BadDescriptor => errno::EBADF,
            Error::NotFound => errno::ENOENT,
            Error::NotSupported => errno::ENOSYS,
            Error::Busy => errno::EBUSY,
            Error::CrossDevice => errno::EXDEV,
            Error::NameTooLong => errno::ENAMETOOLONG,
            Error::NoDevice => errno::ENODEV,
            Error::Io => errno::EIO,
            Error::Errno(code) => *code,
        }
    }

    /// Map a driver errno back to an error.
    ///
    /// Drivers that follow the C convention of returning `-errno` may pass
    /// either sign. `ENOMEM` maps to [`Error::OutOfMemory`].
    pub fn from_errno(code: i32) -> Self {
        match code.wrapping_abs() {
            errno::EINVAL => Error::InvalidArgument,
            errno::ENOMEM => Error::OutOfMemory,
            errno::EMFILE => Error::TooManyOpenFiles,
            errno::EBADF => Error::BadDescriptor,
            errno::ENOENT => Error::NotFound,
            errno::ENOSYS => Error::NotSupported,
            errno::EBUSY => Error::Busy,
            errno::EXDEV => Error::CrossDevice,
            errno::ENAMETOOLONG => Error::NameTooLong,
            errno::ENODEV => Error::NoDevice,
            errno::EIO => Error::Io,
            other => Error::Errno(other),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "Invalid argument"),
            Error::OutOfSlots => write!(f, "No free registry slot"),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::TooManyOpenFiles => write!(f, "Too many open files"),
            Error::BadDescriptor => write!(f, "Bad file descriptor"),
            Error::NotFound => write!(f, "No such file or directory"),
            Error::NotSupported => write!(f, "Operation not supported"),
            Error::Busy => write!(f, "Resource busy"),
            Error::CrossDevice => write!(f, "Cross-device link"),
            Error::NameTooLong => write!(f, "File name too long"),
            Error::NoDevice => write!(f, "No such device"),
            Error::Io => write!(f, "I/O error"),
            Error::Errno(code) => write!(f, "Error {}", code),
        }
    }
}

/// Result type for operations that can fail
pub type Result<T> = core::result::Result<T, Error>;

/// Convert a C-style status (`>= 0` success, `< 0` `-errno`) into a result
pub fn check_status(status: i32) -> Result<i32> {
    if status < 0 {
        Err(Error::from_errno(status))
    } else {
        Ok(status)
    }
}
