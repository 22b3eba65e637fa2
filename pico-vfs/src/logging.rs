//! Logging support for the VFS
//!
//! Thin wrappers over the `log` facade, so call sites need no `#[cfg]`.
//! With the `log` feature disabled the arguments are still type-checked.

macro_rules! vfs_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::debug!(target: "vfs", $($arg)*);
        #[cfg(not(feature = "log"))]
        { ::core::format_args!($($arg)*); }
    }};
}

macro_rules! vfs_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::info!(target: "vfs", $($arg)*);
        #[cfg(not(feature = "log"))]
        { ::core::format_args!($($arg)*); }
    }};
}

macro_rules! vfs_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::warn!(target: "vfs", $($arg)*);
        #[cfg(not(feature = "log"))]
        { ::core::format_args!($($arg)*); }
    }};
}
