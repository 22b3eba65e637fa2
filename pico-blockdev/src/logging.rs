//! Logging support for the block device layer
//!
//! Wraps the `log` facade so call sites need no `#[cfg]` of their own.
//! With the `log` feature disabled the arguments are still type-checked.

macro_rules! blk_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::debug!(target: "blockdev", $($arg)*);
        #[cfg(not(feature = "log"))]
        { ::core::format_args!($($arg)*); }
    }};
}

macro_rules! blk_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::info!(target: "blockdev", $($arg)*);
        #[cfg(not(feature = "log"))]
        { ::core::format_args!($($arg)*); }
    }};
}

macro_rules! blk_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::warn!(target: "blockdev", $($arg)*);
        #[cfg(not(feature = "log"))]
        { ::core::format_args!($($arg)*); }
    }};
}
