//! Mount prefix validation and path translation

extern crate alloc;

use alloc::string::String;

use pico_api::{Error, Result};

use crate::config::{PATH_MAX, PATH_PREFIX_MAX};

/// Path separator
pub const SEPARATOR: char = '/';

/// Check a mount prefix is well formed.
///
/// The empty prefix is accepted. Any other prefix must start with a
/// separator, must not end with one, and must fit in [`PATH_PREFIX_MAX`]
/// bytes. A lone `"/"` is rejected: mount at the empty prefix instead.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Ok(());
    }
    if prefix.len() == 1 || prefix.len() > PATH_PREFIX_MAX {
        return Err(Error::InvalidArgument);
    }
    if !prefix.starts_with(SEPARATOR) || prefix.ends_with(SEPARATOR) {
        return Err(Error::InvalidArgument);
    }
    Ok(())
}

/// Whether `prefix` covers `path` on a component boundary.
///
/// `"/data"` covers `"/data"` and `"/data/x"` but not `"/data1"`.
/// The empty prefix covers every path.
pub fn prefix_matches(prefix: &str, path: &str) -> bool {
    if !path.starts_with(prefix) {
        return false;
    }
    match path.as_bytes().get(prefix.len()) {
        None => true,
        Some(&next) => prefix.is_empty() || next == SEPARATOR as u8,
    }
}

/// Strip a matched prefix from `path`.
///
/// An exact match yields `"/"`, so drivers always see an absolute path.
pub fn translate<'a>(path: &'a str, prefix: &str) -> &'a str {
    match path.get(prefix.len()..) {
        Some("") | None => "/",
        Some(rest) => rest,
    }
}

/// Join `base` and `rel` with exactly one separator.
///
/// Fails with [`Error::NameTooLong`] if the result would not fit in a
/// buffer of `max_len` bytes with room for a terminator.
pub fn concat_path(base: &str, rel: &str, max_len: usize) -> Result<String> {
    let base = base.trim_end_matches(SEPARATOR);
    let rel = rel.trim_start_matches(SEPARATOR);

    let len = base.len() + 1 + rel.len();
    if len >= max_len {
        return Err(Error::NameTooLong);
    }

    let mut joined = String::new();
    joined
        .try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory)?;
    joined.push_str(base);
    if rel.is_empty() && !base.is_empty() {
        return Ok(joined);
    }
    joined.push(SEPARATOR);
    joined.push_str(rel);
    Ok(joined)
}

/// [`concat_path`] bounded by [`PATH_MAX`]
pub fn join_path(base: &str, rel: &str) -> Result<String> {
    concat_path(base, rel, PATH_MAX)
}
