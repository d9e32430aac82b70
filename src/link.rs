//! Outbound file links of the form `fileName.<hash>`.
//!
//! The hash is `h = 31 * h + unit` over the UTF-16 code units of the name with
//! wrapping 32-bit arithmetic. It must never change: links handed out earlier
//! (by this tool or by other implementations using the same scheme) have to
//! resolve to the same file later. Distinct names may collide.

use crate::error::{ForensicsError, Result};

pub const LINK_PREFIX: &str = "fileName.";

pub fn file_hash(file_name: &str) -> i32 {
    file_name
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

pub fn file_link(file_name: &str) -> String {
    format!("{LINK_PREFIX}{}", file_hash(file_name))
}

pub fn parse_link(link: &str) -> Result<i32> {
    let hash = link
        .strip_prefix(LINK_PREFIX)
        .ok_or_else(|| ForensicsError::InvalidLink(link.to_string()))?;
    hash.parse::<i32>()
        .map_err(|_| ForensicsError::InvalidLink(link.to_string()))
}
