//! Key comparators
//!
//! Pure functions over two equal-width key buffers. Numeric comparators walk
//! from the most significant byte (the last one, keys being little-endian)
//! down to the least significant.

use std::cmp::Ordering;

/// Signed little-endian integer order.
///
/// The most significant byte is compared as `i8`, the remaining bytes as
/// `u8`, which reproduces two's-complement ordering for any width.
pub fn compare_signed(first: &[u8], second: &[u8]) -> Ordering {
    let len = first.len().min(second.len());
    if len == 0 {
        return Ordering::Equal;
    }

    let msb = len - 1;
    match (first[msb] as i8).cmp(&(second[msb] as i8)) {
        Ordering::Equal => compare_unsigned(&first[..msb], &second[..msb]),
        other => other,
    }
}

/// Unsigned little-endian integer order
pub fn compare_unsigned(first: &[u8], second: &[u8]) -> Ordering {
    let len = first.len().min(second.len());

    first[..len]
        .iter()
        .rev()
        .zip(second[..len].iter().rev())
        .map(|(a, b)| a.cmp(b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Lexicographic unsigned byte order over the full width
pub fn compare_byte_array(first: &[u8], second: &[u8]) -> Ordering {
    first.cmp(second)
}

/// String order that stops at the first NUL in either key
pub fn compare_null_terminated(first: &[u8], second: &[u8]) -> Ordering {
    until_nul(first).cmp(until_nul(second))
}

/// The prefix of `bytes` before its first NUL (or all of it)
pub(crate) fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
