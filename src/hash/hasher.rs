//! Hash functions
//!
//! A [`KeyHasher`] maps a key straight to its home bucket. The engine holds
//! one as a boxed trait object chosen at construction.

use std::fmt;

use crate::key::{compare::until_nul, KeyType};

/// Maps a key to its home bucket.
///
/// Results should fall in `[0, map_size)`; the engine reduces anything
/// larger modulo `map_size`.
pub trait KeyHasher: fmt::Debug + Send + Sync {
    fn bucket_for(&self, key: &[u8], map_size: usize) -> usize;
}

/// Integer keys: the key's own value modulo the table size.
///
/// Reads up to the first 8 bytes little-endian. Signed keys are
/// sign-extended and normalized with `((v mod m) + m) mod m` so negative
/// keys land in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericHash {
    pub signed: bool,
}

impl KeyHasher for NumericHash {
    fn bucket_for(&self, key: &[u8], map_size: usize) -> usize {
        let width = key.len().min(8);
        let mut raw = [0u8; 8];
        raw[..width].copy_from_slice(&key[..width]);

        if self.signed && width > 0 && key[width - 1] & 0x80 != 0 {
            raw[width..].fill(0xFF);
        }

        if self.signed {
            let value = i64::from_le_bytes(raw) as i128;
            let m = map_size as i128;
            (((value % m) + m) % m) as usize
        } else {
            (u64::from_le_bytes(raw) % map_size as u64) as usize
        }
    }
}

/// Byte and string keys: CRC-32 of the key bytes.
///
/// With `nul_terminated`, only the bytes before the first NUL are hashed,
/// matching the string comparator's notion of equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32Hash {
    pub nul_terminated: bool,
}

impl KeyHasher for Crc32Hash {
    fn bucket_for(&self, key: &[u8], map_size: usize) -> usize {
        let bytes = if self.nul_terminated { until_nul(key) } else { key };
        (crc32fast::hash(bytes) as u64 % map_size as u64) as usize
    }
}

/// Hasher used when the caller does not supply one
pub fn default_hasher(key_type: KeyType) -> Box<dyn KeyHasher> {
    match key_type {
        KeyType::SignedNumeric => Box::new(NumericHash { signed: true }),
        KeyType::UnsignedNumeric => Box::new(NumericHash { signed: false }),
        KeyType::FixedByteArray => Box::new(Crc32Hash {
            nul_terminated: false,
        }),
        KeyType::NullTerminatedString => Box::new(Crc32Hash {
            nul_terminated: true,
        }),
    }
}
