//! Key Module
//!
//! Key type tags and the comparators they select.
//!
//! ## Key Encoding
//! Keys are opaque fixed-width byte buffers. Numeric keys are stored
//! little-endian (e.g. `42i32.to_le_bytes()`); the comparators and the
//! numeric hash read them that way on every platform.
//!
//! ## Comparator Dispatch
//! A dictionary picks its [`CompareFn`] once, at creation, from its
//! [`KeyType`] and keeps it for its whole lifetime.

pub(crate) mod compare;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::SlotError;

pub use compare::{
    compare_byte_array, compare_null_terminated, compare_signed, compare_unsigned,
};

/// Total order over two keys of the same width
pub type CompareFn = fn(&[u8], &[u8]) -> Ordering;

/// Declared type of the keys stored in a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum KeyType {
    /// Two's-complement little-endian integer
    SignedNumeric = 0,

    /// Unsigned little-endian integer
    UnsignedNumeric = 1,

    /// Raw bytes compared like `memcmp`
    FixedByteArray = 2,

    /// Bytes compared up to the first NUL, like `strncmp`
    NullTerminatedString = 3,
}

impl KeyType {
    /// The comparator bound to this key type
    pub fn comparator(self) -> CompareFn {
        match self {
            KeyType::SignedNumeric => compare_signed,
            KeyType::UnsignedNumeric => compare_unsigned,
            KeyType::FixedByteArray => compare_byte_array,
            KeyType::NullTerminatedString => compare_null_terminated,
        }
    }

    /// Whether keys of this type are integers
    pub fn is_numeric(self) -> bool {
        matches!(self, KeyType::SignedNumeric | KeyType::UnsignedNumeric)
    }
}

impl TryFrom<u8> for KeyType {
    type Error = SlotError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(KeyType::SignedNumeric),
            1 => Ok(KeyType::UnsignedNumeric),
            2 => Ok(KeyType::FixedByteArray),
            3 => Ok(KeyType::NullTerminatedString),
            other => Err(SlotError::InvalidKeyType(other)),
        }
    }
}

impl From<KeyType> for u8 {
    fn from(key_type: KeyType) -> Self {
        key_type as u8
    }
}
