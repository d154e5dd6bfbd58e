//! Hash Module
//!
//! Open-addressing hash table with linear probing.
//!
//! ## Responsibilities
//! - Map a key to its home bucket (`hash(key) mod map_size`)
//! - Probe forward with wraparound on collision
//! - Tombstone deletes so probe chains stay intact
//! - Enforce the write concern on duplicate keys
//!
//! ## Storage Media
//! The probing algorithm is written once in [`OpenHashMap`] and runs against
//! any [`BucketStore`]:
//! - [`MemoryStore`]: one contiguous byte buffer
//! - [`FileStore`]: one binary file of `map_size` records, accessed by
//!   seek + read/write per bucket
//!
//! ```text
//!   bucket:   0        1        2        3        4
//!          ┌────────┬────────┬────────┬────────┬────────┐
//!          │ EMPTY  │ IN_USE │DELETED │ IN_USE │ EMPTY  │
//!          └────────┴────────┴────────┴────────┴────────┘
//!                      ▲ home      └─ probe continues ─┘ ▲ chain ends
//! ```

mod engine;
mod file;
mod hasher;
mod memory;
mod store;

use serde::{Deserialize, Serialize};

use crate::error::SlotError;

pub use engine::{FileHashMap, MemoryHashMap, OpenHashMap};
pub use file::FileStore;
pub use hasher::{default_hasher, Crc32Hash, KeyHasher, NumericHash};
pub use memory::MemoryStore;
pub use store::BucketStore;

/// What an insert does when the key is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum WriteConcern {
    /// Reject with `DuplicateKey`
    #[default]
    InsertUnique = 0,

    /// Overwrite the stored value in place
    Update = 1,
}

impl TryFrom<u8> for WriteConcern {
    type Error = SlotError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(WriteConcern::InsertUnique),
            1 => Ok(WriteConcern::Update),
            _ => Err(SlotError::WriteConcernViolation),
        }
    }
}

impl From<WriteConcern> for u8 {
    fn from(concern: WriteConcern) -> Self {
        concern as u8
    }
}
